//! Target dimension calculation.

use super::{Dimensions, ResizeConfig};

/// Compute the output size for a resize request.
///
/// A target of 0 means "absent".
///
/// - No targets: the original size, unchanged.
/// - Aspect locked, one target: the other side follows the original ratio,
///   rounded to the nearest integer, at least 1.
/// - Aspect locked, both targets: fit within both bounds, scaling by the
///   smaller of the two ratios.
/// - Aspect unlocked: each present target is used as-is, absent ones fall back
///   to the original value.
pub fn calculate_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: u32,
    target_height: u32,
    maintain_aspect_ratio: bool,
) -> Dimensions {
    if target_width == 0 && target_height == 0 {
        return Dimensions::new(original_width, original_height);
    }

    if !maintain_aspect_ratio {
        let width = if target_width > 0 { target_width } else { original_width };
        let height = if target_height > 0 { target_height } else { original_height };
        return Dimensions::new(width.max(1), height.max(1));
    }

    // Degenerate source: no ratio to preserve
    if original_width == 0 || original_height == 0 {
        return Dimensions::new(target_width.max(1), target_height.max(1));
    }

    let (ow, oh) = (original_width as f64, original_height as f64);
    match (target_width, target_height) {
        (tw, 0) => Dimensions::new(tw, scaled(oh, tw as f64 / ow)),
        (0, th) => Dimensions::new(scaled(ow, th as f64 / oh), th),
        (tw, th) => {
            let scale = (tw as f64 / ow).min(th as f64 / oh);
            Dimensions::new(scaled(ow, scale), scaled(oh, scale))
        }
    }
}

/// Dimensions the resize stage will produce for an image, or `None` when the
/// stage is disabled.
pub fn target_dimensions(width: u32, height: u32, config: &ResizeConfig) -> Option<Dimensions> {
    config.enabled.then(|| {
        calculate_dimensions(
            width,
            height,
            config.width,
            config.height,
            config.maintain_aspect_ratio,
        )
    })
}

fn scaled(side: f64, scale: f64) -> u32 {
    ((side * scale).round() as u32).max(1)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: one locked target preserves the original ratio within
        /// one pixel of rounding.
        #[test]
        fn prop_width_only_preserves_ratio(
            ow in 1u32..=10_000,
            oh in 1u32..=10_000,
            tw in 1u32..=10_000,
        ) {
            let dims = calculate_dimensions(ow, oh, tw, 0, true);
            prop_assert_eq!(dims.width, tw);

            let exact = tw as f64 * oh as f64 / ow as f64;
            prop_assert!((dims.height as f64 - exact.max(1.0)).abs() <= 1.0);
        }

        #[test]
        fn prop_height_only_preserves_ratio(
            ow in 1u32..=10_000,
            oh in 1u32..=10_000,
            th in 1u32..=10_000,
        ) {
            let dims = calculate_dimensions(ow, oh, 0, th, true);
            prop_assert_eq!(dims.height, th);

            let exact = th as f64 * ow as f64 / oh as f64;
            prop_assert!((dims.width as f64 - exact.max(1.0)).abs() <= 1.0);
        }

        /// Property: fit-within never exceeds either bound (except the floor of 1)
        /// and touches at least one of them.
        #[test]
        fn prop_fit_within_respects_bounds(
            ow in 1u32..=10_000,
            oh in 1u32..=10_000,
            tw in 1u32..=10_000,
            th in 1u32..=10_000,
        ) {
            let dims = calculate_dimensions(ow, oh, tw, th, true);
            prop_assert!(dims.width <= tw.max(1));
            prop_assert!(dims.height <= th.max(1));
            prop_assert!(dims.width == tw || dims.height == th);
        }

        /// Property: output is never zero when any target is given.
        #[test]
        fn prop_never_zero(
            ow in 0u32..=5_000,
            oh in 0u32..=5_000,
            tw in 0u32..=5_000,
            th in 0u32..=5_000,
            locked in any::<bool>(),
        ) {
            prop_assume!(tw > 0 || th > 0);
            let dims = calculate_dimensions(ow, oh, tw, th, locked);
            prop_assert!(dims.width >= 1 && dims.height >= 1);
        }
    }
}
