//! Memoized, single-flight codec loading.
//!
//! Each format has its own slot guarded by a mutex. The first caller for a
//! format runs the loader while holding the slot lock; concurrent callers for
//! the same format block on that lock and then observe the loaded codec, so a
//! format is never initialized twice. A failed load leaves the slot empty and
//! the next caller retries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::{load_builtin, Codec};
use crate::format::FormatTag;

/// Error raised when a codec cannot be initialized.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// No backend for this format exists in this build.
    #[error("Failed to initialize {0} support: no codec available")]
    Unavailable(FormatTag),

    /// The backend exists but failed to initialize.
    #[error("Failed to initialize {format} support: {reason}")]
    InitFailed { format: FormatTag, reason: String },
}

/// Function that initializes the codec for a format.
pub type CodecLoader = Box<dyn Fn(FormatTag) -> Result<Arc<dyn Codec>, LoadError> + Send + Sync>;

/// Process-wide cache of loaded codecs, keyed by format tag.
pub struct CodecRegistry {
    slots: [Mutex<Option<Arc<dyn Codec>>>; FormatTag::ALL.len()],
    loader: CodecLoader,
    loads: AtomicUsize,
}

impl CodecRegistry {
    /// Registry backed by the built-in `image` crate codecs.
    pub fn new() -> Self {
        Self::with_loader(load_builtin)
    }

    /// Registry backed by a custom loader.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(FormatTag) -> Result<Arc<dyn Codec>, LoadError> + Send + Sync + 'static,
    {
        Self {
            slots: Default::default(),
            loader: Box::new(loader),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the codec for `format`, initializing it on first use.
    ///
    /// Failures are not cached.
    pub fn ensure_loaded(&self, format: FormatTag) -> Result<Arc<dyn Codec>, LoadError> {
        let mut slot = self.slots[format.index()].lock();
        if let Some(codec) = slot.as_ref() {
            return Ok(Arc::clone(codec));
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        match (self.loader)(format) {
            Ok(codec) => {
                debug!(%format, "codec loaded");
                *slot = Some(Arc::clone(&codec));
                Ok(codec)
            }
            Err(e) => {
                warn!(%format, error = %e, "codec load failed");
                Err(e)
            }
        }
    }

    /// Whether `format` has been loaded successfully.
    pub fn is_loaded(&self, format: FormatTag) -> bool {
        self.slots[format.index()].lock().is_some()
    }

    /// Number of loader invocations so far, successful or not.
    pub fn load_attempts(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Load every format eagerly, returning the failures.
    pub fn preload_all(&self) -> Vec<LoadError> {
        FormatTag::ALL
            .iter()
            .filter_map(|&format| self.ensure_loaded(format).err())
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded: Vec<FormatTag> = FormatTag::ALL
            .iter()
            .copied()
            .filter(|&tag| self.is_loaded(tag))
            .collect();
        f.debug_struct("CodecRegistry")
            .field("loaded", &loaded)
            .field("load_attempts", &self.load_attempts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PngCodec;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_loads_once() {
        let registry = CodecRegistry::new();
        assert!(!registry.is_loaded(FormatTag::Png));

        let a = registry.ensure_loaded(FormatTag::Png).unwrap();
        let b = registry.ensure_loaded(FormatTag::Png).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.is_loaded(FormatTag::Png));
        assert_eq!(registry.load_attempts(), 1);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let registry = CodecRegistry::new();

        assert!(registry.ensure_loaded(FormatTag::Jxl).is_err());
        assert!(registry.ensure_loaded(FormatTag::Jxl).is_err());

        assert!(!registry.is_loaded(FormatTag::Jxl));
        assert_eq!(registry.load_attempts(), 2);
    }

    #[test]
    fn test_retry_after_transient_failure() {
        let failed_once = AtomicBool::new(false);
        let registry = CodecRegistry::with_loader(move |format| {
            if !failed_once.swap(true, Ordering::SeqCst) {
                return Err(LoadError::InitFailed {
                    format,
                    reason: "transient".to_string(),
                });
            }
            Ok(Arc::new(PngCodec) as Arc<dyn Codec>)
        });

        let first = registry.ensure_loaded(FormatTag::Png);
        assert!(matches!(first, Err(LoadError::InitFailed { .. })));

        assert!(registry.ensure_loaded(FormatTag::Png).is_ok());
        assert!(registry.is_loaded(FormatTag::Png));
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = Arc::new(CodecRegistry::with_loader(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(PngCodec) as Arc<dyn Codec>)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.ensure_loaded(FormatTag::Png).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_formats_load_independently() {
        let registry = CodecRegistry::new();
        registry.ensure_loaded(FormatTag::Jpeg).unwrap();
        assert!(registry.is_loaded(FormatTag::Jpeg));
        assert!(!registry.is_loaded(FormatTag::Webp));
    }

    #[test]
    fn test_preload_all_reports_jxl() {
        let registry = CodecRegistry::new();
        let failures = registry.preload_all();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], LoadError::Unavailable(FormatTag::Jxl)));
    }
}
