//! The per-task conversion pipeline: decode → (resize) → encode.
//!
//! Runs inside one execution unit, one task at a time, start to finish. Every
//! stage error is caught here and turned into a single
//! [`WorkerResponse::Failure`]; nothing escapes to the coordinator and no
//! partial result is ever emitted.
//!
//! Progress is a coarse heartbeat posted at fixed checkpoints:
//!
//! | Checkpoint | Percent |
//! |------------|---------|
//! | decoded    | 40 |
//! | resized (only when the stage runs) | 70 |
//! | encoded    | 90 |
//! | complete   | 100 |

use thiserror::Error;
use tracing::{debug, debug_span};

use crate::codec::{CodecRegistry, LoadError};
use crate::decode::{DecodeError, PixelBuffer};
use crate::encode::{EncodeError, Quality};
use crate::format::FormatTag;
use crate::message::{DispatchMessage, WorkerResponse};
use crate::resize::{self, Dimensions, ResizeConfig, ResizeError};

/// Progress after the decode stage.
pub const PROGRESS_DECODED: u8 = 40;
/// Progress after the resize stage.
pub const PROGRESS_RESIZED: u8 = 70;
/// Progress after the encode stage.
pub const PROGRESS_ENCODED: u8 = 90;
/// Progress posted right before the success message.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Any stage failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resize(#[from] ResizeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub source_format: String,
    pub target_format: String,
    pub quality: u8,
    pub resize: ResizeConfig,
}

/// Encoded result of a successful run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub bytes: Vec<u8>,
    pub format: FormatTag,
    pub dimensions: Dimensions,
}

/// Decode `bytes` as `source_format`.
pub fn decode_stage(
    registry: &CodecRegistry,
    source_format: &str,
    bytes: &[u8],
) -> Result<PixelBuffer, PipelineError> {
    let format: FormatTag = source_format
        .parse()
        .map_err(|_| DecodeError::UnknownFormat(source_format.to_string()))?;
    let codec = registry.ensure_loaded(format)?;
    Ok(codec.decode(bytes)?)
}

/// Encode `image` as `target_format` at `quality`.
pub fn encode_stage(
    registry: &CodecRegistry,
    target_format: &str,
    image: &PixelBuffer,
    quality: u8,
) -> Result<(FormatTag, Vec<u8>), PipelineError> {
    let format: FormatTag = target_format
        .parse()
        .map_err(|_| EncodeError::UnknownFormat(target_format.to_string()))?;
    let quality = Quality::new(quality)?;
    let codec = registry.ensure_loaded(format)?;
    Ok((format, codec.encode(image, quality)?))
}

/// Run all stages, reporting each checkpoint through `progress`.
pub fn run(
    registry: &CodecRegistry,
    request: &PipelineRequest,
    source: &[u8],
    mut progress: impl FnMut(u8),
) -> Result<PipelineOutput, PipelineError> {
    let mut image = decode_stage(registry, &request.source_format, source)?;
    debug!(width = image.width, height = image.height, "decoded");
    progress(PROGRESS_DECODED);

    if let Some(target) = resize::target_dimensions(image.width, image.height, &request.resize) {
        image = resize::resize(image, target, &request.resize)?;
        debug!(width = image.width, height = image.height, "resized");
        progress(PROGRESS_RESIZED);
    }

    let (format, bytes) = encode_stage(registry, &request.target_format, &image, request.quality)?;
    debug!(%format, bytes = bytes.len(), "encoded");
    progress(PROGRESS_ENCODED);

    Ok(PipelineOutput {
        bytes,
        format,
        dimensions: Dimensions::new(image.width, image.height),
    })
}

/// Execute a dispatched task and post its responses through `post`.
///
/// Posts any number of progress messages, then exactly one success or failure.
pub fn process(
    registry: &CodecRegistry,
    message: DispatchMessage,
    mut post: impl FnMut(WorkerResponse),
) {
    let DispatchMessage {
        id,
        source,
        source_format,
        target_format,
        quality,
        resize,
    } = message;
    let _span = debug_span!("pipeline", task = %id).entered();

    let request = PipelineRequest {
        source_format,
        target_format,
        quality,
        resize,
    };
    let source = source.into_inner();

    let outcome = run(registry, &request, &source, |percent| {
        post(WorkerResponse::Progress { id, percent })
    });
    drop(source);

    match outcome {
        Ok(output) => {
            post(WorkerResponse::Progress {
                id,
                percent: PROGRESS_COMPLETE,
            });
            post(WorkerResponse::Success {
                id,
                result: output.bytes.into(),
                target_format: output.format,
            });
        }
        Err(e) => {
            debug!(error = %e, "task failed");
            post(WorkerResponse::Failure {
                id,
                message: e.to_string(),
            });
        }
    }
}
