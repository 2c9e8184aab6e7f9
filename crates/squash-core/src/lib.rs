//! Squash Core - parallel image format conversion
//!
//! This crate converts images between raster formats (decode, optional resize,
//! encode) on a small pool of isolated execution units, so the caller's
//! control flow never blocks on codec work.
//!
//! The pieces, leaves first:
//!
//! - [`codec`]: per-format codecs behind a memoized, single-flight registry
//! - [`resize`]: target dimension calculation and resampling
//! - [`pipeline`]: decode → resize → encode for one task, with progress checkpoints
//! - [`pool`]: execution units, sizing policy and round-robin dispatch
//! - [`queue`]: task board, pending list and response routing
//!
//! Buffers that cross between the coordinator and a unit are move-only
//! [`TransferBuffer`]s, so exactly one side owns them at a time.

pub mod buffer;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod message;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod resize;
pub mod task;

#[cfg(test)]
mod test_support;

pub use buffer::{BufferSlot, TransferBuffer, TransferError};
pub use codec::{Codec, CodecRegistry, LoadError};
pub use config::{ConfigError, PoolConfig, QualityDefaults, SquashConfig};
pub use decode::{DecodeError, PixelBuffer};
pub use encode::{EncodeError, Quality};
pub use error::{DispatchError, SpawnError};
pub use format::{format_file_size, FormatTag};
pub use message::{DispatchMessage, TaskId, WorkerResponse};
pub use pipeline::PipelineError;
pub use pool::{pool_size, PoolReport, WorkerPool};
pub use queue::{DispatchOutcome, QueueManager};
pub use resize::{calculate_dimensions, Dimensions, ResizeConfig, ResizePreset};
pub use task::{Task, TaskSpec, TaskStatus};
