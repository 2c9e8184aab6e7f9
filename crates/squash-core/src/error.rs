//! Errors raised by the worker pool and the queue manager.
//!
//! Stage errors (`DecodeError`, `EncodeError`, `LoadError`, ...) live next to
//! their stages and never cross the unit boundary as values; they arrive at
//! the coordinator only as the text of a failure message.

use thiserror::Error;

use crate::buffer::TransferError;

/// An execution unit could not be created. Non-fatal: the pool shrinks.
#[derive(Debug, Error)]
#[error("Failed to spawn execution unit {index}: {reason}")]
pub struct SpawnError {
    pub index: usize,
    pub reason: String,
}

/// A task could not be handed to an execution unit. Fatal for that task.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The pool has no live units.
    #[error("No worker available")]
    NoWorkerAvailable,

    /// The task's source buffer was already handed off.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The selected unit is gone and can no longer receive work.
    #[error("Execution unit {slot} is no longer accepting tasks")]
    Disconnected { slot: usize },
}
