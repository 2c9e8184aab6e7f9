//! Messages exchanged between the coordinator and execution units.
//!
//! One [`DispatchMessage`] goes to a unit per task. The unit answers with any
//! number of [`WorkerResponse::Progress`] messages followed by exactly one
//! [`WorkerResponse::Success`] or [`WorkerResponse::Failure`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::TransferBuffer;
use crate::format::FormatTag;
use crate::resize::ResizeConfig;

/// Identifies a task across the coordinator and its execution units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Coordinator → unit: start a task.
///
/// Format tags travel as strings, exactly as the collaborator supplied them;
/// the pipeline resolves them and fails the task if they are not recognized.
/// Quality is likewise validated only at the encode stage.
#[derive(Debug)]
pub struct DispatchMessage {
    pub id: TaskId,
    pub source: TransferBuffer,
    pub source_format: String,
    pub target_format: String,
    pub quality: u8,
    pub resize: ResizeConfig,
}

/// Unit → coordinator.
#[derive(Debug)]
pub enum WorkerResponse {
    /// Coarse checkpoint, 0-100.
    Progress { id: TaskId, percent: u8 },
    /// Final result; ownership of the encoded bytes moves to the receiver.
    Success {
        id: TaskId,
        result: TransferBuffer,
        target_format: FormatTag,
    },
    /// Final failure with a human-readable message.
    Failure { id: TaskId, message: String },
}

impl WorkerResponse {
    /// The task this message belongs to.
    pub fn id(&self) -> TaskId {
        match self {
            WorkerResponse::Progress { id, .. }
            | WorkerResponse::Success { id, .. }
            | WorkerResponse::Failure { id, .. } => *id,
        }
    }

    /// Whether this is the last message for its task.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerResponse::Progress { .. })
    }
}
