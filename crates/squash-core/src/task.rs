//! Task state as seen by the coordinator.
//!
//! A [`Task`] is created from collaborator input, dispatched once, and from
//! then on is mutated only by [`WorkerResponse`]s from the unit it was bound
//! to. Status moves forward only:
//!
//! ```text
//! Pending -> Processing -> Complete
//!                       \-> Failed
//! ```
//!
//! A task that fails before reaching a unit (no worker, buffer gone) goes
//! straight from `Pending` to `Failed`.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::{BufferSlot, TransferBuffer, TransferError};
use crate::format::FormatTag;
use crate::message::{DispatchMessage, TaskId, WorkerResponse};
use crate::resize::ResizeConfig;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}

impl TaskStatus {
    /// Whether no further transition is possible.
    pub fn is_finished(self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Failed)
    }
}

/// Everything the collaborator supplies to create a task.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Display name, usually the source file name.
    pub name: String,
    pub source: Vec<u8>,
    pub source_format: String,
    pub target_format: String,
    pub quality: u8,
    pub resize: ResizeConfig,
}

/// One image's end-to-end job.
#[derive(Debug)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub source_format: String,
    pub target_format: String,
    pub quality: u8,
    pub resize: ResizeConfig,
    pub status: TaskStatus,
    /// 0-100.
    pub progress: u8,
    pub result_format: Option<FormatTag>,
    pub error: Option<String>,
    /// Source size in bytes, kept after the source buffer is handed off.
    pub original_size: usize,
    /// Slot the task was bound to on dispatch.
    pub slot: Option<usize>,
    source: BufferSlot,
    result: BufferSlot,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl Task {
    pub fn new(id: TaskId, spec: TaskSpec) -> Self {
        let original_size = spec.source.len();
        Self {
            id,
            name: spec.name,
            source_format: spec.source_format,
            target_format: spec.target_format,
            quality: spec.quality,
            resize: spec.resize,
            status: TaskStatus::Pending,
            progress: 0,
            result_format: None,
            error: None,
            original_size,
            slot: None,
            source: BufferSlot::filled("source", TransferBuffer::new(spec.source)),
            result: BufferSlot::empty("result"),
            started_at: None,
            finished_at: None,
        }
    }

    /// Build the dispatch message, moving the source buffer into it.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` if the source was already handed off.
    pub fn take_dispatch(&mut self) -> Result<DispatchMessage, TransferError> {
        let source = self.source.take()?;
        Ok(DispatchMessage {
            id: self.id,
            source,
            source_format: self.source_format.clone(),
            target_format: self.target_format.clone(),
            quality: self.quality,
            resize: self.resize,
        })
    }

    /// Whether the source buffer is still held by the coordinator.
    pub fn has_source(&self) -> bool {
        self.source.is_present()
    }

    /// Record that the task now runs on `slot`.
    pub fn mark_processing(&mut self, slot: usize) {
        if self.status != TaskStatus::Pending {
            return;
        }
        self.status = TaskStatus::Processing;
        self.slot = Some(slot);
        self.started_at = Some(Instant::now());
    }

    /// Mark the task failed with `message`. No-op once finished.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.status.is_finished() {
            return;
        }
        self.status = TaskStatus::Failed;
        self.error = Some(message.into());
        self.finished_at = Some(Instant::now());
    }

    /// Apply a response from the task's unit.
    ///
    /// Returns `false` if the response was ignored: it belongs to another
    /// task, or the task is not in `Processing` (late or duplicate message).
    pub fn apply(&mut self, response: WorkerResponse) -> bool {
        if response.id() != self.id || self.status != TaskStatus::Processing {
            return false;
        }

        match response {
            WorkerResponse::Progress { percent, .. } => {
                // Checkpoints only move forward
                self.progress = self.progress.max(percent.min(100));
            }
            WorkerResponse::Success {
                result,
                target_format,
                ..
            } => {
                self.progress = 100;
                self.status = TaskStatus::Complete;
                self.result_format = Some(target_format);
                self.result.put(result);
                self.finished_at = Some(Instant::now());
            }
            WorkerResponse::Failure { message, .. } => {
                self.status = TaskStatus::Failed;
                self.error = Some(message);
                self.finished_at = Some(Instant::now());
            }
        }
        debug!(task = %self.id, status = ?self.status, progress = self.progress, "task updated");
        true
    }

    /// Borrow the result buffer, if any.
    pub fn result(&self) -> Option<&TransferBuffer> {
        self.result.get()
    }

    /// Move the result buffer out to the collaborator.
    pub fn take_result(&mut self) -> Result<TransferBuffer, TransferError> {
        self.result.take()
    }

    /// Whole seconds spent processing; frozen once the task finishes.
    pub fn elapsed_secs(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_secs(),
            (Some(start), None) => start.elapsed().as_secs(),
            _ => 0,
        }
    }

    /// Result size as a fraction of the original size.
    pub fn compression_ratio(&self) -> Option<f64> {
        let result = self.result.get()?;
        if self.original_size == 0 {
            return None;
        }
        Some(result.len() as f64 / self.original_size as f64)
    }
}

/// All tasks visible to the collaborator, in creation order.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: BTreeMap<TaskId, Task>,
    next_id: u64,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a task and return its id. Ids are never reused.
    pub fn insert(&mut self, spec: TaskSpec) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, Task::new(id, spec));
        id
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    /// Drop a task. Later messages for its id find no owner.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.tasks.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks in `status`.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.values().filter(|t| t.status == status).count()
    }

    /// Tasks currently running on a unit.
    pub fn processing(&self) -> usize {
        self.count(TaskStatus::Processing)
    }
}
