//! Queue manager: the coordinator the collaborator talks to.
//!
//! Owns the task board and the worker pool. Enqueued ids collect in a pending
//! list; a drain dispatches all of them in enqueue order and empties the list.
//! Responses coming back from the pool are routed to their task by id, and
//! responses for ids no longer on the board are dropped.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::message::{TaskId, WorkerResponse};
use crate::pool::{PoolReport, WorkerPool};
use crate::task::{Task, TaskBoard, TaskSpec, TaskStatus};

/// What happened to one id during a drain.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub id: TaskId,
    /// The slot the task was bound to, or why it failed.
    pub result: Result<usize, DispatchError>,
}

/// Accepts tasks and enqueue requests and relays unit messages to task state.
#[derive(Debug)]
pub struct QueueManager {
    pool: WorkerPool,
    board: TaskBoard,
    pending: Vec<TaskId>,
}

impl QueueManager {
    pub fn new(pool: WorkerPool) -> Self {
        Self {
            pool,
            board: TaskBoard::new(),
            pending: Vec::new(),
        }
    }

    /// Create a task in `Pending`. It is not dispatched until enqueued.
    pub fn add_task(&mut self, spec: TaskSpec) -> TaskId {
        let id = self.board.insert(spec);
        debug!(task = %id, "task created");
        id
    }

    /// Append `id` to the pending list.
    pub fn enqueue(&mut self, id: TaskId) {
        self.pending.push(id);
    }

    /// Enqueue every id, then drain once.
    pub fn enqueue_batch(&mut self, ids: impl IntoIterator<Item = TaskId>) -> Vec<DispatchOutcome> {
        self.pending.extend(ids);
        self.drain()
    }

    /// Dispatch every pending id in enqueue order and clear the list.
    ///
    /// A task that cannot be dispatched is marked `Failed` with the error
    /// message; the rest of the batch is unaffected. Ids that are no longer on
    /// the board are skipped.
    ///
    /// Enqueuing an id whose source was already transferred fails that task
    /// with the transfer error even while a unit is still working on it; the
    /// unit's later `Success` or `Failure` is then discarded by [`Task::apply`].
    pub fn drain(&mut self) -> Vec<DispatchOutcome> {
        let pending = std::mem::take(&mut self.pending);
        let mut outcomes = Vec::with_capacity(pending.len());
        let pool = &mut self.pool;

        for id in pending {
            let Some(task) = self.board.get_mut(id) else {
                debug!(task = %id, "enqueued task no longer exists");
                continue;
            };

            let result = task
                .take_dispatch()
                .map_err(DispatchError::from)
                .and_then(|message| pool.dispatch(message));

            match &result {
                Ok(slot) => task.mark_processing(*slot),
                Err(e) => {
                    warn!(task = %id, error = %e, "dispatch failed");
                    task.fail(e.to_string());
                }
            }
            outcomes.push(DispatchOutcome { id, result });
        }
        outcomes
    }

    /// Relay one unit message to its task.
    ///
    /// Returns `false` if the message was dropped: no task owns the id, or the
    /// task no longer accepts messages.
    pub fn route(&mut self, response: WorkerResponse) -> bool {
        let id = response.id();
        match self.board.get_mut(id) {
            Some(task) => task.apply(response),
            None => {
                debug!(task = %id, "dropping message for removed task");
                false
            }
        }
    }

    /// Route every message already waiting. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(response) = self.pool.try_recv() {
            if self.route(response) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait up to `timeout` for a message, then route it and everything
    /// queued behind it. Returns how many were applied.
    pub fn wait_for_messages(&mut self, timeout: Duration) -> usize {
        let Some(first) = self.pool.recv_timeout(timeout) else {
            return 0;
        };
        let applied = usize::from(self.route(first));
        applied + self.pump()
    }

    /// Route messages until no task is `Processing` or `timeout` elapses.
    ///
    /// Returns `true` if everything settled. Tasks stranded on units that a
    /// rebuild terminated never settle.
    pub fn wait_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.board.processing() > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait_for_messages(deadline - now);
        }
        true
    }

    /// Remove a task. Pending enqueues and late messages for it are dropped.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.pending.retain(|pending| *pending != id);
        self.board.remove(id)
    }

    /// Rebuild the pool for a new intensity.
    ///
    /// Tasks in flight on the old units stay `Processing`; they are never
    /// redispatched.
    pub fn reconfigure(&mut self, intensity: u8, hint: Option<usize>) -> PoolReport {
        let stranded = self.board.processing();
        if stranded > 0 {
            warn!(stranded, "rebuilding pool with tasks in flight");
        }
        self.pool.configure(intensity, hint)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.board.get(id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.board.get_mut(id)
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Ids waiting for the next drain.
    pub fn pending(&self) -> &[TaskId] {
        &self.pending
    }

    /// Whether every task has finished.
    pub fn is_settled(&self) -> bool {
        self.board.processing() == 0 && self.board.count(TaskStatus::Pending) == 0
    }
}
