//! Worker pool: execution units, sizing policy and round-robin dispatch.
//!
//! Each execution unit is a named OS thread with a private inbox. All units
//! share one response channel back to the coordinator, which never blocks on a
//! unit; it only reacts to what arrives on that channel.
//!
//! Dispatch is purely round-robin. The pool does not track which units are
//! busy and never moves queued work between them.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::codec::CodecRegistry;
use crate::config::PoolConfig;
use crate::error::{DispatchError, SpawnError};
use crate::message::{DispatchMessage, WorkerResponse};
use crate::pipeline;

/// Number of execution units for `intensity`.
///
/// Below the intensity threshold the pool is a single unit. At or above it
/// the pool follows the hardware hint, capped at `max_pool_size` and never
/// smaller than one. A missing hint falls back to the detected parallelism,
/// then to the cap.
pub fn pool_size(config: &PoolConfig, intensity: u8, hint: Option<usize>) -> usize {
    if intensity < config.intensity_threshold {
        return 1;
    }

    let hint = hint.unwrap_or_else(|| {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(config.max_pool_size)
    });
    hint.min(config.max_pool_size).max(1)
}

/// One isolated execution context: an inbox, the shared outbox and a codec
/// registry. Consumed by [`ExecutionUnit::run`].
pub struct ExecutionUnit {
    index: usize,
    inbox: Receiver<DispatchMessage>,
    outbox: Sender<WorkerResponse>,
    terminated: Arc<AtomicBool>,
    registry: Arc<CodecRegistry>,
}

impl ExecutionUnit {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Process tasks from the inbox one at a time until the unit is
    /// terminated.
    ///
    /// A terminated unit drops whatever is still queued and posts nothing
    /// more, including for a task it was in the middle of.
    pub fn run(self) {
        debug!(unit = self.index, "execution unit started");

        while let Ok(message) = self.inbox.recv() {
            if self.is_terminated() {
                break;
            }

            let id = message.id;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                pipeline::process(&self.registry, message, |response| self.post(response));
            }));

            if outcome.is_err() {
                warn!(unit = self.index, task = %id, "pipeline panicked");
                self.post(WorkerResponse::Failure {
                    id,
                    message: "Execution unit crashed while processing the task".to_string(),
                });
            }
        }

        debug!(unit = self.index, "execution unit stopped");
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn post(&self, response: WorkerResponse) {
        if self.is_terminated() {
            return;
        }
        // The coordinator holds the receiver for the pool's lifetime
        let _ = self.outbox.send(response);
    }
}

/// Starts an execution unit.
pub trait UnitSpawner: Send {
    /// Start `unit` running. The unit owns its context from here on.
    fn spawn(&self, unit: ExecutionUnit) -> Result<(), SpawnError>;
}

/// Runs each unit on its own named OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl UnitSpawner for ThreadSpawner {
    fn spawn(&self, unit: ExecutionUnit) -> Result<(), SpawnError> {
        let index = unit.index();
        thread::Builder::new()
            .name(format!("squash-unit-{}", index))
            .spawn(move || unit.run())
            .map(drop)
            .map_err(|e| SpawnError {
                index,
                reason: e.to_string(),
            })
    }
}

/// Coordinator-side handle to one execution unit.
#[derive(Debug)]
pub struct WorkerSlot {
    index: usize,
    inbox: Sender<DispatchMessage>,
    terminated: Arc<AtomicBool>,
    dispatched: usize,
}

impl WorkerSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tasks sent to this slot so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
    }
}

/// Result of rebuilding the pool.
#[derive(Debug)]
pub struct PoolReport {
    /// Units the sizing policy asked for.
    pub requested: usize,
    /// Units actually running.
    pub spawned: usize,
    /// Units that failed to start.
    pub failures: Vec<SpawnError>,
}

/// An ordered set of execution units with a round-robin dispatch cursor.
pub struct WorkerPool {
    config: PoolConfig,
    registry: Arc<CodecRegistry>,
    spawner: Box<dyn UnitSpawner>,
    slots: Vec<WorkerSlot>,
    cursor: usize,
    responses_tx: Sender<WorkerResponse>,
    responses_rx: Receiver<WorkerResponse>,
}

impl WorkerPool {
    /// An empty pool backed by OS threads. Call [`configure`](Self::configure)
    /// before dispatching.
    pub fn new(config: PoolConfig, registry: Arc<CodecRegistry>) -> Self {
        Self::with_spawner(config, registry, ThreadSpawner)
    }

    /// An empty pool that starts its units through `spawner`.
    pub fn with_spawner(
        config: PoolConfig,
        registry: Arc<CodecRegistry>,
        spawner: impl UnitSpawner + 'static,
    ) -> Self {
        let (responses_tx, responses_rx) = unbounded();
        Self {
            config,
            registry,
            spawner: Box::new(spawner),
            slots: Vec::new(),
            cursor: 0,
            responses_tx,
            responses_rx,
        }
    }

    /// Rebuild the pool for `intensity`.
    ///
    /// Terminates every existing unit, resets the cursor, then spawns the
    /// number of units [`pool_size`] asks for. Units that fail to spawn are
    /// skipped; the pool runs with the rest.
    pub fn configure(&mut self, intensity: u8, hint: Option<usize>) -> PoolReport {
        self.terminate_all();
        self.cursor = 0;

        let requested = pool_size(&self.config, intensity, hint);
        let mut failures = Vec::new();

        for index in 0..requested {
            let (inbox_tx, inbox_rx) = unbounded();
            let terminated = Arc::new(AtomicBool::new(false));
            let unit = ExecutionUnit {
                index,
                inbox: inbox_rx,
                outbox: self.responses_tx.clone(),
                terminated: Arc::clone(&terminated),
                registry: Arc::clone(&self.registry),
            };

            match self.spawner.spawn(unit) {
                Ok(()) => self.slots.push(WorkerSlot {
                    index: self.slots.len(),
                    inbox: inbox_tx,
                    terminated,
                    dispatched: 0,
                }),
                Err(e) => {
                    warn!(error = %e, "execution unit not started");
                    failures.push(e);
                }
            }
        }

        info!(
            intensity,
            requested,
            spawned = self.slots.len(),
            "worker pool configured"
        );

        PoolReport {
            requested,
            spawned: self.slots.len(),
            failures,
        }
    }

    /// Send a task to the slot under the cursor and advance the cursor.
    ///
    /// Returns the slot index the task is now bound to.
    ///
    /// # Errors
    ///
    /// - `DispatchError::NoWorkerAvailable` if the pool has no units
    /// - `DispatchError::Disconnected` if the selected unit has stopped
    pub fn dispatch(&mut self, message: DispatchMessage) -> Result<usize, DispatchError> {
        if self.slots.is_empty() {
            return Err(DispatchError::NoWorkerAvailable);
        }

        let slot_index = self.cursor % self.slots.len();
        self.cursor = self.cursor.wrapping_add(1);

        let id = message.id;
        let slot = &mut self.slots[slot_index];
        slot.inbox
            .send(message)
            .map_err(|_| DispatchError::Disconnected { slot: slot_index })?;
        slot.dispatched += 1;

        debug!(task = %id, slot = slot_index, "dispatched");
        Ok(slot_index)
    }

    /// Next response, if one is waiting.
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        self.responses_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResponse> {
        match self.responses_rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Number of live units.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Dispatches since the last rebuild.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slots(&self) -> &[WorkerSlot] {
        &self.slots
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    fn terminate_all(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        debug!(units = self.slots.len(), "terminating execution units");
        for slot in self.slots.drain(..) {
            slot.terminate();
            // Dropping the slot closes the unit's inbox
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate_all();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("size", &self.slots.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
