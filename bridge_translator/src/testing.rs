//! Deterministic collaborators for tests: recording sinks, a manual clock,
//! a manual scheduler and recording services.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use bridge_shared::{block::FrontBlockId, math::Vec3i};

use crate::{
    collaborators::{Clock, PacketSink, SessionServices},
    scheduler::{CancelToken, DeferredTask, ScheduledTask, TaskHandle, TaskScheduler},
};

/// Sink that keeps every packet; clones share the buffer.
#[derive(Debug)]
pub struct RecordingSink<P> {
    packets: Arc<Mutex<Vec<P>>>,
}

impl<P> Clone for RecordingSink<P> {
    fn clone(&self) -> Self {
        Self {
            packets: Arc::clone(&self.packets),
        }
    }
}

impl<P> Default for RecordingSink<P> {
    fn default() -> Self {
        Self {
            packets: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<P> RecordingSink<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<P> {
        std::mem::take(&mut *self.packets.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<P: Send> PacketSink<P> for RecordingSink<P> {
    fn send(&self, packet: P) {
        self.packets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(packet);
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(start_ms)))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scheduler that queues tasks until the test fires them.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queued: Arc<Mutex<Vec<(Duration, ScheduledTask)>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued task, cancelled ones included.
    pub fn drain(&self) -> Vec<ScheduledTask> {
        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        queued.drain(..).map(|(_, task)| task).collect()
    }

    /// Tasks queued and not cancelled.
    pub fn live(&self) -> usize {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, t)| !t.token.is_cancelled())
            .count()
    }

    /// Total tasks ever queued and not yet drained.
    pub fn queued(&self) -> usize {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(d, _)| *d)
            .collect()
    }
}

impl TaskScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) -> TaskHandle {
        let token = CancelToken::default();
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((
                delay,
                ScheduledTask {
                    token: token.clone(),
                    task,
                },
            ));
        TaskHandle::new(token, None)
    }
}

/// Calls made into [`SessionServices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCall {
    FlushBookEdits,
    AttackCooldown,
    RestoreSkin,
}

/// Services that record calls and serve custom skulls from a map.
#[derive(Debug, Clone, Default)]
pub struct RecordingServices {
    calls: Arc<Mutex<Vec<ServiceCall>>>,
    skulls: HashMap<Vec3i, FrontBlockId>,
}

impl RecordingServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skull(mut self, position: Vec3i, block: FrontBlockId) -> Self {
        self.skulls.insert(position, block);
        self
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: ServiceCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl SessionServices for RecordingServices {
    fn flush_book_edits(&mut self) {
        self.record(ServiceCall::FlushBookEdits);
    }

    fn send_attack_cooldown(&mut self) {
        self.record(ServiceCall::AttackCooldown);
    }

    fn restore_original_skin(&mut self) {
        self.record(ServiceCall::RestoreSkin);
    }

    fn custom_skull_block(&self, position: Vec3i) -> Option<FrontBlockId> {
        self.skulls.get(&position).copied()
    }
}
