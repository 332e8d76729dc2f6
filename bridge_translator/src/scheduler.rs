//! Cancellable delayed tasks delivered back to the session's serial context.
//!
//! A scheduled task never touches the session itself. When its delay
//! elapses it is posted to the session driver, which runs it between
//! transactions. The [`CancelToken`] travels with the task so one that fired
//! but is still queued when cancelled gets dropped on delivery.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{sync::mpsc, task::AbortHandle};

use crate::rotation::RotationSnapshot;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Work that runs later on the session's context.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredTask {
    RevertRotation(RotationSnapshot),
}

/// A task whose delay has elapsed (or, for manual schedulers, is pending).
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub token: CancelToken,
    pub task: DeferredTask,
}

/// Owned handle to a scheduled task.
#[derive(Debug)]
pub struct TaskHandle {
    token: CancelToken,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    pub fn new(token: CancelToken, abort: Option<AbortHandle>) -> Self {
        Self { token, abort }
    }

    pub fn cancel(&self) {
        self.token.cancel();
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

pub trait TaskScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: DeferredTask) -> TaskHandle;
}

/// Scheduler backed by the tokio timer. Fired tasks arrive on the receiver
/// returned by [`TokioScheduler::new`].
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<ScheduledTask>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScheduledTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TaskScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) -> TaskHandle {
        let token = CancelToken::default();
        let scheduled = ScheduledTask {
            token: token.clone(),
            task,
        };
        let tx = self.tx.clone();
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(scheduled);
        });
        TaskHandle::new(token, Some(join.abort_handle()))
    }
}
