use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error};

/// Work run on every tick of a repeating task.
pub type TickTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Source of cancellable repeating tasks (duration ticker, position poller).
pub trait Scheduler: Send + Sync {
    /// Run `task` every `period` until the returned handle is cancelled or dropped.
    fn schedule(&self, period: Duration, task: TickTask) -> TickHandle;
}

/// Handle to a scheduled repeating task.
///
/// Cancellation is synchronous: once [`TickHandle::cancel`] returns, the
/// task will not start another tick. Dropping the handle cancels it.
pub struct TickHandle {
    cancelled: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl TickHandle {
    fn new(cancelled: Arc<AtomicBool>, join: Option<JoinHandle<()>>) -> Self {
        Self { cancelled, join }
    }

    /// A handle that was never scheduled.
    fn inert() -> Self {
        Self::new(Arc::new(AtomicBool::new(true)), None)
    }

    /// Stop the task. Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }

    /// Whether the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler backed by `tokio::time::interval`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, period: Duration, task: TickTask) -> TickHandle {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "No async runtime available, ticker not started");
                return TickHandle::inert();
            }
        };

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let join = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately; skip it so the first
            // callback lands one full period after scheduling.
            interval.tick().await;

            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                task().await;
            }
        });

        debug!(period_ms = period.as_millis(), "Repeating task scheduled");

        TickHandle::new(cancelled, Some(join))
    }
}

/// Scheduler whose ticks only happen when a test calls [`ManualScheduler::fire`].
#[derive(Default, Clone)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<(Arc<AtomicBool>, TickTask)>>>,
}

impl ManualScheduler {
    /// Create a scheduler with no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick of every live task, in scheduling order.
    pub async fn fire(&self) {
        let live: Vec<(Arc<AtomicBool>, TickTask)> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.retain(|(cancelled, _)| !cancelled.load(Ordering::Acquire));
            tasks.clone()
        };

        for (cancelled, task) in live {
            // An earlier task in this round may have cancelled this one.
            if cancelled.load(Ordering::Acquire) {
                continue;
            }
            task().await;
        }
    }

    /// Run `n` rounds of [`ManualScheduler::fire`].
    pub async fn fire_times(&self, n: usize) {
        for _ in 0..n {
            self.fire().await;
        }
    }

    /// Number of scheduled tasks that have not been cancelled.
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(cancelled, _)| !cancelled.load(Ordering::Acquire))
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, _period: Duration, task: TickTask) -> TickHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((Arc::clone(&cancelled), task));
        TickHandle::new(cancelled, None)
    }
}
