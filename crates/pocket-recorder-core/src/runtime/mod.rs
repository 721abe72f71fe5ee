mod clock;
mod context;
mod observers;
mod scheduler;

pub use {
    clock::{Clock, ManualClock, SystemClock},
    context::SessionContext,
    observers::{Observers, Subscription},
    scheduler::{ManualScheduler, Scheduler, TickHandle, TickTask, TokioScheduler},
};
