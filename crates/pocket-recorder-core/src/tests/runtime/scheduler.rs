use crate::{ManualScheduler, Scheduler, TickTask, TokioScheduler};

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

fn counting_task() -> (Arc<AtomicUsize>, TickTask) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let task: TickTask = Arc::new(move || {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });
    (count, task)
}

/// WHAT: Manual ticks run only live tasks
/// WHY: A cancelled ticker must never mutate state again
#[tokio::test]
async fn given_manual_scheduler_when_cancelling_then_task_stops_running() {
    // Given: A scheduled counting task
    let scheduler = ManualScheduler::new();
    let (count, task) = counting_task();
    let mut handle = scheduler.schedule(Duration::from_secs(1), task);

    // When: Firing twice, cancelling, firing again
    scheduler.fire_times(2).await;
    handle.cancel();
    scheduler.fire().await;

    // Then: Only the first two ticks ran
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(handle.is_cancelled());
    assert_eq!(scheduler.active_count(), 0);
}

/// WHAT: Dropping a tick handle cancels the task
/// WHY: A session dropping its ticker must not leak it
#[tokio::test]
async fn given_manual_scheduler_when_dropping_handle_then_task_cancelled() {
    // Given: A scheduled task
    let scheduler = ManualScheduler::new();
    let (count, task) = counting_task();
    let handle = scheduler.schedule(Duration::from_secs(1), task);

    // When: Dropping its handle
    drop(handle);
    scheduler.fire().await;

    // Then: It never ran
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(scheduler.active_count(), 0);
}

/// WHAT: The tokio scheduler first fires one full period after scheduling
/// WHY: A duration ticker firing at zero would count a second too early
#[tokio::test(start_paused = true)]
async fn given_tokio_scheduler_when_time_advances_then_fires_every_period() {
    // Given: A task every second
    let (count, task) = counting_task();
    let mut handle = TokioScheduler.schedule(Duration::from_secs(1), task);

    // When/Then: Nothing at half a period
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    // When/Then: Three ticks after three and a half periods
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);

    // When/Then: No more ticks after cancel
    handle.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
}
