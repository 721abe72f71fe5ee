use crate::{Observers, tests::support::collector};

use std::sync::{Arc, Mutex};

/// WHAT: Observers are called in registration order
/// WHY: Later observers may rely on earlier ones having run
#[test]
fn given_three_observers_when_notifying_then_called_in_order() {
    // Given: Three observers appending their index
    let observers = Observers::<u32>::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let subscriptions: Vec<_> = (0..3)
        .map(|i| {
            let order = Arc::clone(&order);
            observers.subscribe(move |_: &u32| {
                order.lock().unwrap_or_else(|e| e.into_inner()).push(i)
            })
        })
        .collect();

    // When: Notifying once
    observers.notify(&7);

    // Then: 0, 1, 2
    assert_eq!(*order.lock().unwrap_or_else(|e| e.into_inner()), vec![0, 1, 2]);
    assert_eq!(observers.len(), subscriptions.len());
}

/// WHAT: Unsubscribe and drop both unregister, detach keeps the observer
/// WHY: The subscription handle owns the registration
#[test]
fn given_subscriptions_when_unsubscribed_dropped_or_detached_then_registry_follows() {
    // Given: Three subscriptions
    let observers = Observers::<u32>::new();
    let (seen, observer) = collector::<u32>();
    let explicit = observers.subscribe(|_: &u32| {});
    let dropped = observers.subscribe(|_: &u32| {});
    observers.subscribe(observer).detach();
    assert_eq!(observers.len(), 3);

    // When: Unsubscribing one and dropping another
    explicit.unsubscribe();
    drop(dropped);

    // Then: Only the detached observer remains and still receives values
    assert_eq!(observers.len(), 1);
    observers.notify(&1);
    assert_eq!(*seen.lock().unwrap_or_else(|e| e.into_inner()), vec![1]);
}

/// WHAT: A panicking observer does not block the ones after it
/// WHY: Delivery failures are isolated per observer
#[test]
fn given_panicking_observer_when_notifying_then_later_observers_still_run() {
    // Given: A panicking observer before a collecting one
    let observers = Observers::<&'static str>::new();
    let _broken = observers.subscribe(|_: &&'static str| {
        #[allow(clippy::panic)]
        {
            panic!("observer failure");
        }
    });
    let (seen, observer) = collector::<&'static str>();
    let _healthy = observers.subscribe(observer);

    // When: Notifying twice
    observers.notify(&"first");
    observers.notify(&"second");

    // Then: The healthy observer saw both
    assert_eq!(
        *seen.lock().unwrap_or_else(|e| e.into_inner()),
        vec!["first", "second"]
    );
}

/// WHAT: An observer may unsubscribe another during delivery
/// WHY: Callbacks run outside the registry lock
#[test]
fn given_observer_that_unsubscribes_when_notifying_then_no_deadlock() {
    // Given: An observer holding the subscription of another one
    let observers = Observers::<u32>::new();
    let victim = Arc::new(Mutex::new(Some(observers.subscribe(|_: &u32| {}))));
    let slot = Arc::clone(&victim);
    let _killer = observers.subscribe(move |_: &u32| {
        if let Some(subscription) = slot.lock().unwrap_or_else(|e| e.into_inner()).take() {
            subscription.unsubscribe();
        }
    });

    // When: Notifying
    observers.notify(&1);

    // Then: The victim is gone
    assert_eq!(observers.len(), 1);
    assert!(victim.lock().unwrap_or_else(|e| e.into_inner()).is_none());
}
