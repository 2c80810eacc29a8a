mod common;

use common::{harness, seed_order};
use futures::future::join_all;
use kitchen_core::clock::Clock;
use kitchen_core::error::CoordinationError;
use kitchen_core::models::AssignmentType;
use kitchen_core::persistence::CoordinationStore;
use kitchen_core::state_machine::TimerStatus;
use uuid::Uuid;

#[tokio::test]
async fn simultaneous_pauses_resolve_to_one_winner() {
    let h = harness();
    let order = seed_order(&h, 4, 1);
    let timer = h
        .timers
        .create_timer(
            order.order_id,
            order.items[0].menu_item_id,
            "Confit",
            Uuid::new_v4(),
            1,
            Some(30),
        )
        .await
        .unwrap();
    h.timers.start_timer(timer.timer_id).await.unwrap();

    // Two writers read the same snapshot (same version) and both try to
    // pause: the conditional save lets exactly one through.
    let snapshot = h.store.load_timer(timer.timer_id).await.unwrap();
    let now = h.clock.now();

    let mut first = snapshot.clone();
    first.pause(now).unwrap();
    let mut second = snapshot.clone();
    second.pause(now).unwrap();

    let first_result = h.store.save_timer(first, snapshot.version).await;
    let second_result = h.store.save_timer(second, snapshot.version).await;

    assert!(first_result.is_ok());
    match second_result {
        Err(CoordinationError::ConcurrentModification {
            expected_version, ..
        }) => assert_eq!(expected_version, snapshot.version),
        other => panic!("expected ConcurrentModification, got {other:?}"),
    }

    let stored = h.store.load_timer(timer.timer_id).await.unwrap();
    assert_eq!(stored.status, TimerStatus::Paused);
    assert_eq!(stored.version, snapshot.version + 1);
}

#[tokio::test]
async fn loser_succeeds_after_rereading() {
    let h = harness();
    let order = seed_order(&h, 4, 1);
    let timer = h
        .timers
        .create_timer(
            order.order_id,
            order.items[0].menu_item_id,
            "Stock",
            Uuid::new_v4(),
            1,
            Some(30),
        )
        .await
        .unwrap();
    h.timers.start_timer(timer.timer_id).await.unwrap();

    let snapshot = h.store.load_timer(timer.timer_id).await.unwrap();
    let mut stale = snapshot.clone();
    stale.pause(h.clock.now()).unwrap();

    // Another actor wins the race through the service path
    h.timers.pause_timer(timer.timer_id).await.unwrap();

    let conflict = h.store.save_timer(stale, snapshot.version).await;
    assert!(conflict.unwrap_err().is_retryable());

    // Retry against fresh state: the pause already happened, so the valid
    // next step is a resume.
    h.clock.advance_minutes(2);
    let resumed = h.timers.resume_timer(timer.timer_id).await.unwrap();
    assert_eq!(resumed.status, TimerStatus::Running);
    assert_eq!(resumed.paused_minutes, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_assignment_attempts_yield_one_active_binding() {
    let h = harness();
    let order = seed_order(&h, 7, 1);
    let manager = Uuid::new_v4();

    let attempts = (0..8).map(|_| {
        let tracker = h.tracker.clone();
        let order_id = order.order_id;
        tokio::spawn(async move {
            tracker
                .assign(order_id, Uuid::new_v4(), AssignmentType::Cooking, manager)
                .await
        })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(CoordinationError::Validation(_))
        ));
    }

    // The invariant held: one active cooking assignment for the order
    let active = h
        .store
        .active_assignments(&kitchen_core::persistence::ActiveFilter::for_order(
            order.order_id,
        ))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reassign_cancel_storm_preserves_exclusivity() {
    let h = harness();
    let order = seed_order(&h, 2, 1);
    let manager = Uuid::new_v4();

    let first = h
        .tracker
        .assign(order.order_id, Uuid::new_v4(), AssignmentType::Cooking, manager)
        .await
        .unwrap();

    // Interleave reassigns against the live binding with assign attempts
    // that should keep bouncing off the occupied slot.
    let reassigns = (0..4).map(|_| {
        let tracker = h.tracker.clone();
        let id = first.assignment_id;
        tokio::spawn(async move { tracker.reassign(id, Uuid::new_v4(), manager).await })
    });
    let assigns = (0..4).map(|_| {
        let tracker = h.tracker.clone();
        let order_id = order.order_id;
        tokio::spawn(async move {
            tracker
                .assign(order_id, Uuid::new_v4(), AssignmentType::Cooking, manager)
                .await
        })
    });

    let _ = join_all(reassigns).await;
    let assign_results: Vec<_> = join_all(assigns)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();
    assert!(assign_results.iter().all(|r| r.is_err()));

    let active = h
        .store
        .active_assignments(&kitchen_core::persistence::ActiveFilter::for_order(
            order.order_id,
        ))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].assignment_id, first.assignment_id);
}
