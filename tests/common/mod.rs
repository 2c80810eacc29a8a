//! Shared test harness: every service wired against the in-memory store and
//! a manual clock so time-sensitive behavior is deterministic.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use kitchen_core::clock::{Clock, ManualClock, SharedClock};
use kitchen_core::config::CoordinationConfig;
use kitchen_core::coordination::{
    AssignmentTracker, CookingTimerService, FlatRateEstimator, QueueCoordinator,
};
use kitchen_core::events::EventPublisher;
use kitchen_core::models::{Order, OrderItem};
use kitchen_core::persistence::{CoordinationStore, InMemoryStore};

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: ManualClock,
    pub events: EventPublisher,
    pub tracker: Arc<AssignmentTracker>,
    pub timers: CookingTimerService,
    pub coordinator: QueueCoordinator,
}

pub fn harness() -> Harness {
    let config = CoordinationConfig::default();
    let store = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    let shared_clock: SharedClock = Arc::new(clock.clone());
    let events = EventPublisher::with_clock(config.event_channel_capacity, shared_clock.clone());

    let port: Arc<dyn CoordinationStore> = store.clone();
    let tracker = Arc::new(AssignmentTracker::new(
        port.clone(),
        events.clone(),
        shared_clock.clone(),
        &config,
    ));
    let timers = CookingTimerService::new(
        port.clone(),
        events.clone(),
        shared_clock.clone(),
        Arc::new(FlatRateEstimator::from_config(&config)),
        &config,
    );
    let coordinator = QueueCoordinator::new(port, events.clone(), shared_clock, tracker.clone());

    Harness {
        store,
        clock,
        events,
        tracker,
        timers,
        coordinator,
    }
}

/// Seed an order placed at the harness clock's current time.
pub fn seed_order(harness: &Harness, table_number: u32, item_count: u32) -> Order {
    let items = vec![OrderItem {
        menu_item_id: Uuid::new_v4(),
        name: "Test Dish".to_string(),
        quantity: item_count,
    }];
    let order = Order::new(table_number, items, harness.clock.now());
    harness.store.register_order(order.clone());
    order
}
