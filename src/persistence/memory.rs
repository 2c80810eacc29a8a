//! Concurrent in-memory store.
//!
//! Reference implementation of [`CoordinationStore`]: record-scoped locking
//! via `dashmap` shards, version-conditional saves, and an active-uniqueness
//! index keyed on (order, assignment type) so the exclusivity check is a
//! conditional insert rather than a read-then-write race.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::{ActiveFilter, CoordinationStore};
use crate::error::{CoordinationError, EntityKind, Result};
use crate::models::{AssignmentType, CookingTimer, Order, OrderAssignment};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    orders: DashMap<Uuid, Order>,
    assignments: DashMap<Uuid, OrderAssignment>,
    timers: DashMap<Uuid, CookingTimer>,
    /// Maps (order, type) to the currently active assignment for that pair.
    /// Entries are removed when the assignment leaves the active set.
    active_index: DashMap<(Uuid, AssignmentType), Uuid>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an order. Orders are owned by the surrounding application; the
    /// core only reads them, so this is not part of the port.
    pub fn register_order(&self, order: Order) {
        self.orders.insert(order.order_id, order);
    }

    fn maintain_active_index(&self, assignment: &OrderAssignment) {
        let key = (assignment.order_id, assignment.assignment_type);
        if assignment.status.is_terminal() {
            // Only clear the slot if it still points at this assignment.
            self.active_index
                .remove_if(&key, |_, active_id| *active_id == assignment.assignment_id);
        }
    }
}

#[async_trait]
impl CoordinationStore for InMemoryStore {
    async fn load_order(&self, order_id: Uuid) -> Result<Order> {
        self.orders
            .get(&order_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| CoordinationError::not_found(EntityKind::Order, order_id))
    }

    async fn load_assignment(&self, assignment_id: Uuid) -> Result<OrderAssignment> {
        self.assignments
            .get(&assignment_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| CoordinationError::not_found(EntityKind::Assignment, assignment_id))
    }

    async fn load_timer(&self, timer_id: Uuid) -> Result<CookingTimer> {
        self.timers
            .get(&timer_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| CoordinationError::not_found(EntityKind::Timer, timer_id))
    }

    async fn insert_assignment(&self, mut assignment: OrderAssignment) -> Result<OrderAssignment> {
        let key = (assignment.order_id, assignment.assignment_type);

        // The entry guard holds the index slot for the duration of the
        // check-and-claim, which is what makes exclusivity atomic.
        match self.active_index.entry(key) {
            Entry::Occupied(occupied) => {
                let holder = *occupied.get();
                return Err(CoordinationError::validation(format!(
                    "order {} already has an active {} assignment ({})",
                    assignment.order_id, assignment.assignment_type, holder
                )));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(assignment.assignment_id);
            }
        }

        assignment.version = 1;
        self.assignments
            .insert(assignment.assignment_id, assignment.clone());
        Ok(assignment)
    }

    async fn insert_timer(&self, mut timer: CookingTimer) -> Result<CookingTimer> {
        timer.version = 1;
        self.timers.insert(timer.timer_id, timer.clone());
        Ok(timer)
    }

    async fn save_assignment(
        &self,
        mut assignment: OrderAssignment,
        expected_version: i64,
    ) -> Result<OrderAssignment> {
        let saved = match self.assignments.entry(assignment.assignment_id) {
            Entry::Vacant(_) => {
                return Err(CoordinationError::not_found(
                    EntityKind::Assignment,
                    assignment.assignment_id,
                ))
            }
            Entry::Occupied(mut occupied) => {
                if occupied.get().version != expected_version {
                    return Err(CoordinationError::ConcurrentModification {
                        entity: EntityKind::Assignment,
                        id: assignment.assignment_id,
                        expected_version,
                    });
                }
                assignment.version = expected_version + 1;
                occupied.insert(assignment.clone());
                assignment
            }
        };

        self.maintain_active_index(&saved);
        Ok(saved)
    }

    async fn save_timer(
        &self,
        mut timer: CookingTimer,
        expected_version: i64,
    ) -> Result<CookingTimer> {
        match self.timers.entry(timer.timer_id) {
            Entry::Vacant(_) => Err(CoordinationError::not_found(
                EntityKind::Timer,
                timer.timer_id,
            )),
            Entry::Occupied(mut occupied) => {
                if occupied.get().version != expected_version {
                    return Err(CoordinationError::ConcurrentModification {
                        entity: EntityKind::Timer,
                        id: timer.timer_id,
                        expected_version,
                    });
                }
                timer.version = expected_version + 1;
                occupied.insert(timer.clone());
                Ok(timer)
            }
        }
    }

    async fn active_assignments(&self, filter: &ActiveFilter) -> Result<Vec<OrderAssignment>> {
        Ok(self
            .assignments
            .iter()
            .filter(|entry| entry.status.is_active() && filter.matches(entry.value()))
            .map(|entry| entry.clone())
            .collect())
    }

    async fn active_timers(&self) -> Result<Vec<CookingTimer>> {
        Ok(self
            .timers
            .iter()
            .filter(|entry| entry.status.is_active())
            .map(|entry| entry.clone())
            .collect())
    }

    async fn active_count_for_staff(&self, staff_id: Uuid) -> Result<usize> {
        Ok(self
            .assignments
            .iter()
            .filter(|entry| entry.staff_id == staff_id && entry.status.is_active())
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_assignment(order_id: Uuid, ty: AssignmentType) -> OrderAssignment {
        OrderAssignment::new(order_id, Uuid::new_v4(), ty, Uuid::new_v4(), Utc::now())
    }

    #[tokio::test]
    async fn test_insert_rejects_second_active_for_same_pair() {
        let store = InMemoryStore::new();
        let order_id = Uuid::new_v4();

        store
            .insert_assignment(make_assignment(order_id, AssignmentType::Cooking))
            .await
            .unwrap();

        let duplicate = store
            .insert_assignment(make_assignment(order_id, AssignmentType::Cooking))
            .await;
        assert!(matches!(duplicate, Err(CoordinationError::Validation(_))));

        // A different work function for the same order is fine
        assert!(store
            .insert_assignment(make_assignment(order_id, AssignmentType::Serving))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_terminal_save_frees_the_active_slot() {
        let store = InMemoryStore::new();
        let order_id = Uuid::new_v4();

        let mut stored = store
            .insert_assignment(make_assignment(order_id, AssignmentType::Cooking))
            .await
            .unwrap();
        stored.cancel("station down").unwrap();
        store.save_assignment(stored.clone(), 1).await.unwrap();

        // Slot is free again
        assert!(store
            .insert_assignment(make_assignment(order_id, AssignmentType::Cooking))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let stored = store
            .insert_assignment(make_assignment(Uuid::new_v4(), AssignmentType::Cooking))
            .await
            .unwrap();
        assert_eq!(stored.version, 1);

        let mut first = stored.clone();
        first.accept().unwrap();
        let saved = store.save_assignment(first, 1).await.unwrap();
        assert_eq!(saved.version, 2);

        // Second writer still holds version 1
        let mut second = stored;
        second.start_work(Utc::now()).unwrap();
        let conflict = store.save_assignment(second, 1).await;
        assert!(matches!(
            conflict,
            Err(CoordinationError::ConcurrentModification { .. })
        ));
    }

    #[tokio::test]
    async fn test_active_queries_and_workload_count() {
        let store = InMemoryStore::new();
        let staff_id = Uuid::new_v4();

        for _ in 0..3 {
            let mut a = make_assignment(Uuid::new_v4(), AssignmentType::Cooking);
            a.staff_id = staff_id;
            store.insert_assignment(a).await.unwrap();
        }
        let mut done = make_assignment(Uuid::new_v4(), AssignmentType::Cooking);
        done.staff_id = staff_id;
        let mut done = store.insert_assignment(done).await.unwrap();
        done.cancel("dropped").unwrap();
        store.save_assignment(done, 1).await.unwrap();

        assert_eq!(store.active_count_for_staff(staff_id).await.unwrap(), 3);
        assert_eq!(
            store
                .active_assignments(&ActiveFilter::for_staff(staff_id))
                .await
                .unwrap()
                .len(),
            3
        );
    }
}
