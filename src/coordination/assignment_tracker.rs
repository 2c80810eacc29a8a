//! # Assignment Tracker
//!
//! Owns the staff-to-order binding: creating assignments under the capacity
//! and exclusivity rules, driving the assignment lifecycle, and workload
//! accounting. Every mutation is read-modify-write against the version the
//! caller loaded; a lost race surfaces as `ConcurrentModification` and the
//! caller retries against fresh state.

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::CoordinationConfig;
use crate::error::{CoordinationError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::logging::log_assignment_operation;
use crate::models::{AssignmentType, OrderAssignment};
use crate::persistence::CoordinationStore;
use crate::priority::{self, PriorityLevel};

pub struct AssignmentTracker {
    store: Arc<dyn CoordinationStore>,
    events: EventPublisher,
    clock: SharedClock,
    default_capacity: usize,
    capacity_overrides: DashMap<Uuid, usize>,
}

impl AssignmentTracker {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        events: EventPublisher,
        clock: SharedClock,
        config: &CoordinationConfig,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            default_capacity: config.default_staff_capacity,
            capacity_overrides: DashMap::new(),
        }
    }

    /// Override the concurrent-assignment limit for one staff member.
    pub fn set_staff_capacity(&self, staff_id: Uuid, capacity: usize) {
        self.capacity_overrides.insert(staff_id, capacity);
    }

    pub fn capacity_for(&self, staff_id: Uuid) -> usize {
        self.capacity_overrides
            .get(&staff_id)
            .map(|entry| *entry)
            .unwrap_or(self.default_capacity)
    }

    /// Current concurrent active-assignment count for a staff member.
    pub async fn staff_workload(&self, staff_id: Uuid) -> Result<usize> {
        self.store.active_count_for_staff(staff_id).await
    }

    async fn check_capacity(&self, staff_id: Uuid) -> Result<()> {
        let limit = self.capacity_for(staff_id);
        let active = self.store.active_count_for_staff(staff_id).await?;
        if active >= limit {
            return Err(CoordinationError::CapacityExceeded {
                staff_id,
                active,
                limit,
            });
        }
        Ok(())
    }

    /// Create an assignment for one work function of one order.
    ///
    /// Fails with `CapacityExceeded` when the staff member is at their
    /// limit, and rejects a second active assignment for the same
    /// (order, type) pair at the store's conditional insert.
    pub async fn assign(
        &self,
        order_id: Uuid,
        staff_id: Uuid,
        assignment_type: AssignmentType,
        assigned_by: Uuid,
    ) -> Result<OrderAssignment> {
        let order = self.store.load_order(order_id).await?;
        self.check_capacity(staff_id).await?;

        let now = self.clock.now();
        let mut assignment =
            OrderAssignment::new(order_id, staff_id, assignment_type, assigned_by, now);
        assignment.set_priority(priority::evaluate(
            now,
            Some(order.ordered_at),
            order.special_instructions.as_deref(),
            order.item_count(),
        ));

        let stored = self.store.insert_assignment(assignment).await?;
        self.events.publish(DomainEvent::AssignmentCreated {
            assignment_id: stored.assignment_id,
            order_id: stored.order_id,
            staff_id: stored.staff_id,
        });
        log_assignment_operation(
            "assign",
            stored.assignment_id,
            stored.order_id,
            stored.staff_id,
            &stored.status.to_string(),
        );
        Ok(stored)
    }

    /// Load, apply, conditionally save, then publish the status change if
    /// one occurred. The closure must leave the record untouched on error.
    async fn mutate<F>(&self, assignment_id: Uuid, operation: &str, apply: F) -> Result<OrderAssignment>
    where
        F: FnOnce(&mut OrderAssignment) -> Result<()>,
    {
        let loaded = self.store.load_assignment(assignment_id).await?;
        let expected_version = loaded.version;
        let old_status = loaded.status;

        let mut updated = loaded;
        apply(&mut updated)?;

        let saved = self
            .store
            .save_assignment(updated, expected_version)
            .await?;

        if saved.status != old_status {
            self.events.publish(DomainEvent::status_changed(
                saved.assignment_id,
                saved.order_id,
                old_status,
                saved.status,
            ));
        }
        log_assignment_operation(
            operation,
            saved.assignment_id,
            saved.order_id,
            saved.staff_id,
            &saved.status.to_string(),
        );
        Ok(saved)
    }

    /// Staff member acknowledges the assignment.
    pub async fn accept(&self, assignment_id: Uuid) -> Result<OrderAssignment> {
        self.mutate(assignment_id, "accept", |a| a.accept()).await
    }

    /// Begin working. Only startable states (Assigned, Accepted, Paused)
    /// qualify; recovery from Overdue goes through the scan's own paths.
    pub async fn start_work(&self, assignment_id: Uuid) -> Result<OrderAssignment> {
        let now = self.clock.now();
        self.mutate(assignment_id, "start_work", |a| {
            if !a.status.can_be_started() {
                return Err(CoordinationError::InvalidTransition {
                    entity: crate::error::EntityKind::Assignment,
                    id: a.assignment_id,
                    from: a.status.to_string(),
                    to: crate::state_machine::AssignmentStatus::InProgress.to_string(),
                });
            }
            a.start_work(now)
        })
        .await
    }

    pub async fn pause(&self, assignment_id: Uuid) -> Result<OrderAssignment> {
        self.mutate(assignment_id, "pause", |a| a.pause()).await
    }

    /// Finish the work, optionally recording a quality score.
    pub async fn complete(
        &self,
        assignment_id: Uuid,
        quality_score: Option<u8>,
    ) -> Result<OrderAssignment> {
        let now = self.clock.now();
        self.mutate(assignment_id, "complete", |a| {
            a.complete(now)?;
            if let Some(score) = quality_score {
                a.record_quality_score(score);
            }
            Ok(())
        })
        .await
    }

    pub async fn cancel(&self, assignment_id: Uuid, reason: &str) -> Result<OrderAssignment> {
        self.mutate(assignment_id, "cancel", |a| a.cancel(reason))
            .await
    }

    pub async fn reject(&self, assignment_id: Uuid, reason: &str) -> Result<OrderAssignment> {
        self.mutate(assignment_id, "reject", |a| a.reject(reason))
            .await
    }

    pub async fn flag_quality_issue(
        &self,
        assignment_id: Uuid,
        description: &str,
    ) -> Result<OrderAssignment> {
        self.mutate(assignment_id, "flag_quality_issue", |a| {
            a.flag_quality_issue(description)
        })
        .await
    }

    /// Rebind the assignment to a different staff member, resetting the
    /// lifecycle to `Assigned`. The new staff member's capacity is checked;
    /// the (order, type) slot stays with this assignment.
    pub async fn reassign(
        &self,
        assignment_id: Uuid,
        new_staff: Uuid,
        reassigned_by: Uuid,
    ) -> Result<OrderAssignment> {
        self.check_capacity(new_staff).await?;
        let now = self.clock.now();
        self.mutate(assignment_id, "reassign", |a| {
            a.reassign(new_staff, reassigned_by, now)
        })
        .await
    }

    /// Direct priority override for manual emergency escalation.
    pub async fn set_priority(
        &self,
        assignment_id: Uuid,
        level: PriorityLevel,
    ) -> Result<OrderAssignment> {
        let loaded = self.store.load_assignment(assignment_id).await?;
        let expected_version = loaded.version;
        let old_priority = loaded.priority;
        if old_priority == level {
            return Ok(loaded);
        }

        let mut updated = loaded;
        updated.set_priority(level);
        let saved = self
            .store
            .save_assignment(updated, expected_version)
            .await?;

        self.events.publish(DomainEvent::PriorityChanged {
            assignment_id: saved.assignment_id,
            order_id: saved.order_id,
            old_priority,
            new_priority: saved.priority,
        });
        Ok(saved)
    }
}
