//! # Persistence Port
//!
//! Narrow storage interface the core depends on. Durable storage mechanics
//! (SQL dialect, pooling) live outside; the core only needs snapshot loads,
//! version-conditional saves, and the atomic active-uniqueness insert. The
//! in-memory implementation in [`memory`] is the reference for the port's
//! atomicity contract and backs the test suite.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AssignmentType, CookingTimer, Order, OrderAssignment};

pub use memory::InMemoryStore;

/// Store-level filter over active (non-terminal) assignments. Anything
/// needing order data or a clock (table, overdue) is the queue
/// coordinator's job.
#[derive(Debug, Clone, Default)]
pub struct ActiveFilter {
    pub order_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub assignment_type: Option<AssignmentType>,
}

impl ActiveFilter {
    pub fn for_staff(staff_id: Uuid) -> Self {
        Self {
            staff_id: Some(staff_id),
            ..Self::default()
        }
    }

    pub fn for_order(order_id: Uuid) -> Self {
        Self {
            order_id: Some(order_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, assignment: &OrderAssignment) -> bool {
        self.order_id.map_or(true, |id| assignment.order_id == id)
            && self.staff_id.map_or(true, |id| assignment.staff_id == id)
            && self
                .assignment_type
                .map_or(true, |ty| assignment.assignment_type == ty)
    }
}

/// Storage operations the coordination core requires.
///
/// `save_*` take the version the caller read and fail with
/// `ConcurrentModification` when the stored version differs;
/// `insert_assignment` rejects a second active assignment for the same
/// (order, assignment type) pair atomically, not read-then-write.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    async fn load_order(&self, order_id: Uuid) -> Result<Order>;

    async fn load_assignment(&self, assignment_id: Uuid) -> Result<OrderAssignment>;

    async fn load_timer(&self, timer_id: Uuid) -> Result<CookingTimer>;

    /// Insert a new assignment, enforcing active (order, type) uniqueness.
    /// Returns the stored record with its initial version.
    async fn insert_assignment(&self, assignment: OrderAssignment) -> Result<OrderAssignment>;

    /// Insert a new timer. Returns the stored record with its initial version.
    async fn insert_timer(&self, timer: CookingTimer) -> Result<CookingTimer>;

    /// Conditionally save, succeeding only if the stored version still
    /// equals `expected_version`. Returns the record with its new version.
    async fn save_assignment(
        &self,
        assignment: OrderAssignment,
        expected_version: i64,
    ) -> Result<OrderAssignment>;

    /// Conditionally save, succeeding only if the stored version still
    /// equals `expected_version`. Returns the record with its new version.
    async fn save_timer(&self, timer: CookingTimer, expected_version: i64) -> Result<CookingTimer>;

    /// Snapshot of all active (non-terminal) assignments matching `filter`.
    async fn active_assignments(&self, filter: &ActiveFilter) -> Result<Vec<OrderAssignment>>;

    /// Snapshot of all active (non-terminal) timers.
    async fn active_timers(&self) -> Result<Vec<CookingTimer>>;

    /// Current concurrent active-assignment count for a staff member.
    async fn active_count_for_staff(&self, staff_id: Uuid) -> Result<usize>;
}
