//! # Event System
//!
//! Typed domain events emitted by the coordination services, one per logical
//! transition. Transport fan-out, session bookkeeping, and delivery
//! fallbacks live entirely in the notification gateway behind the sink; the
//! core only writes.

pub mod publisher;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::priority::PriorityLevel;
use crate::state_machine::AssignmentStatus;

pub use publisher::{EventPublisher, PublishedEvent};

/// Dotted event names as seen by sink consumers.
pub mod names {
    pub const ASSIGNMENT_CREATED: &str = "assignment.created";
    pub const ASSIGNMENT_STATUS_CHANGED: &str = "assignment.status_changed";
    pub const TIMER_STARTED: &str = "timer.started";
    pub const TIMER_COMPLETED: &str = "timer.completed";
    pub const TIMER_WARNING: &str = "timer.warning";
    pub const ORDER_OVERDUE: &str = "order.overdue";
    pub const PRIORITY_CHANGED: &str = "priority.changed";
}

/// A domain transition that observers care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    AssignmentCreated {
        assignment_id: Uuid,
        order_id: Uuid,
        staff_id: Uuid,
    },
    AssignmentStatusChanged {
        assignment_id: Uuid,
        order_id: Uuid,
        old_status: AssignmentStatus,
        new_status: AssignmentStatus,
    },
    TimerStarted {
        timer_id: Uuid,
        order_id: Uuid,
        estimated_completion: DateTime<Utc>,
    },
    TimerCompleted {
        timer_id: Uuid,
        order_id: Uuid,
        actual_duration_minutes: Option<i64>,
    },
    TimerWarning {
        timer_id: Uuid,
        order_id: Uuid,
        estimated_completion: DateTime<Utc>,
    },
    OrderOverdue {
        order_id: Uuid,
        assignment_id: Option<Uuid>,
        timer_id: Option<Uuid>,
    },
    PriorityChanged {
        assignment_id: Uuid,
        order_id: Uuid,
        old_priority: PriorityLevel,
        new_priority: PriorityLevel,
    },
}

impl DomainEvent {
    /// Dotted event name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssignmentCreated { .. } => names::ASSIGNMENT_CREATED,
            Self::AssignmentStatusChanged { .. } => names::ASSIGNMENT_STATUS_CHANGED,
            Self::TimerStarted { .. } => names::TIMER_STARTED,
            Self::TimerCompleted { .. } => names::TIMER_COMPLETED,
            Self::TimerWarning { .. } => names::TIMER_WARNING,
            Self::OrderOverdue { .. } => names::ORDER_OVERDUE,
            Self::PriorityChanged { .. } => names::PRIORITY_CHANGED,
        }
    }

    /// Convenience constructor for status-change events.
    pub fn status_changed(
        assignment_id: Uuid,
        order_id: Uuid,
        old_status: AssignmentStatus,
        new_status: AssignmentStatus,
    ) -> Self {
        Self::AssignmentStatusChanged {
            assignment_id,
            order_id,
            old_status,
            new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = DomainEvent::OrderOverdue {
            order_id: Uuid::new_v4(),
            assignment_id: None,
            timer_id: Some(Uuid::new_v4()),
        };
        assert_eq!(event.name(), "order.overdue");
    }

    #[test]
    fn test_event_serde_tags_variant() {
        let event = DomainEvent::AssignmentCreated {
            assignment_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "assignment_created");
    }
}
