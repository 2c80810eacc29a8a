//! Generic transition validation.
//!
//! Each status enum carries its full allowed-transition table; this module
//! is the single place that checks a requested edge against the table. A
//! rejected edge returns [`CoordinationError::InvalidTransition`] and the
//! caller must leave the record untouched.

use std::fmt;
use uuid::Uuid;

use crate::error::{CoordinationError, EntityKind, Result};

/// A status enum governed by a centralized transition table.
pub trait MachineState: Copy + Eq + fmt::Display + fmt::Debug + 'static {
    /// States reachable from this one. Empty for terminal states.
    fn allowed_transitions(self) -> &'static [Self];

    fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

/// Validate a requested edge, producing the structured error on rejection.
pub fn ensure_transition<S: MachineState>(
    entity: EntityKind,
    id: Uuid,
    from: S,
    to: S,
) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoordinationError::InvalidTransition {
            entity,
            id,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::{AssignmentStatus, TimerStatus};

    #[test]
    fn test_allowed_edge_passes() {
        let id = Uuid::new_v4();
        assert!(ensure_transition(
            EntityKind::Timer,
            id,
            TimerStatus::Ready,
            TimerStatus::Running
        )
        .is_ok());
    }

    #[test]
    fn test_rejected_edge_reports_both_states() {
        let id = Uuid::new_v4();
        let err = ensure_transition(
            EntityKind::Assignment,
            id,
            AssignmentStatus::Completed,
            AssignmentStatus::InProgress,
        )
        .unwrap_err();

        match err {
            CoordinationError::InvalidTransition {
                entity, from, to, ..
            } => {
                assert_eq!(entity, EntityKind::Assignment);
                assert_eq!(from, "completed");
                assert_eq!(to, "in_progress");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_exhaustive_timer_table_conformance() {
        // Every (from, to) pair either appears in the table and validates,
        // or is rejected with InvalidTransition.
        let all = [
            TimerStatus::Ready,
            TimerStatus::Running,
            TimerStatus::Paused,
            TimerStatus::Completed,
            TimerStatus::Cancelled,
            TimerStatus::Overdue,
            TimerStatus::Alert,
        ];
        let id = Uuid::new_v4();
        for from in all {
            for to in all {
                let result = ensure_transition(EntityKind::Timer, id, from, to);
                assert_eq!(
                    result.is_ok(),
                    from.allowed_transitions().contains(&to),
                    "mismatch for {from} -> {to}"
                );
            }
        }
    }
}
