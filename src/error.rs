//! # Structured Error Handling
//!
//! Error taxonomy for the coordination core. Every expected business
//! condition is a typed variant carrying enough context (kind + affected id)
//! to be rendered by a caller without re-deriving it. The core returns these
//! errors; it never logs-and-swallows and never panics for business
//! conditions.

use uuid::Uuid;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Assignment,
    Timer,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Assignment => write!(f, "assignment"),
            Self::Timer => write!(f, "timer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinationError {
    /// Requested state change is not in the allowed transition table.
    #[error("invalid transition for {entity} {id}: {from} -> {to}")]
    InvalidTransition {
        entity: EntityKind,
        id: Uuid,
        from: String,
        to: String,
    },

    /// Staff member is already at their concurrent active-assignment limit.
    #[error("staff {staff_id} at capacity: {active} active of {limit} allowed")]
    CapacityExceeded {
        staff_id: Uuid,
        active: usize,
        limit: usize,
    },

    /// Optimistic version check failed; re-read and retry.
    #[error("concurrent modification of {entity} {id} (expected version {expected_version})")]
    ConcurrentModification {
        entity: EntityKind,
        id: Uuid,
        expected_version: i64,
    },

    /// Referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: Uuid },

    /// Malformed input, e.g. a non-positive duration.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoordinationError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether a caller can sensibly retry after re-reading current state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

pub type Result<T> = std::result::Result<T, CoordinationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rendering_carries_context() {
        let id = Uuid::new_v4();
        let err = CoordinationError::InvalidTransition {
            entity: EntityKind::Timer,
            id,
            from: "completed".to_string(),
            to: "running".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("completed -> running"));
        assert!(rendered.contains(&id.to_string()));
    }

    #[test]
    fn test_retryable_classification() {
        let id = Uuid::new_v4();
        assert!(CoordinationError::ConcurrentModification {
            entity: EntityKind::Assignment,
            id,
            expected_version: 3,
        }
        .is_retryable());
        assert!(!CoordinationError::not_found(EntityKind::Order, id).is_retryable());
    }
}
