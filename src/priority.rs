//! # Priority Engine
//!
//! Pure derivation of an order's urgency from its age and attributes. The
//! level is recomputed on every queue read instead of escalated by a
//! background job, so the staleness window equals the read interval. The
//! computed level is cached on the assignment only for sort stability
//! between reads; it is never ground truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal urgency levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    Normal,
    High,
    Urgent,
    Emergency,
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
            Self::Emergency => write!(f, "emergency"),
        }
    }
}

impl std::str::FromStr for PriorityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            "emergency" => Ok(Self::Emergency),
            _ => Err(format!("Invalid priority level: {s}")),
        }
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        Self::Normal
    }
}

/// Age thresholds, in minutes, at which an order escalates.
const EMERGENCY_AGE_MINUTES: i64 = 45;
const URGENT_AGE_MINUTES: i64 = 30;
const HIGH_AGE_MINUTES: i64 = 20;
const NORMAL_AGE_MINUTES: i64 = 10;

/// Item count above which an order is at least High regardless of age.
const HIGH_ITEM_COUNT: usize = 5;

/// Instruction token that forces at least Urgent.
const URGENT_TOKEN: &str = "urgent";

/// Derive the priority level for an order.
///
/// `ordered_at` unknown means the age cannot be computed and the order gets
/// `Normal`. Otherwise thresholds are checked highest first; special
/// instructions containing "urgent" (case-insensitive) force at least
/// `Urgent`, and more than five items force at least `High`.
pub fn evaluate(
    now: DateTime<Utc>,
    ordered_at: Option<DateTime<Utc>>,
    special_instructions: Option<&str>,
    item_count: usize,
) -> PriorityLevel {
    let Some(ordered_at) = ordered_at else {
        return PriorityLevel::Normal;
    };

    let age_minutes = (now - ordered_at).num_minutes();
    let wants_urgent = special_instructions
        .map(|s| s.to_lowercase().contains(URGENT_TOKEN))
        .unwrap_or(false);

    if age_minutes > EMERGENCY_AGE_MINUTES {
        PriorityLevel::Emergency
    } else if age_minutes > URGENT_AGE_MINUTES || wants_urgent {
        PriorityLevel::Urgent
    } else if age_minutes > HIGH_AGE_MINUTES || item_count > HIGH_ITEM_COUNT {
        PriorityLevel::High
    } else if age_minutes > NORMAL_AGE_MINUTES {
        PriorityLevel::Normal
    } else {
        PriorityLevel::Low
    }
}
