use serde::{Deserialize, Serialize};
use std::fmt;

use super::transitions::MachineState;

/// Assignment status definitions for the staff-to-order binding lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Initial state when work is handed to a staff member
    Assigned,
    /// Staff member acknowledged the assignment
    Accepted,
    /// Work is actively being performed
    InProgress,
    /// Work temporarily suspended
    Paused,
    /// Work finished successfully
    Completed,
    /// Assignment was cancelled
    Cancelled,
    /// Staff member declined the assignment
    Rejected,
    /// Estimated completion passed while still active
    Overdue,
    /// A quality problem was flagged on the work
    QualityIssue,
}

impl AssignmentStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Rejected)
    }

    /// Check if this is an active state (assignment still counts toward
    /// staff workload and queue views)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Check if work may be started from this state
    pub fn can_be_started(&self) -> bool {
        matches!(self, Self::Assigned | Self::Accepted | Self::Paused)
    }
}

impl MachineState for AssignmentStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        use AssignmentStatus::*;
        match self {
            Assigned => &[Accepted, Rejected, Cancelled, InProgress],
            Accepted => &[InProgress, Cancelled, Rejected],
            InProgress => &[Completed, Paused, Cancelled, QualityIssue, Overdue],
            Paused => &[InProgress, Cancelled, Overdue],
            Overdue => &[InProgress, Completed, Cancelled],
            QualityIssue => &[InProgress, Cancelled],
            Completed | Cancelled | Rejected => &[],
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned => write!(f, "assigned"),
            Self::Accepted => write!(f, "accepted"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected"),
            Self::Overdue => write!(f, "overdue"),
            Self::QualityIssue => write!(f, "quality_issue"),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(Self::Assigned),
            "accepted" => Ok(Self::Accepted),
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            "overdue" => Ok(Self::Overdue),
            "quality_issue" => Ok(Self::QualityIssue),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        Self::Assigned
    }
}

/// Cooking timer status definitions for the per-dish cooking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// Created but not yet started
    Ready,
    /// Actively cooking
    Running,
    /// Cooking suspended; paused intervals do not count as elapsed time
    Paused,
    /// Dish finished
    Completed,
    /// Cooking abandoned
    Cancelled,
    /// Estimated completion passed while still active
    Overdue,
    /// Approaching estimated completion; warning sent
    Alert,
}

impl TimerStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Check if the timer's clock is running (elapsed time accumulating)
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::Alert | Self::Overdue)
    }

    /// Check if the timer still participates in alert/overdue scans
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl MachineState for TimerStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        use TimerStatus::*;
        match self {
            Ready => &[Running, Cancelled],
            Running => &[Paused, Completed, Cancelled, Overdue, Alert],
            Paused => &[Running, Completed, Cancelled, Overdue],
            Alert => &[Running, Paused, Completed, Cancelled, Overdue],
            Overdue => &[Running, Paused, Completed, Cancelled, Alert],
            Completed | Cancelled => &[],
        }
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Overdue => write!(f, "overdue"),
            Self::Alert => write!(f, "alert"),
        }
    }
}

impl std::str::FromStr for TimerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(Self::Ready),
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "overdue" => Ok(Self::Overdue),
            "alert" => Ok(Self::Alert),
            _ => Err(format!("Invalid timer status: {s}")),
        }
    }
}

impl Default for TimerStatus {
    fn default() -> Self {
        Self::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ASSIGNMENT: [AssignmentStatus; 9] = [
        AssignmentStatus::Assigned,
        AssignmentStatus::Accepted,
        AssignmentStatus::InProgress,
        AssignmentStatus::Paused,
        AssignmentStatus::Completed,
        AssignmentStatus::Cancelled,
        AssignmentStatus::Rejected,
        AssignmentStatus::Overdue,
        AssignmentStatus::QualityIssue,
    ];

    const ALL_TIMER: [TimerStatus; 7] = [
        TimerStatus::Ready,
        TimerStatus::Running,
        TimerStatus::Paused,
        TimerStatus::Completed,
        TimerStatus::Cancelled,
        TimerStatus::Overdue,
        TimerStatus::Alert,
    ];

    #[test]
    fn test_assignment_terminal_states_have_no_exits() {
        for status in ALL_ASSIGNMENT {
            assert_eq!(
                status.is_terminal(),
                status.allowed_transitions().is_empty(),
                "terminal flag and table disagree for {status}"
            );
        }
    }

    #[test]
    fn test_timer_terminal_states_have_no_exits() {
        for status in ALL_TIMER {
            assert_eq!(
                status.is_terminal(),
                status.allowed_transitions().is_empty(),
                "terminal flag and table disagree for {status}"
            );
        }
    }

    #[test]
    fn test_non_terminal_assignment_states_can_recover_to_in_progress() {
        // Every non-terminal state except Assigned/Accepted permits a path
        // back to InProgress.
        for status in [
            AssignmentStatus::Paused,
            AssignmentStatus::Overdue,
            AssignmentStatus::QualityIssue,
        ] {
            assert!(status
                .allowed_transitions()
                .contains(&AssignmentStatus::InProgress));
        }
    }

    #[test]
    fn test_timer_ready_cannot_complete() {
        assert!(!TimerStatus::Ready
            .allowed_transitions()
            .contains(&TimerStatus::Completed));
    }

    #[test]
    fn test_startable_assignment_states() {
        assert!(AssignmentStatus::Assigned.can_be_started());
        assert!(AssignmentStatus::Accepted.can_be_started());
        assert!(AssignmentStatus::Paused.can_be_started());
        assert!(!AssignmentStatus::Completed.can_be_started());
        assert!(!AssignmentStatus::Overdue.can_be_started());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(AssignmentStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            "quality_issue".parse::<AssignmentStatus>().unwrap(),
            AssignmentStatus::QualityIssue
        );

        assert_eq!(TimerStatus::Overdue.to_string(), "overdue");
        assert_eq!("alert".parse::<TimerStatus>().unwrap(), TimerStatus::Alert);
        assert!("simmering".parse::<TimerStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let status = TimerStatus::Running;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"running\"");

        let parsed: TimerStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }
}
