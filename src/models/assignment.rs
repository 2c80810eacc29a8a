//! # Order Assignment Model
//!
//! The binding of a staff member to one unit of work for one order. At most
//! one non-terminal assignment may exist per (order, assignment type) pair;
//! the persistence port enforces that atomically. Every transition method
//! here validates against the centralized table and leaves the record
//! untouched on rejection. The `version` counter is bumped by the store on
//! successful conditional save, never by these methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{EntityKind, Result};
use crate::priority::PriorityLevel;
use crate::state_machine::{ensure_transition, AssignmentStatus};

/// Work function a staff member can be assigned for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    Cooking,
    Preparation,
    Serving,
    Cashier,
    Packaging,
    QualityCheck,
    Cleanup,
}

impl AssignmentType {
    /// Typical duration for this work function, in minutes. Used to seed the
    /// assignment's estimated completion.
    pub fn typical_duration_minutes(&self) -> i64 {
        match self {
            Self::Cooking => 20,
            Self::Preparation => 10,
            Self::Serving => 5,
            Self::Cashier => 3,
            Self::Packaging => 5,
            Self::QualityCheck => 3,
            Self::Cleanup => 10,
        }
    }

    /// Whether this work function requires physical kitchen access.
    pub fn requires_kitchen_access(&self) -> bool {
        matches!(self, Self::Cooking | Self::Preparation | Self::QualityCheck)
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooking => write!(f, "cooking"),
            Self::Preparation => write!(f, "preparation"),
            Self::Serving => write!(f, "serving"),
            Self::Cashier => write!(f, "cashier"),
            Self::Packaging => write!(f, "packaging"),
            Self::QualityCheck => write!(f, "quality_check"),
            Self::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Staff-to-order work binding with lifecycle and audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub assignment_id: Uuid,
    pub order_id: Uuid,
    pub staff_id: Uuid,
    pub assignment_type: AssignmentType,
    pub status: AssignmentStatus,
    /// Cached priority for sort stability between queue reads; recomputed
    /// from the order on every read, refreshed here by the scan pass.
    pub priority: PriorityLevel,
    pub assigned_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub actual_duration_minutes: Option<i64>,
    pub assigned_by: Uuid,
    pub notes: Vec<String>,
    pub quality_score: Option<u8>,
    /// Optimistic lock counter, incremented by the store on each save.
    pub version: i64,
}

impl OrderAssignment {
    pub fn new(
        order_id: Uuid,
        staff_id: Uuid,
        assignment_type: AssignmentType,
        assigned_by: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            assignment_id: Uuid::new_v4(),
            order_id,
            staff_id,
            assignment_type,
            status: AssignmentStatus::Assigned,
            priority: PriorityLevel::default(),
            assigned_at: now,
            started_at: None,
            completed_at: None,
            estimated_completion: Some(
                now + chrono::Duration::minutes(assignment_type.typical_duration_minutes()),
            ),
            actual_duration_minutes: None,
            assigned_by,
            notes: Vec::new(),
            quality_score: None,
            version: 0,
        }
    }

    fn transition_to(&mut self, to: AssignmentStatus) -> Result<()> {
        ensure_transition(EntityKind::Assignment, self.assignment_id, self.status, to)?;
        self.status = to;
        Ok(())
    }

    /// Staff member acknowledges the assignment without starting work.
    pub fn accept(&mut self) -> Result<()> {
        self.transition_to(AssignmentStatus::Accepted)
    }

    /// Begin (or resume) working. First start stamps `started_at`.
    pub fn start_work(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(AssignmentStatus::InProgress)?;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.transition_to(AssignmentStatus::Paused)
    }

    /// Finish the work, recording completion time and actual duration.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(AssignmentStatus::Completed)?;
        self.completed_at = Some(now);
        if let Some(started) = self.started_at {
            self.actual_duration_minutes = Some((now - started).num_minutes());
        }
        Ok(())
    }

    pub fn cancel(&mut self, reason: &str) -> Result<()> {
        self.transition_to(AssignmentStatus::Cancelled)?;
        self.notes.push(format!("cancelled: {reason}"));
        Ok(())
    }

    pub fn reject(&mut self, reason: &str) -> Result<()> {
        self.transition_to(AssignmentStatus::Rejected)?;
        self.notes.push(format!("rejected: {reason}"));
        Ok(())
    }

    pub fn flag_quality_issue(&mut self, description: &str) -> Result<()> {
        self.transition_to(AssignmentStatus::QualityIssue)?;
        self.notes.push(format!("quality issue: {description}"));
        Ok(())
    }

    pub fn mark_overdue(&mut self) -> Result<()> {
        self.transition_to(AssignmentStatus::Overdue)
    }

    /// Rebind to a different staff member. This resets the lifecycle to
    /// `Assigned` without going through `cancel`: a reassignment is not a
    /// failure of the order, only of the staff binding. Terminal assignments
    /// stay terminal.
    pub fn reassign(
        &mut self,
        new_staff: Uuid,
        reassigned_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Err(crate::error::CoordinationError::InvalidTransition {
                entity: EntityKind::Assignment,
                id: self.assignment_id,
                from: self.status.to_string(),
                to: AssignmentStatus::Assigned.to_string(),
            });
        }
        self.notes.push(format!(
            "reassigned from staff {} to {} by {}",
            self.staff_id, new_staff, reassigned_by
        ));
        self.staff_id = new_staff;
        self.status = AssignmentStatus::Assigned;
        self.started_at = None;
        self.assigned_at = now;
        self.estimated_completion = Some(
            now + chrono::Duration::minutes(self.assignment_type.typical_duration_minutes()),
        );
        Ok(())
    }

    /// Direct priority override, used for manual emergency escalation and by
    /// the scan pass when the derived level changes.
    pub fn set_priority(&mut self, level: PriorityLevel) {
        self.priority = level;
    }

    pub fn record_quality_score(&mut self, score: u8) {
        self.quality_score = Some(score);
    }

    /// Whether estimated completion has passed while the work is still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.estimated_completion {
            Some(estimated) => !self.status.is_terminal() && now > estimated,
            None => false,
        }
    }
}
