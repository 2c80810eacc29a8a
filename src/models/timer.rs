//! # Cooking Timer Model
//!
//! Per-dish timer with stage tracking and pause-aware time math. Two
//! invariants anchor everything here: elapsed time excludes paused
//! intervals, and estimated completion shifts forward by exactly the paused
//! duration on resume. Minute counters round toward zero; the completion
//! shift uses the exact duration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{CoordinationError, EntityKind, Result};
use crate::state_machine::{ensure_transition, TimerStatus};

/// Ordered phase within the act of cooking one dish. Stage reporting from
/// the kitchen may race, so stage changes are monotonic and best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingStage {
    Prep,
    Cooking,
    Resting,
    Finishing,
    Plating,
    QualityCheck,
    Ready,
}

impl CookingStage {
    /// Position in the strict stage ordering.
    pub fn sequence(&self) -> u8 {
        match self {
            Self::Prep => 0,
            Self::Cooking => 1,
            Self::Resting => 2,
            Self::Finishing => 3,
            Self::Plating => 4,
            Self::QualityCheck => 5,
            Self::Ready => 6,
        }
    }
}

impl fmt::Display for CookingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prep => write!(f, "prep"),
            Self::Cooking => write!(f, "cooking"),
            Self::Resting => write!(f, "resting"),
            Self::Finishing => write!(f, "finishing"),
            Self::Plating => write!(f, "plating"),
            Self::QualityCheck => write!(f, "quality_check"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Per-dish cooking timer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingTimer {
    pub timer_id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub dish_name: String,
    pub staff_id: Uuid,
    pub quantity: u32,
    pub stage: CookingStage,
    pub status: TimerStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_duration_minutes: i64,
    pub estimated_completion: Option<DateTime<Utc>>,
    /// Accumulated whole minutes spent paused across all pause/resume cycles.
    pub paused_minutes: i64,
    pub alert_sent_at: Option<DateTime<Utc>>,
    /// Minutes before estimated completion at which a warning fires.
    pub alert_threshold_minutes: i64,
    pub actual_duration_minutes: Option<i64>,
    pub quality_check_passed: Option<bool>,
    pub notes: Vec<String>,
    /// Optimistic lock counter, incremented by the store on each save.
    pub version: i64,
}

impl CookingTimer {
    pub fn new(
        order_id: Uuid,
        menu_item_id: Uuid,
        dish_name: impl Into<String>,
        staff_id: Uuid,
        quantity: u32,
        estimated_duration_minutes: i64,
    ) -> Result<Self> {
        if estimated_duration_minutes <= 0 {
            return Err(CoordinationError::validation(format!(
                "estimated duration must be positive, got {estimated_duration_minutes}"
            )));
        }
        if quantity == 0 {
            return Err(CoordinationError::validation("quantity must be positive"));
        }
        Ok(Self {
            timer_id: Uuid::new_v4(),
            order_id,
            menu_item_id,
            dish_name: dish_name.into(),
            staff_id,
            quantity,
            stage: CookingStage::Prep,
            status: TimerStatus::Ready,
            started_at: None,
            paused_at: None,
            completed_at: None,
            estimated_duration_minutes,
            estimated_completion: None,
            paused_minutes: 0,
            alert_sent_at: None,
            alert_threshold_minutes: (estimated_duration_minutes - 2).max(1),
            actual_duration_minutes: None,
            quality_check_passed: None,
            notes: Vec::new(),
            version: 0,
        })
    }

    fn transition_to(&mut self, to: TimerStatus) -> Result<()> {
        ensure_transition(EntityKind::Timer, self.timer_id, self.status, to)?;
        self.status = to;
        Ok(())
    }

    /// Begin cooking, or resume if paused. First start stamps the start
    /// time, moves the stage to `Cooking`, and fixes the estimated
    /// completion at `now + estimated_duration`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.status {
            TimerStatus::Paused => self.resume(now),
            _ => {
                self.transition_to(TimerStatus::Running)?;
                // A pause interval can still be open when restarting out of
                // Overdue (the scan may flip a paused timer); fold it so the
                // elapsed math stays pause-exclusive.
                if let Some(paused_at) = self.paused_at.take() {
                    let paused_for = now - paused_at;
                    self.paused_minutes += paused_for.num_minutes();
                    if let Some(estimated) = self.estimated_completion {
                        self.estimated_completion = Some(estimated + paused_for);
                    }
                }
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                    self.advance_stage(CookingStage::Cooking);
                    self.estimated_completion =
                        Some(now + Duration::minutes(self.estimated_duration_minutes));
                }
                Ok(())
            }
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(TimerStatus::Paused)?;
        self.paused_at = Some(now);
        Ok(())
    }

    /// Resume a paused timer, shifting estimated completion forward by
    /// exactly the paused duration.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != TimerStatus::Paused {
            return Err(CoordinationError::InvalidTransition {
                entity: EntityKind::Timer,
                id: self.timer_id,
                from: self.status.to_string(),
                to: TimerStatus::Running.to_string(),
            });
        }
        self.transition_to(TimerStatus::Running)?;
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = now - paused_at;
            self.paused_minutes += paused_for.num_minutes();
            if let Some(estimated) = self.estimated_completion {
                self.estimated_completion = Some(estimated + paused_for);
            }
        }
        Ok(())
    }

    /// Finish the dish. An open pause interval is folded into the paused
    /// accumulator so the actual duration still excludes paused time.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(TimerStatus::Completed)?;
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_minutes += (now - paused_at).num_minutes();
        }
        self.completed_at = Some(now);
        if let Some(started) = self.started_at {
            self.actual_duration_minutes = Some((now - started).num_minutes() - self.paused_minutes);
        }
        self.stage = CookingStage::Ready;
        Ok(())
    }

    pub fn cancel(&mut self, reason: &str) -> Result<()> {
        self.transition_to(TimerStatus::Cancelled)?;
        self.notes.push(format!("cancelled: {reason}"));
        Ok(())
    }

    /// Monotonic forward stage movement. Out-of-order reports are ignored,
    /// not rejected; stage reporting from the kitchen may race.
    pub fn advance_stage(&mut self, new_stage: CookingStage) {
        if new_stage.sequence() > self.stage.sequence() {
            self.stage = new_stage;
        }
    }

    /// Flip to `Overdue`; used by the scan pass.
    pub fn mark_overdue(&mut self) -> Result<()> {
        self.transition_to(TimerStatus::Overdue)
    }

    /// Flip to `Alert` and stamp the warning time; used by the scan pass.
    /// The stamp is what makes the scan idempotent.
    pub fn mark_alerted(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(TimerStatus::Alert)?;
        self.alert_sent_at = Some(now);
        Ok(())
    }

    /// Recompute the warning threshold for a non-default alert margin. The
    /// floor of one minute still applies.
    pub fn set_alert_margin(&mut self, margin_minutes: i64) {
        self.alert_threshold_minutes = (self.estimated_duration_minutes - margin_minutes).max(1);
    }

    pub fn record_quality_check(&mut self, passed: bool) {
        self.quality_check_passed = Some(passed);
        self.advance_stage(CookingStage::QualityCheck);
    }

    /// Whole minutes of cooking so far, excluding paused intervals. Frozen
    /// while paused and after completion.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        let Some(started) = self.started_at else {
            return 0;
        };
        let end = self
            .paused_at
            .or(self.completed_at)
            .unwrap_or(now);
        ((end - started).num_minutes() - self.paused_minutes).max(0)
    }

    /// Whether estimated completion has passed while the timer is still active.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.estimated_completion {
            Some(estimated) => !self.status.is_terminal() && now > estimated,
            None => false,
        }
    }

    /// Whether a warning should fire: running, no warning sent yet, and
    /// inside the alert window before estimated completion.
    pub fn needs_alert(&self, now: DateTime<Utc>) -> bool {
        if self.alert_sent_at.is_some() || self.status != TimerStatus::Running {
            return false;
        }
        match self.estimated_completion {
            Some(estimated) => {
                now >= estimated - Duration::minutes(self.alert_threshold_minutes)
            }
            None => false,
        }
    }

    /// Progress through the estimate as a percentage, clamped to [0, 100].
    pub fn progress_percentage(&self, now: DateTime<Utc>) -> f64 {
        if self.started_at.is_none() {
            return 0.0;
        }
        let elapsed = self.elapsed_minutes(now) as f64;
        let estimated = self.estimated_duration_minutes as f64;
        (elapsed / estimated * 100.0).clamp(0.0, 100.0)
    }
}
