//! # Cooking Timer Service
//!
//! Drives the per-dish cooking lifecycle through the store and the event
//! sink. Timer math lives on the record; this service owns persistence
//! ordering and event emission. `TimerStarted` fires only on the first
//! start, `TimerCompleted` on completion, and both only after the
//! conditional save succeeds.

use std::sync::Arc;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::CoordinationConfig;
use crate::error::Result;
use crate::events::{DomainEvent, EventPublisher};
use crate::logging::log_timer_operation;
use crate::models::{CookingStage, CookingTimer};
use crate::persistence::CoordinationStore;
use crate::state_machine::TimerStatus;

use super::estimator::EstimateCookingTime;

pub struct CookingTimerService {
    store: Arc<dyn CoordinationStore>,
    events: EventPublisher,
    clock: SharedClock,
    estimator: Arc<dyn EstimateCookingTime>,
    alert_margin_minutes: i64,
}

impl CookingTimerService {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        events: EventPublisher,
        clock: SharedClock,
        estimator: Arc<dyn EstimateCookingTime>,
        config: &CoordinationConfig,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            estimator,
            alert_margin_minutes: config.alert_margin_minutes,
        }
    }

    /// Create a timer for one dish (or quantity group) of an order. When no
    /// explicit estimate is given, the configured estimator derives one from
    /// the order.
    pub async fn create_timer(
        &self,
        order_id: Uuid,
        menu_item_id: Uuid,
        dish_name: &str,
        staff_id: Uuid,
        quantity: u32,
        estimated_duration_minutes: Option<i64>,
    ) -> Result<CookingTimer> {
        let order = self.store.load_order(order_id).await?;
        let estimate = estimated_duration_minutes
            .unwrap_or_else(|| self.estimator.estimate_minutes(&order));

        let mut timer = CookingTimer::new(
            order_id,
            menu_item_id,
            dish_name,
            staff_id,
            quantity,
            estimate,
        )?;
        timer.set_alert_margin(self.alert_margin_minutes);
        let stored = self.store.insert_timer(timer).await?;
        log_timer_operation(
            "create",
            stored.timer_id,
            stored.order_id,
            &stored.status.to_string(),
            &stored.stage.to_string(),
        );
        Ok(stored)
    }

    /// Load, apply, conditionally save. Events are the caller's business
    /// because which event (if any) fires depends on the operation.
    async fn mutate<F>(&self, timer_id: Uuid, operation: &str, apply: F) -> Result<CookingTimer>
    where
        F: FnOnce(&mut CookingTimer) -> Result<()>,
    {
        let loaded = self.store.load_timer(timer_id).await?;
        let expected_version = loaded.version;

        let mut updated = loaded;
        apply(&mut updated)?;

        let saved = self.store.save_timer(updated, expected_version).await?;
        log_timer_operation(
            operation,
            saved.timer_id,
            saved.order_id,
            &saved.status.to_string(),
            &saved.stage.to_string(),
        );
        Ok(saved)
    }

    /// Start (or resume) cooking. The first start fixes the estimated
    /// completion and emits `TimerStarted`.
    pub async fn start_timer(&self, timer_id: Uuid) -> Result<CookingTimer> {
        let now = self.clock.now();
        let loaded = self.store.load_timer(timer_id).await?;
        let first_start = loaded.status == TimerStatus::Ready;

        let saved = self.mutate(timer_id, "start", |t| t.start(now)).await?;

        if first_start {
            if let Some(estimated_completion) = saved.estimated_completion {
                self.events.publish(DomainEvent::TimerStarted {
                    timer_id: saved.timer_id,
                    order_id: saved.order_id,
                    estimated_completion,
                });
            }
        }
        Ok(saved)
    }

    pub async fn pause_timer(&self, timer_id: Uuid) -> Result<CookingTimer> {
        let now = self.clock.now();
        self.mutate(timer_id, "pause", |t| t.pause(now)).await
    }

    pub async fn resume_timer(&self, timer_id: Uuid) -> Result<CookingTimer> {
        let now = self.clock.now();
        self.mutate(timer_id, "resume", |t| t.resume(now)).await
    }

    /// Finish the dish and emit `TimerCompleted` with the actual duration
    /// net of pauses.
    pub async fn complete_timer(&self, timer_id: Uuid) -> Result<CookingTimer> {
        let now = self.clock.now();
        let saved = self.mutate(timer_id, "complete", |t| t.complete(now)).await?;

        self.events.publish(DomainEvent::TimerCompleted {
            timer_id: saved.timer_id,
            order_id: saved.order_id,
            actual_duration_minutes: saved.actual_duration_minutes,
        });
        Ok(saved)
    }

    pub async fn cancel_timer(&self, timer_id: Uuid, reason: &str) -> Result<CookingTimer> {
        self.mutate(timer_id, "cancel", |t| t.cancel(reason)).await
    }

    /// Report forward stage progress. Out-of-order reports are ignored and
    /// produce no write or event; the kitchen's stage reporting may race.
    pub async fn advance_stage(
        &self,
        timer_id: Uuid,
        new_stage: CookingStage,
    ) -> Result<CookingTimer> {
        let loaded = self.store.load_timer(timer_id).await?;
        if new_stage.sequence() <= loaded.stage.sequence() {
            return Ok(loaded);
        }
        self.mutate(timer_id, "advance_stage", |t| {
            t.advance_stage(new_stage);
            Ok(())
        })
        .await
    }

    /// Record the quality-check outcome on a dish.
    pub async fn record_quality_check(
        &self,
        timer_id: Uuid,
        passed: bool,
    ) -> Result<CookingTimer> {
        self.mutate(timer_id, "quality_check", |t| {
            t.record_quality_check(passed);
            Ok(())
        })
        .await
    }
}
