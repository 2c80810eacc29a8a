//! # Queue Coordinator
//!
//! Produces the sorted, filterable view of all in-flight work and runs the
//! alert/overdue scan. The queue build is read-only: priority is recomputed
//! per entry for sorting but nothing is written. The scan is the component
//! that persists flags (alert stamp, overdue status, refreshed cached
//! priority), which is what makes re-running it before the next real
//! transition a no-op.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::error::{CoordinationError, EntityKind, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::logging::log_scan_outcome;
use crate::models::{AssignmentType, CookingTimer, Order, OrderAssignment};
use crate::persistence::{ActiveFilter, CoordinationStore};
use crate::priority::{self, PriorityLevel};
use crate::state_machine::{AssignmentStatus, MachineState};

use super::assignment_tracker::AssignmentTracker;

/// View-level filter over the queue.
#[derive(Debug, Clone, Default)]
pub struct QueueFilter {
    pub status: Option<AssignmentStatus>,
    pub staff_id: Option<Uuid>,
    pub assignment_type: Option<AssignmentType>,
    pub table_number: Option<u32>,
    pub overdue_only: bool,
}

/// 1-based pagination request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 25,
        }
    }
}

/// One row of the queue: an assignment joined with its order and any timers
/// cooking for that order, with freshly derived priority.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub assignment: OrderAssignment,
    pub order: Order,
    pub timers: Vec<CookingTimer>,
    pub priority: PriorityLevel,
    pub overdue: bool,
}

#[derive(Debug, Clone)]
pub struct QueuePage {
    pub entries: Vec<QueueEntry>,
    pub page: usize,
    pub per_page: usize,
    pub total_entries: usize,
}

impl QueuePage {
    pub fn total_pages(&self) -> usize {
        self.total_entries.div_ceil(self.per_page.max(1))
    }
}

/// Per-record failure collected by the scan without aborting it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFault {
    pub entity: EntityKind,
    pub id: Uuid,
    pub error: CoordinationError,
}

/// Outcome of one alert/overdue scan pass.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub timer_warnings: usize,
    pub overdue_marked: usize,
    pub priority_changes: usize,
    pub faults: Vec<ScanFault>,
}

/// Per-item outcomes of a batch assignment.
#[derive(Debug)]
pub struct BatchAssignReport {
    pub outcomes: Vec<(Uuid, Result<OrderAssignment>)>,
}

impl BatchAssignReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct QueueCoordinator {
    store: Arc<dyn CoordinationStore>,
    events: EventPublisher,
    clock: SharedClock,
    tracker: Arc<AssignmentTracker>,
}

impl QueueCoordinator {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        events: EventPublisher,
        clock: SharedClock,
        tracker: Arc<AssignmentTracker>,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            tracker,
        }
    }

    /// Build the sorted, filtered, paginated queue view. Read-only: priority
    /// is derived per entry for this view, never written back here.
    pub async fn build_queue(&self, filter: &QueueFilter, page: PageRequest) -> Result<QueuePage> {
        let now = self.clock.now();

        let store_filter = ActiveFilter {
            staff_id: filter.staff_id,
            assignment_type: filter.assignment_type,
            ..ActiveFilter::default()
        };
        let assignments = self.store.active_assignments(&store_filter).await?;

        let mut timers_by_order: HashMap<Uuid, Vec<CookingTimer>> = HashMap::new();
        for timer in self.store.active_timers().await? {
            timers_by_order.entry(timer.order_id).or_default().push(timer);
        }

        let mut entries = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let order = match self.store.load_order(assignment.order_id).await {
                Ok(order) => order,
                Err(CoordinationError::NotFound { .. }) => {
                    // Dangling order reference; leave the row out of the view
                    // rather than failing the whole read.
                    tracing::warn!(
                        assignment_id = %assignment.assignment_id,
                        order_id = %assignment.order_id,
                        "queue entry skipped: order not found"
                    );
                    continue;
                }
                Err(other) => return Err(other),
            };

            let timers = timers_by_order
                .get(&assignment.order_id)
                .cloned()
                .unwrap_or_default();
            let derived = priority::evaluate(
                now,
                Some(order.ordered_at),
                order.special_instructions.as_deref(),
                order.item_count(),
            );
            let overdue = assignment.is_overdue(now) || timers.iter().any(|t| t.is_overdue(now));

            if let Some(status) = filter.status {
                if assignment.status != status {
                    continue;
                }
            }
            if let Some(table) = filter.table_number {
                if order.table_number != table {
                    continue;
                }
            }
            if filter.overdue_only && !overdue {
                continue;
            }

            entries.push(QueueEntry {
                assignment,
                order,
                timers,
                priority: derived,
                overdue,
            });
        }

        entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.order.ordered_at.cmp(&b.order.ordered_at))
        });

        let total_entries = entries.len();
        let page_index = page.page.max(1) - 1;
        let start = page_index.saturating_mul(page.per_page);
        let entries = entries
            .into_iter()
            .skip(start)
            .take(page.per_page)
            .collect();

        Ok(QueuePage {
            entries,
            page: page.page.max(1),
            per_page: page.per_page,
            total_entries,
        })
    }

    /// One pass over active timers and assignments: send due warnings, mark
    /// newly overdue work, refresh cached priorities. Each positive result
    /// flips a persisted flag before its event is published, so re-running
    /// the scan before the next real transition emits nothing. Per-record
    /// failures are collected and the scan continues.
    pub async fn scan_for_alerts_and_overdue(&self) -> Result<ScanReport> {
        let now = self.clock.now();
        let mut report = ScanReport::default();

        // Overdue is checked before the warning: a timer that blew past its
        // estimate between scans with no alert sent goes straight to
        // Overdue, not through a late warning.
        for timer in self.store.active_timers().await? {
            if timer.is_overdue(now)
                && timer
                    .status
                    .can_transition_to(crate::state_machine::TimerStatus::Overdue)
            {
                let mut updated = timer.clone();
                let expected_version = updated.version;
                match updated.mark_overdue() {
                    Ok(()) => match self.store.save_timer(updated, expected_version).await {
                        Ok(saved) => {
                            self.events.publish(DomainEvent::OrderOverdue {
                                order_id: saved.order_id,
                                assignment_id: None,
                                timer_id: Some(saved.timer_id),
                            });
                            report.overdue_marked += 1;
                        }
                        Err(error) => report.faults.push(ScanFault {
                            entity: EntityKind::Timer,
                            id: timer.timer_id,
                            error,
                        }),
                    },
                    Err(error) => report.faults.push(ScanFault {
                        entity: EntityKind::Timer,
                        id: timer.timer_id,
                        error,
                    }),
                }
            } else if timer.needs_alert(now) {
                let mut updated = timer.clone();
                let expected_version = updated.version;
                match updated.mark_alerted(now) {
                    Ok(()) => match self.store.save_timer(updated, expected_version).await {
                        Ok(saved) => {
                            if let Some(estimated_completion) = saved.estimated_completion {
                                self.events.publish(DomainEvent::TimerWarning {
                                    timer_id: saved.timer_id,
                                    order_id: saved.order_id,
                                    estimated_completion,
                                });
                            }
                            report.timer_warnings += 1;
                        }
                        Err(error) => report.faults.push(ScanFault {
                            entity: EntityKind::Timer,
                            id: timer.timer_id,
                            error,
                        }),
                    },
                    Err(error) => report.faults.push(ScanFault {
                        entity: EntityKind::Timer,
                        id: timer.timer_id,
                        error,
                    }),
                }
            }
        }

        for assignment in self.store.active_assignments(&ActiveFilter::default()).await? {
            let order = match self.store.load_order(assignment.order_id).await {
                Ok(order) => order,
                Err(error) => {
                    report.faults.push(ScanFault {
                        entity: EntityKind::Order,
                        id: assignment.order_id,
                        error,
                    });
                    continue;
                }
            };

            let derived = priority::evaluate(
                now,
                Some(order.ordered_at),
                order.special_instructions.as_deref(),
                order.item_count(),
            );

            let should_mark_overdue = assignment.is_overdue(now)
                && assignment.status != AssignmentStatus::Overdue
                && assignment.status.can_transition_to(AssignmentStatus::Overdue);
            let priority_changed = derived != assignment.priority;

            if !should_mark_overdue && !priority_changed {
                continue;
            }

            let mut updated = assignment.clone();
            let expected_version = updated.version;
            let old_priority = updated.priority;

            if should_mark_overdue {
                if let Err(error) = updated.mark_overdue() {
                    report.faults.push(ScanFault {
                        entity: EntityKind::Assignment,
                        id: assignment.assignment_id,
                        error,
                    });
                    continue;
                }
            }
            if priority_changed {
                updated.set_priority(derived);
            }

            match self.store.save_assignment(updated, expected_version).await {
                Ok(saved) => {
                    if should_mark_overdue {
                        self.events.publish(DomainEvent::OrderOverdue {
                            order_id: saved.order_id,
                            assignment_id: Some(saved.assignment_id),
                            timer_id: None,
                        });
                        report.overdue_marked += 1;
                    }
                    if priority_changed {
                        self.events.publish(DomainEvent::PriorityChanged {
                            assignment_id: saved.assignment_id,
                            order_id: saved.order_id,
                            old_priority,
                            new_priority: saved.priority,
                        });
                        report.priority_changes += 1;
                    }
                }
                Err(error) => report.faults.push(ScanFault {
                    entity: EntityKind::Assignment,
                    id: assignment.assignment_id,
                    error,
                }),
            }
        }

        log_scan_outcome(
            report.timer_warnings,
            report.overdue_marked,
            report.priority_changes,
            report.faults.len(),
        );
        Ok(report)
    }

    /// Assign each order independently; a batch is a convenience wrapper
    /// over independent operations, never a transaction.
    pub async fn batch_assign(
        &self,
        order_ids: &[Uuid],
        staff_id: Uuid,
        assignment_type: AssignmentType,
        assigned_by: Uuid,
    ) -> BatchAssignReport {
        let mut outcomes = Vec::with_capacity(order_ids.len());
        for &order_id in order_ids {
            let result = self
                .tracker
                .assign(order_id, staff_id, assignment_type, assigned_by)
                .await;
            outcomes.push((order_id, result));
        }
        BatchAssignReport { outcomes }
    }
}
