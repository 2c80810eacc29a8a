//! # Structured Logging Module
//!
//! Environment-aware structured logging for tracing assignment and timer
//! transitions through the coordination core. The library itself never
//! initializes logging implicitly; hosting processes call
//! [`init_structured_logging`] once at startup.

use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level)),
        );

        // Use try_init to avoid panic if a global subscriber already exists
        // (e.g. the hosting web server installed one first).
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing one"
            );
        }

        tracing::info!(environment = %environment, "structured logging initialized");
    });
}

/// Get current environment from environment variables.
fn get_environment() -> String {
    std::env::var("KITCHEN_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment.
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for assignment operations.
pub fn log_assignment_operation(
    operation: &str,
    assignment_id: Uuid,
    order_id: Uuid,
    staff_id: Uuid,
    status: &str,
) {
    tracing::info!(
        operation = %operation,
        assignment_id = %assignment_id,
        order_id = %order_id,
        staff_id = %staff_id,
        status = %status,
        "assignment_operation"
    );
}

/// Log structured data for cooking timer operations.
pub fn log_timer_operation(
    operation: &str,
    timer_id: Uuid,
    order_id: Uuid,
    status: &str,
    stage: &str,
) {
    tracing::info!(
        operation = %operation,
        timer_id = %timer_id,
        order_id = %order_id,
        status = %status,
        stage = %stage,
        "timer_operation"
    );
}

/// Log the outcome of an alert/overdue scan pass.
pub fn log_scan_outcome(warnings: usize, overdue: usize, priority_changes: usize, faults: usize) {
    tracing::info!(
        warnings = warnings,
        overdue = overdue,
        priority_changes = priority_changes,
        faults = faults,
        "scan_completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("KITCHEN_ENV", "test_override");
        assert_eq!(get_environment(), "test_override");
        std::env::remove_var("KITCHEN_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("anything_else"), "debug");
    }
}
