use crate::error::{CoordinationError, Result};

/// Construction-time configuration for the coordination core.
///
/// There is no global configuration singleton; callers build one of these
/// (usually via [`CoordinationConfig::from_env`]) and hand it to the services
/// that need it.
#[derive(Debug, Clone)]
pub struct CoordinationConfig {
    /// Concurrent active assignments a staff member may hold unless
    /// overridden per staff member.
    pub default_staff_capacity: usize,
    /// Capacity of the broadcast channel behind the event sink.
    pub event_channel_capacity: usize,
    /// Flat component of the placeholder cooking-time estimate, in minutes.
    pub estimate_base_minutes: i64,
    /// Per-item component of the placeholder cooking-time estimate, in minutes.
    pub estimate_per_item_minutes: i64,
    /// Margin subtracted from a timer's estimated duration to derive its
    /// warning threshold, `max(1, estimated_duration - margin)`.
    pub alert_margin_minutes: i64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            default_staff_capacity: 5,
            event_channel_capacity: 1000,
            estimate_base_minutes: 15,
            estimate_per_item_minutes: 5,
            alert_margin_minutes: 2,
        }
    }
}

impl CoordinationConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("KITCHEN_STAFF_CAPACITY") {
            config.default_staff_capacity = capacity.parse().map_err(|e| {
                CoordinationError::validation(format!("Invalid KITCHEN_STAFF_CAPACITY: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("KITCHEN_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.parse().map_err(|e| {
                CoordinationError::validation(format!(
                    "Invalid KITCHEN_EVENT_CHANNEL_CAPACITY: {e}"
                ))
            })?;
        }

        if let Ok(base) = std::env::var("KITCHEN_ESTIMATE_BASE_MINUTES") {
            config.estimate_base_minutes = base.parse().map_err(|e| {
                CoordinationError::validation(format!("Invalid KITCHEN_ESTIMATE_BASE_MINUTES: {e}"))
            })?;
        }

        if let Ok(per_item) = std::env::var("KITCHEN_ESTIMATE_PER_ITEM_MINUTES") {
            config.estimate_per_item_minutes = per_item.parse().map_err(|e| {
                CoordinationError::validation(format!(
                    "Invalid KITCHEN_ESTIMATE_PER_ITEM_MINUTES: {e}"
                ))
            })?;
        }

        if let Ok(margin) = std::env::var("KITCHEN_ALERT_MARGIN_MINUTES") {
            config.alert_margin_minutes = margin.parse().map_err(|e| {
                CoordinationError::validation(format!("Invalid KITCHEN_ALERT_MARGIN_MINUTES: {e}"))
            })?;
        }

        Ok(config)
    }
}
