//! Cooking-time estimation.
//!
//! The flat heuristic below is a placeholder policy, not a verified
//! business rule, so it sits behind a trait and is swappable at service
//! construction.

use crate::config::CoordinationConfig;
use crate::models::Order;

/// Strategy for estimating how long an order's cooking will take.
pub trait EstimateCookingTime: Send + Sync {
    /// Estimated cooking duration for the whole order, in minutes.
    fn estimate_minutes(&self, order: &Order) -> i64;
}

/// Default estimator: a flat base plus a per-item increment.
#[derive(Debug, Clone, Copy)]
pub struct FlatRateEstimator {
    pub base_minutes: i64,
    pub per_item_minutes: i64,
}

impl FlatRateEstimator {
    pub fn from_config(config: &CoordinationConfig) -> Self {
        Self {
            base_minutes: config.estimate_base_minutes,
            per_item_minutes: config.estimate_per_item_minutes,
        }
    }
}

impl Default for FlatRateEstimator {
    fn default() -> Self {
        Self {
            base_minutes: 15,
            per_item_minutes: 5,
        }
    }
}

impl EstimateCookingTime for FlatRateEstimator {
    fn estimate_minutes(&self, order: &Order) -> i64 {
        self.base_minutes + self.per_item_minutes * order.item_count() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItem;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_flat_rate_estimate() {
        let order = Order::new(
            3,
            vec![OrderItem {
                menu_item_id: Uuid::new_v4(),
                name: "Curry".to_string(),
                quantity: 4,
            }],
            Utc::now(),
        );
        let estimator = FlatRateEstimator::default();
        assert_eq!(estimator.estimate_minutes(&order), 15 + 5 * 4);
    }
}
