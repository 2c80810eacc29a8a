//! # Order Model
//!
//! Read-only view of an order as this core sees it. Orders are owned by the
//! surrounding application (menu/payment CRUD is out of scope); the core
//! references them by id and reads their age, items, and instructions to
//! derive priority and join queue views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of an order: a dish and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: u32,
}

/// An order as referenced by assignments and timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub table_number: u32,
    pub items: Vec<OrderItem>,
    pub ordered_at: DateTime<Utc>,
    pub special_instructions: Option<String>,
}

impl Order {
    pub fn new(table_number: u32, items: Vec<OrderItem>, ordered_at: DateTime<Utc>) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            table_number,
            items,
            ordered_at,
            special_instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(instructions.into());
        self
    }

    /// Total dish count across all lines, the input to priority derivation
    /// and the flat cooking-time estimate.
    pub fn item_count(&self) -> usize {
        self.items.iter().map(|item| item.quantity as usize).sum()
    }
}
