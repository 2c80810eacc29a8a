#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Kitchen Core
//!
//! Back-of-house coordination engine for restaurant order work: who is
//! working which order, how far each dish is through cooking, what priority
//! an order deserves, and when something is late enough to alert a human.
//!
//! ## Architecture
//!
//! Two state machines sit at the center: the **assignment lifecycle**
//! (staff-to-order work binding) and the **cooking timer lifecycle**
//! (per-dish stages with pause-aware time math). A pure **priority engine**
//! derives urgency from order age on every read, and the **queue
//! coordinator** joins everything into a sorted view and runs the
//! idempotent alert/overdue scan.
//!
//! All shared state mutates through optimistic version checks: a writer
//! loads a record, computes the new state, and saves conditionally on the
//! version being unchanged. A lost race surfaces as
//! `ConcurrentModification` and the caller retries against fresh state.
//! Domain events publish only after a successful save, so observers see at
//! most one event per logical transition.
//!
//! ## Module Organization
//!
//! - [`models`] - Order, assignment, and timer records with their pure math
//! - [`state_machine`] - Status enums, transition tables, one validator
//! - [`priority`] - Order age and attributes to urgency level
//! - [`coordination`] - Tracker, timer service, queue coordinator, estimator
//! - [`persistence`] - Storage port and the concurrent in-memory store
//! - [`events`] - Typed domain events over a broadcast sink
//! - [`clock`] - Injected time source
//! - [`config`] - Construction-time configuration
//! - [`error`] - Structured error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kitchen_core::clock::SystemClock;
//! use kitchen_core::config::CoordinationConfig;
//! use kitchen_core::coordination::AssignmentTracker;
//! use kitchen_core::events::EventPublisher;
//! use kitchen_core::persistence::InMemoryStore;
//!
//! let config = CoordinationConfig::default();
//! let store = Arc::new(InMemoryStore::new());
//! let events = EventPublisher::new(config.event_channel_capacity);
//! let tracker = AssignmentTracker::new(store, events, Arc::new(SystemClock), &config);
//! ```

pub mod clock;
pub mod config;
pub mod coordination;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod priority;
pub mod state_machine;

// Re-export the high-traffic types at the crate root.
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::CoordinationConfig;
pub use coordination::{
    AssignmentTracker, CookingTimerService, FlatRateEstimator, QueueCoordinator, QueueFilter,
};
pub use error::{CoordinationError, EntityKind, Result};
pub use events::{DomainEvent, EventPublisher};
pub use models::{AssignmentType, CookingStage, CookingTimer, Order, OrderAssignment, OrderItem};
pub use persistence::{CoordinationStore, InMemoryStore};
pub use priority::PriorityLevel;
pub use state_machine::{AssignmentStatus, TimerStatus};
