// State machine module for back-of-house coordination.
//
// Status enums for assignments and cooking timers, each with one centralized
// allowed-transition table, plus the single generic validator every mutating
// operation goes through. Transition legality lives here and nowhere else.

pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use states::{AssignmentStatus, TimerStatus};
pub use transitions::{ensure_transition, MachineState};
