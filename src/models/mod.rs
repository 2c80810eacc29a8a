// Data model layer.
//
// Plain records with their pure lifecycle math. Records mutate only through
// the transition methods defined here, each of which validates against the
// centralized state machine tables; persistence and event emission are the
// services' concern.

pub mod assignment;
pub mod order;
pub mod timer;

pub use assignment::{AssignmentType, OrderAssignment};
pub use order::{Order, OrderItem};
pub use timer::{CookingStage, CookingTimer};
