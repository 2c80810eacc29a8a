// Coordination services.
//
// The services own the load -> validate -> conditional save -> publish shape
// for every mutation. Records never persist themselves and events are only
// published after a successful save, which is what keeps emission at
// most-once per logical transition.

pub mod assignment_tracker;
pub mod estimator;
pub mod queue_coordinator;
pub mod timer_service;

pub use assignment_tracker::AssignmentTracker;
pub use estimator::{EstimateCookingTime, FlatRateEstimator};
pub use queue_coordinator::{
    BatchAssignReport, PageRequest, QueueCoordinator, QueueEntry, QueueFilter, QueuePage,
    ScanFault, ScanReport,
};
pub use timer_service::CookingTimerService;
