pub mod attempts;
pub mod cache;
pub mod coordinator;
pub mod guard;
pub mod throttle;

pub use coordinator::SubmissionCoordinator;
