//! Retry controller: bounded verification rounds over a shrinking failure set.
//!
//! The controller is a plain state machine. It does not run anything itself;
//! the batch runner drives it by scheduling [`RetryController::pending`],
//! verifying, and feeding the result to [`RetryController::record`].

mod controller;
mod report;

pub use controller::{RetryController, RoundState};
pub use report::{BatchReport, RoundSummary};
