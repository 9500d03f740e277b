//! Guarded report lifecycle: submission, assignment, geofenced resolution and
//! citizen-verified closure.
//!
//! Every operation takes the report aggregate the caller fetched and returns
//! the committed successor. A failed precondition performs no store writes.

mod error;
mod lifecycle;

pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::{LifecycleConfig, ReportLifecycle, DEFAULT_VERIFY_REWARD_COINS};
