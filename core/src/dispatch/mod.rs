//! Outbound call discipline shared by every directory read and write.
//!
//! A single [`Dispatcher`] per process owns the rate-limit state; a
//! [`RetryPolicy`] wraps each logical call and decides, from the classified
//! [`DispatchOutcome`], whether to try again.

mod limiter;
mod outcome;
mod retry;

pub use limiter::Dispatcher;
pub use outcome::{parse_retry_after, DispatchOutcome};
pub use retry::{classify, RetryDecision, RetryPolicy};
