//! Retry and backoff policy for storage operations.
//!
//! Counter updates go through this so a briefly locked or busy database does
//! not cost a sequence number; callers decide what to do once the policy gives up.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_sqlx_error};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
