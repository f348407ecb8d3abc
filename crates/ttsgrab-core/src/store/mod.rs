//! Persistent extension state (SQLite via sqlx).
//!
//! Holds the enabled flag, per-tab voice selection, custom names, per-voice
//! counters, download history and a capped error log. Every context (daemon,
//! interceptor, panel) shares this one database; no transactional guarantees
//! are promised across contexts beyond what each statement gives.

mod counters;
mod db;
mod errors;
mod history;
mod settings;
mod types;

pub use db::{unix_millis, Store};
pub use types::*;

#[cfg(test)]
pub(crate) use db::open_memory;
