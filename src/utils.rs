//! Shared helpers
//!
//! - `time`: Timestamp formatting for published records

pub mod time;
