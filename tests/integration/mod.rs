//! Integration Tests Module
//!
//! End-to-end tests over the full scan pipeline: provider selection,
//! block paging, per-block matching, attribution and live sessions.

pub mod provider_selection;
pub mod script_decoding;
