//! Bitcoin Coinbase Marker Scanner
//!
//! Finds the most recent blocks whose transactions carry an ASCII marker in an
//! OP_RETURN output or the coinbase scriptSig, and attributes each to a mining pool.

pub mod cli;
pub mod config;
pub mod errors;
pub mod live;
pub mod pools;
pub mod provider;
pub mod scanner;
pub mod script;
pub mod types;
pub mod utils;
