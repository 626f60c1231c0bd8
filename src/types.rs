//! Marker Scanner - Type System
//!
//! - `chain`: Provider response shapes (blocks, transactions, extras)
//! - `results`: Pool identities and published match records

mod chain;
mod results;

pub use chain::*;
pub use results::*;
