//! Script decoding and marker matching
//!
//! - **opreturn** - OP_RETURN push-data extraction from asm or raw hex
//! - **marker** - Hex substring matching and coinbase ASCII rendering

pub mod marker;
pub mod opreturn;

pub use marker::{hex_to_ascii, MarkerMatcher};
pub use opreturn::{extract_op_return_hex, payload_from_script};
