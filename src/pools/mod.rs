//! Mining pool metadata and attribution
//!
//! - **Registry** - Pool registry document parsing (tags, payout addresses, slugs)
//! - **Loader** - One-shot registry fetch with empty-registry degradation
//! - **Attribution** - Coinbase → pool resolution priority chain

pub mod attribution;
pub mod loader;
pub mod registry;

pub use attribution::PoolAttributor;
pub use loader::MetadataLoader;
pub use registry::{PoolRegistry, TagEntry, TagPattern};
