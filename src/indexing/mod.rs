//! Deep index construction (spec §4.2): file discovery, per-strategy
//! parsing, and cross-file call resolution.

pub mod builder;
pub mod walker;

pub use builder::{BuiltIndex, IndexBuilder};
pub use walker::{DiscoveredFile, FileWalker, SkipReason};
