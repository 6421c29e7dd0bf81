//! confmap - An in-process configuration cache
//!
//! Configuration lives in named files, each a flat map of dot-delimited keys
//! to string values. This crate keeps two generations of that data in memory
//! and answers lookups against the current one:
//! - **ConfigStore**: current and previous generations with reload and revert
//! - **LookupEngine**: exact, typed, pattern group and prefix lookups
//! - **StatisticsTracker**: optional per-key usage statistics
//! - **PrefixTrie**: hierarchical index over flattened keys
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use confmap::prelude::*;
//!
//! let source = StaticSource::from_entries([
//!     ("portfolio", "stock.amd.shares", "200"),
//!     ("portfolio", "stock.intc.shares", "100"),
//! ]);
//! let store = Arc::new(ConfigStore::new(source));
//! let engine = LookupEngine::new(Arc::clone(&store));
//!
//! assert_eq!(engine.get_by_key("stock.amd.shares").as_deref(), Some("200"));
//!
//! let pattern = pattern::build(false, &["stock"]).unwrap();
//! let amd = engine.get(&pattern, &["amd"]);
//! assert_eq!(amd.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod index;
pub mod lookup;
pub mod pattern;
pub mod stats;
pub mod store;

// Re-exports for convenience
pub use config::{ConfigError, ConfmapConfig};
pub use diagnostics::{DiagnosticsSink, MemorySink, TracingSink};
pub use index::{PrefixTrie, TrieNode};
pub use lookup::{LookupEngine, LookupOptions, TargetType, TypedValue};
pub use pattern::{Pattern, PatternError, Strategy};
pub use stats::{StatisticsTracker, StatsReporter, StatsValue};
pub use store::{ConfigSource, ConfigStore, SourceError, StaticSource, StoreError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::diagnostics::{DiagnosticsSink, TracingSink};
    pub use crate::lookup::{LookupEngine, LookupOptions, TargetType, TypedValue};
    pub use crate::pattern::{self, Pattern, Strategy};
    pub use crate::stats::{StatisticsTracker, StatsReporter};
    pub use crate::store::{ConfigMaps, ConfigSource, ConfigStore, FnSource, StaticSource};
}
