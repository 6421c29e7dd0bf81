//! Versioned configuration store
//!
//! The store keeps two generations of flattened configuration: the current one
//! served to lookups and the previous one kept for [`ConfigStore::revert`] and
//! for diagnostics.
//!
//! # Example
//!
//! ```rust
//! use confmap::store::{ConfigStore, StaticSource};
//!
//! let source = StaticSource::from_entries([("app", "db.port", "5432")]);
//! let store = ConfigStore::new(source);
//!
//! let config = store.get_config().unwrap();
//! assert_eq!(config["app"]["db.port"], "5432");
//! ```

mod config_store;
pub mod diff;
pub mod source;

use std::collections::HashMap;

pub use config_store::{ConfigStore, StoreError};
pub use diff::{GenerationDiff, KeyChange};
pub use source::{ConfigSource, FnSource, SourceError, StaticSource};

/// Flattened `key -> value` entries of one config file.
pub type FileMap = HashMap<String, String>;

/// `file name -> entries` for every loaded file.
pub type ConfigMaps = HashMap<String, FileMap>;
