//! Key, pattern and prefix lookups over a [`ConfigStore`](crate::store::ConfigStore)
//!
//! The [`LookupEngine`] is the read side of the crate. It resolves single keys
//! (optionally converted to a [`TargetType`]), groups of keys selected by a
//! [`Pattern`](crate::pattern::Pattern) and narrowed by search terms, and key
//! prefixes.

mod coerce;
mod engine;
mod reduce;

pub use coerce::{coerce, CoercionError, TargetType, TypedValue};
pub use engine::{LookupEngine, LookupOptions};
pub use reduce::{pattern_tag, reduce};
