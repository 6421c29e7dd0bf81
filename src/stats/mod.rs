//! Usage statistics for configuration lookups
//!
//! Tracks how often each key is resolved, how long resolution takes and which
//! patterns led to it. Collection is optional and disabled by default.

pub mod reporter;
pub mod tracker;
pub mod value;

pub use reporter::{ReportFormat, StatsReporter};
pub use tracker::StatisticsTracker;
pub use value::{StatsSnapshot, StatsValue};
