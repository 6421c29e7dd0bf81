//! Statistics tracker
//!
//! Aggregates [`StatsValue`] records by configuration key.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::diagnostics::DiagnosticsSink;
use crate::stats::value::{StatsSnapshot, StatsValue};

/// Usage statistics for one lookup façade.
///
/// Collection is off by default since timing every lookup has a cost.
///
/// Only the creation of a record for a key seen for the first time takes the
/// map's exclusive lock. Updates of existing records go through a shared read
/// of the map and the record's own lock, so lookups of different keys never
/// serialize on a single lock.
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    enabled: AtomicBool,
    stats: RwLock<HashMap<String, Arc<StatsValue>>>,
}

impl StatisticsTracker {
    /// Create a disabled tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with collection switched on or off
    pub fn with_enabled(enabled: bool) -> Self {
        let tracker = Self::new();
        tracker.enabled.store(enabled, Ordering::Release);
        tracker
    }

    /// Check if collection is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enable statistics collection
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    /// Disable statistics collection
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Record one lookup of `key`.
    ///
    /// Recording is unconditional: callers sample [`is_enabled`](Self::is_enabled)
    /// when their lookup starts, so toggling never affects calls in flight.
    pub fn record(&self, key: &str, latency: Duration, pattern_tag: &str) {
        let existing = self.stats.read().get(key).cloned();
        if let Some(value) = existing {
            value.update(latency, Some(pattern_tag));
            return;
        }

        let value = {
            let mut stats = self.stats.write();
            // Another thread may have created the record between the two locks.
            match stats.get(key) {
                Some(value) => Arc::clone(value),
                None => {
                    let value = Arc::new(StatsValue::new(key));
                    stats.insert(key.to_string(), Arc::clone(&value));
                    value
                }
            }
        };
        value.update(latency, Some(pattern_tag));
    }

    /// Snapshot of the record for `key`
    pub fn stats_for(&self, key: &str) -> Option<StatsSnapshot> {
        self.stats.read().get(key).map(|value| value.snapshot())
    }

    /// Snapshot of every record
    pub fn stats(&self) -> HashMap<String, StatsSnapshot> {
        self.values()
            .into_iter()
            .map(|value| (value.key().to_string(), value.snapshot()))
            .collect()
    }

    /// Snapshots sorted by key
    pub fn sorted_snapshots(&self) -> Vec<StatsSnapshot> {
        let mut snapshots: Vec<_> = self.values().iter().map(|v| v.snapshot()).collect();
        snapshots.sort_by(|a, b| a.key.cmp(&b.key));
        snapshots
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.stats.read().len()
    }

    /// Whether no key has been recorded
    pub fn is_empty(&self) -> bool {
        self.stats.read().is_empty()
    }

    /// Drop every record
    pub fn clear(&self) {
        self.stats.write().clear();
    }

    /// Emit one `key:record` line per tracked key.
    pub fn dump(&self, sink: &dyn DiagnosticsSink) {
        for snapshot in self.sorted_snapshots() {
            sink.emit(&format!("{}:{}", snapshot.key, snapshot));
        }
    }

    // Clone the handles so snapshots are taken without holding the map lock.
    fn values(&self) -> Vec<Arc<StatsValue>> {
        self.stats.read().values().cloned().collect()
    }
}
