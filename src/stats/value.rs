//! Per-key usage record

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Count and running mean, always updated together.
#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    count: u64,
    average_latency_ns: f64,
}

/// Usage statistics for a single configuration key.
///
/// `count` and the average latency live in one critical section so a reader
/// never sees an increment without its latency folded in. The access time and
/// the pattern set are updated outside of it; a concurrent update may win the
/// timestamp, and pattern insertion is idempotent.
#[derive(Debug)]
pub struct StatsValue {
    key: String,
    counters: Mutex<Counters>,
    /// Nanoseconds since the Unix epoch, 0 when never accessed.
    last_accessed_ns: AtomicU64,
    associated_patterns: Mutex<HashSet<String>>,
}

impl StatsValue {
    /// Create an empty record for `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            counters: Mutex::new(Counters::default()),
            last_accessed_ns: AtomicU64::new(0),
            associated_patterns: Mutex::new(HashSet::new()),
        }
    }

    /// Record one access.
    pub fn update(&self, latency: Duration, pattern: Option<&str>) {
        let latency_ns = latency.as_nanos() as f64;
        {
            let mut counters = self.counters.lock();
            counters.count += 1;
            counters.average_latency_ns +=
                (latency_ns - counters.average_latency_ns) / counters.count as f64;
        }

        self.last_accessed_ns.store(now_ns(), Ordering::Relaxed);

        if let Some(pattern) = pattern {
            let mut patterns = self.associated_patterns.lock();
            if !patterns.contains(pattern) {
                patterns.insert(pattern.to_string());
            }
        }
    }

    /// Key this record belongs to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of recorded accesses
    pub fn count(&self) -> u64 {
        self.counters.lock().count
    }

    /// Mean latency in nanoseconds
    pub fn average_latency_ns(&self) -> f64 {
        self.counters.lock().average_latency_ns
    }

    /// Mean latency
    pub fn average_latency(&self) -> Duration {
        Duration::from_nanos(self.average_latency_ns().round() as u64)
    }

    /// Time of the latest access
    pub fn last_accessed(&self) -> Option<SystemTime> {
        match self.last_accessed_ns.load(Ordering::Relaxed) {
            0 => None,
            ns => Some(UNIX_EPOCH + Duration::from_nanos(ns)),
        }
    }

    /// Patterns that resolved to this key
    pub fn associated_patterns(&self) -> BTreeSet<String> {
        self.associated_patterns.lock().iter().cloned().collect()
    }

    /// Whether the only pattern recorded is the key itself, i.e. the key is
    /// only ever read through exact lookups.
    pub fn is_exact_only(&self) -> bool {
        let patterns = self.associated_patterns.lock();
        patterns.len() == 1 && patterns.contains(&self.key)
    }

    /// Consistent copy of the record
    pub fn snapshot(&self) -> StatsSnapshot {
        let counters = *self.counters.lock();
        StatsSnapshot {
            key: self.key.clone(),
            count: counters.count,
            average_latency_ns: counters.average_latency_ns,
            last_accessed: self.last_accessed(),
            associated_patterns: self.associated_patterns(),
        }
    }
}

/// Point-in-time copy of a [`StatsValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Configuration key
    pub key: String,
    /// Number of accesses
    pub count: u64,
    /// Mean latency in nanoseconds
    pub average_latency_ns: f64,
    /// Latest access
    pub last_accessed: Option<SystemTime>,
    /// Patterns that resolved to this key
    pub associated_patterns: BTreeSet<String>,
}

impl StatsSnapshot {
    /// Latest access in milliseconds since the Unix epoch
    pub fn last_accessed_millis(&self) -> Option<u128> {
        self.last_accessed
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsValue{{key={}, count={}, average_latency_ns={:.1}, last_accessed_ms={}, patterns=[",
            self.key,
            self.count,
            self.average_latency_ns,
            self.last_accessed_millis().unwrap_or(0),
        )?;
        for (i, pattern) in self.associated_patterns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(pattern)?;
        }
        f.write_str("]}")
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
        .max(1)
}
