//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use confmap::store::{ConfigMaps, ConfigSource, ConfigStore, FileMap, SourceError, StaticSource};
use confmap::{LookupEngine, LookupOptions};

/// Two files, one stock each.
pub fn stock_source() -> Arc<StaticSource> {
    Arc::new(StaticSource::from_entries([
        ("A", "stock.amd.shares", "200"),
        ("B", "stock.intc.shares", "100"),
    ]))
}

/// A larger portfolio spread over three files.
pub fn portfolio_source() -> Arc<StaticSource> {
    Arc::new(StaticSource::from_entries([
        ("stocks", "stock.amd.shares", "200"),
        ("stocks", "stock.amd.price", "150.25"),
        ("stocks", "stock.intc.shares", "100"),
        ("stocks", "stock.intc.price", "31.5"),
        ("stocks", "stock.NVDA.shares", "50"),
        ("bonds", "bond.us10y.units", "12"),
        ("bonds", "bond.us10y.coupon", "4.25"),
        ("settings", "report.enabled", "TRUE"),
        ("settings", "report.recipients", "ops@example.com,dev@example.com"),
        ("settings", "report.max_rows", "5000000000"),
    ]))
}

/// Store and engine over `source`.
pub fn engine_over(
    source: Arc<StaticSource>,
    options: LookupOptions,
) -> (Arc<ConfigStore>, LookupEngine) {
    let store = Arc::new(ConfigStore::new(source));
    let engine = LookupEngine::with_options(Arc::clone(&store), options);
    (store, engine)
}

/// Build a file map from `(key, value)` pairs.
pub fn file_map(entries: &[(&str, &str)]) -> FileMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Source producing a new numbered generation on every load.
///
/// Load `n` (1-based) yields one file `gen` with `version = n` and
/// `key.n = n`.
#[derive(Debug, Default)]
pub struct CountingSource {
    loads: AtomicUsize,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Maps produced by load `n`.
    pub fn generation(n: usize) -> ConfigMaps {
        let n = n.to_string();
        let key = format!("key.{n}");
        let mut maps = ConfigMaps::new();
        maps.insert(
            "gen".to_string(),
            file_map(&[("version", n.as_str()), (key.as_str(), n.as_str())]),
        );
        maps
    }
}

impl ConfigSource for CountingSource {
    fn load(&self) -> Result<ConfigMaps, SourceError> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Self::generation(n))
    }
}
