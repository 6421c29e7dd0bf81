use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::coerce::{coerce, TargetType, TypedValue};
use super::reduce::{pattern_tag, reduce};
use crate::diagnostics::DiagnosticsSink;
use crate::index::PrefixTrie;
use crate::pattern::Pattern;
use crate::stats::StatisticsTracker;
use crate::store::{ConfigMaps, ConfigStore, FileMap};

/// Options for a [`LookupEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Start with statistics collection enabled
    pub statistics: bool,
    /// Answer prefix lookups from a trie index
    pub prefix_index: bool,
}

impl LookupOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable statistics collection at start
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics = enabled;
        self
    }

    /// Enable or disable the prefix trie index
    pub fn with_prefix_index(mut self, enabled: bool) -> Self {
        self.prefix_index = enabled;
        self
    }
}

/// Trie built from one store generation.
#[derive(Debug)]
struct PrefixIndex {
    generation: u64,
    trie: PrefixTrie,
}

impl PrefixIndex {
    fn build(generation: u64, config: &ConfigMaps) -> Self {
        let trie = config
            .values()
            .flat_map(|map| map.iter())
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        Self { generation, trie }
    }
}

/// Query façade over a [`ConfigStore`].
///
/// Lookups never fail: a missing file or key, a value that cannot be
/// converted, or a store that cannot be loaded all produce an empty result and
/// a log line. Only [`ConfigStore::reload`] reports load errors.
///
/// Group lookups lower-case each key before applying the pattern and return
/// keys in their original case.
#[derive(Debug)]
pub struct LookupEngine {
    store: Arc<ConfigStore>,
    statistics: StatisticsTracker,
    prefix_index: Option<RwLock<Option<PrefixIndex>>>,
}

impl LookupEngine {
    /// Create an engine with default options
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self::with_options(store, LookupOptions::default())
    }

    /// Create an engine with `options`
    pub fn with_options(store: Arc<ConfigStore>, options: LookupOptions) -> Self {
        Self {
            store,
            statistics: StatisticsTracker::with_enabled(options.statistics),
            prefix_index: options.prefix_index.then(|| RwLock::new(None)),
        }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Statistics collected by this engine
    pub fn statistics(&self) -> &StatisticsTracker {
        &self.statistics
    }

    /// Whether prefix lookups use the trie index
    pub fn has_prefix_index(&self) -> bool {
        self.prefix_index.is_some()
    }

    /// Value of a property-style key, searching every file.
    ///
    /// Intended for keys that exist in one file only. When several files hold
    /// the key, which one answers is unspecified.
    pub fn get_by_key(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        let started = self.start_timer();
        let config = self.config()?;

        let value = config.values().find_map(|map| map.get(key)).cloned();

        if let (Some(started), Some(_)) = (started, value.as_ref()) {
            // Exact lookups are tagged with the key itself.
            self.statistics.record(key, started.elapsed(), key);
        }
        value
    }

    /// Value of `key` in `file`; without a file name, same as
    /// [`get_by_key`](Self::get_by_key).
    pub fn get_by_key_in(&self, file: Option<&str>, key: &str) -> Option<String> {
        let Some(file) = file.filter(|file| !file.is_empty()) else {
            if tracing::enabled!(tracing::Level::INFO) {
                tracing::info!(key, "no file name given, searching every file");
            }
            return self.get_by_key(key);
        };
        if key.is_empty() {
            return None;
        }
        self.config()?.get(file)?.get(key).cloned()
    }

    /// Value of `key` converted to `target`
    pub fn get_by_key_typed(&self, key: &str, target: TargetType) -> Option<TypedValue> {
        let value = self.get_by_key(key)?;
        convert(key, &value, target)
    }

    /// Value of `key` in `file` converted to `target`
    pub fn get_by_key_typed_in(
        &self,
        file: Option<&str>,
        key: &str,
        target: TargetType,
    ) -> Option<TypedValue> {
        let value = self.get_by_key_in(file, key)?;
        convert(key, &value, target)
    }

    /// Entries of every file matching `pattern` and containing every term.
    pub fn get(&self, pattern: &Pattern, terms: &[&str]) -> HashMap<String, String> {
        match self.config() {
            Some(config) => self.resolve(config.values(), pattern, terms),
            None => HashMap::new(),
        }
    }

    /// Like [`get`](Self::get), restricted to one file.
    ///
    /// Without a file name every file is searched; an unknown file yields
    /// nothing.
    pub fn get_in(
        &self,
        file: Option<&str>,
        pattern: &Pattern,
        terms: &[&str],
    ) -> HashMap<String, String> {
        let Some(file) = file.filter(|file| !file.is_empty()) else {
            if tracing::enabled!(tracing::Level::INFO) {
                tracing::info!(pattern = %pattern, "no file name given, searching every file");
            }
            return self.get(pattern, terms);
        };

        let Some(config) = self.config() else {
            return HashMap::new();
        };
        match config.get(file) {
            Some(map) => self.resolve(std::iter::once(map), pattern, terms),
            None => HashMap::new(),
        }
    }

    /// Matches of [`get`](Self::get) ordered by `comparator`, or by key when
    /// none is given.
    pub fn get_sorted(
        &self,
        comparator: Option<&dyn Fn(&str, &str) -> Ordering>,
        pattern: &Pattern,
        terms: &[&str],
    ) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self.get(pattern, terms).into_iter().collect();
        match comparator {
            Some(compare) => entries.sort_by(|a, b| compare(&a.0, &b.0)),
            None => entries.sort_by(|a, b| a.0.cmp(&b.0)),
        }
        entries
    }

    /// Every entry whose key starts with `prefix`.
    ///
    /// Served from the trie index when enabled, otherwise by scanning.
    pub fn get_with_prefix(&self, prefix: &str) -> BTreeMap<String, String> {
        let started = self.start_timer();

        let entries = match self.with_prefix_index(|trie| -> BTreeMap<String, String> {
            trie.get_with_prefix(prefix)
                .into_iter()
                .map(|node| (node.key().to_string(), node.value().to_string()))
                .collect()
        }) {
            Some(entries) => entries,
            None => match self.config() {
                Some(config) => config
                    .values()
                    .flat_map(|map| map.iter())
                    .filter(|(key, _)| key.starts_with(prefix))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
                None => BTreeMap::new(),
            },
        };

        if let Some(started) = started {
            let tag = format!("{prefix}*");
            let elapsed = started.elapsed();
            for key in entries.keys() {
                self.statistics.record(key, elapsed, &tag);
            }
        }
        entries
    }

    /// Emit the prefix index, if enabled.
    pub fn dump_prefix_index(&self, sink: &dyn DiagnosticsSink) {
        if self.with_prefix_index(|trie| trie.dump(sink)).is_none() {
            sink.emit("prefix index disabled");
        }
    }

    fn resolve<'a>(
        &self,
        maps: impl Iterator<Item = &'a FileMap>,
        pattern: &Pattern,
        terms: &[&str],
    ) -> HashMap<String, String> {
        let started = self.start_timer();

        let mut matches = HashMap::new();
        for map in maps {
            collect_matches(map, pattern, &mut matches);
        }
        let reduced = reduce(matches, terms);

        if let Some(started) = started {
            self.record_matches(&reduced, &pattern_tag(pattern, terms), started.elapsed());
        }
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                pattern = %pattern,
                strategy = %pattern.strategy(),
                matches = reduced.len(),
                "group lookup"
            );
        }
        reduced
    }

    fn record_matches(&self, matches: &HashMap<String, String>, tag: &str, elapsed: Duration) {
        for key in matches.keys() {
            self.statistics.record(key, elapsed, tag);
        }
    }

    /// Run `f` against a trie matching the store's current generation,
    /// rebuilding it when the store has moved on. `None` when the index is
    /// disabled or the store cannot be loaded.
    fn with_prefix_index<R>(&self, f: impl FnOnce(&PrefixTrie) -> R) -> Option<R> {
        let index = self.prefix_index.as_ref()?;
        self.config()?;
        let (config, generation) = self.store.current_with_generation();

        {
            let guard = index.read();
            if let Some(current) = guard.as_ref().filter(|i| i.generation == generation) {
                return Some(f(&current.trie));
            }
        }

        let mut guard = index.write();
        if guard.as_ref().map_or(true, |i| i.generation != generation) {
            *guard = Some(PrefixIndex::build(generation, &config));
            if tracing::enabled!(tracing::Level::DEBUG) {
                tracing::debug!(generation, "prefix index rebuilt");
            }
        }
        guard.as_ref().map(|current| f(&current.trie))
    }

    fn config(&self) -> Option<Arc<ConfigMaps>> {
        match self.store.get_config() {
            Ok(config) => Some(config),
            Err(err) => {
                if tracing::enabled!(tracing::Level::WARN) {
                    tracing::warn!(error = %err, "configuration unavailable for lookup");
                }
                None
            }
        }
    }

    /// Samples the enabled flag once per call.
    fn start_timer(&self) -> Option<Instant> {
        self.statistics.is_enabled().then(Instant::now)
    }
}

fn collect_matches(map: &FileMap, pattern: &Pattern, matches: &mut HashMap<String, String>) {
    for (key, value) in map {
        if pattern.matches(&key.to_lowercase()) {
            matches.insert(key.clone(), value.clone());
        }
    }
}

fn convert(key: &str, value: &str, target: TargetType) -> Option<TypedValue> {
    match coerce(value, target) {
        Ok(typed) => Some(typed),
        Err(err) => {
            if tracing::enabled!(tracing::Level::WARN) {
                tracing::warn!(key, error = %err, "config value conversion failed");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::pattern;
    use crate::store::{FnSource, SourceError, StaticSource};

    fn engine(options: LookupOptions) -> LookupEngine {
        let source = StaticSource::from_entries([
            ("portfolio", "stocks.stock.amd.shares", "200"),
            ("portfolio", "stocks.stock.amd.price", "150.5"),
            ("portfolio", "stocks.stock.INTC.shares", "100"),
            ("settings", "feature.enabled", "true"),
            ("settings", "feature.owners", "ops,dev"),
            ("settings", "retry.count", "three"),
        ]);
        LookupEngine::with_options(Arc::new(ConfigStore::new(source)), options)
    }

    #[test]
    fn test_get_by_key() {
        let engine = engine(LookupOptions::new());
        assert_eq!(engine.get_by_key("feature.enabled").as_deref(), Some("true"));
        assert_eq!(engine.get_by_key("missing"), None);
        assert_eq!(engine.get_by_key(""), None);
    }

    #[test]
    fn test_get_by_key_in_file() {
        let engine = engine(LookupOptions::new());
        assert_eq!(
            engine.get_by_key_in(Some("settings"), "retry.count").as_deref(),
            Some("three")
        );
        assert_eq!(engine.get_by_key_in(Some("portfolio"), "retry.count"), None);
        assert_eq!(engine.get_by_key_in(Some("unknown"), "retry.count"), None);
        assert_eq!(
            engine.get_by_key_in(None, "retry.count").as_deref(),
            Some("three")
        );
        assert_eq!(
            engine.get_by_key_in(Some(""), "retry.count").as_deref(),
            Some("three")
        );
    }

    #[test]
    fn test_typed_lookups() {
        let engine = engine(LookupOptions::new());
        assert_eq!(
            engine
                .get_by_key_typed("feature.enabled", TargetType::Boolean)
                .and_then(|v| v.as_bool()),
            Some(true)
        );
        assert_eq!(
            engine
                .get_by_key_typed_in(Some("portfolio"), "stocks.stock.amd.price", TargetType::Double)
                .and_then(|v| v.as_f64()),
            Some(150.5)
        );
        assert_eq!(
            engine
                .get_by_key_typed("feature.owners", TargetType::List)
                .unwrap()
                .as_list()
                .map(<[String]>::len),
            Some(2)
        );
        assert_eq!(engine.get_by_key_typed("retry.count", TargetType::Integer), None);
    }

    #[test]
    fn test_group_lookup_is_case_insensitive_on_keys() {
        let engine = engine(LookupOptions::new());
        let pattern = pattern::build(false, &["stocks.stock"]).unwrap();

        let matches = engine.get(&pattern, &["intc"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches["stocks.stock.INTC.shares"], "100");
    }

    #[test]
    fn test_get_in_scopes_to_file() {
        let engine = engine(LookupOptions::new());
        let all = Pattern::catch_all().unwrap();

        assert_eq!(engine.get_in(Some("settings"), &all, &[]).len(), 3);
        assert_eq!(engine.get_in(None, &all, &[]).len(), 6);
        assert!(engine.get_in(Some("nope"), &all, &[]).is_empty());
    }

    #[test]
    fn test_get_sorted() {
        let engine = engine(LookupOptions::new());
        let pattern = pattern::build(false, &["stocks"]).unwrap();

        let natural = engine.get_sorted(None, &pattern, &[]);
        let keys: Vec<&str> = natural.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "stocks.stock.INTC.shares",
                "stocks.stock.amd.price",
                "stocks.stock.amd.shares"
            ]
        );

        let reversed = |a: &str, b: &str| b.cmp(a);
        let sorted = engine.get_sorted(Some(&reversed), &pattern, &[]);
        assert_eq!(sorted[0].0, "stocks.stock.amd.shares");
    }

    #[test]
    fn test_statistics_tagging() {
        let engine = engine(LookupOptions::new().with_statistics(true));
        let pattern = pattern::build(false, &["stocks"]).unwrap();

        let matches = engine.get(&pattern, &["amd", "shares"]);
        assert_eq!(matches.len(), 1);

        let stats = engine.statistics().stats_for("stocks.stock.amd.shares").unwrap();
        assert_eq!(stats.count, 1);
        assert!(stats.associated_patterns.contains("stocks.*:amd:shares"));

        engine.get_by_key("retry.count").unwrap();
        let stats = engine.statistics().stats_for("retry.count").unwrap();
        assert!(stats.associated_patterns.contains("retry.count"));
    }

    #[test]
    fn test_failed_exact_lookup_is_not_recorded() {
        let engine = engine(LookupOptions::new().with_statistics(true));
        assert_eq!(engine.get_by_key("missing"), None);
        assert!(engine.statistics().is_empty());
    }

    #[test]
    fn test_prefix_lookup_with_and_without_index() {
        for prefix_index in [false, true] {
            let engine = engine(LookupOptions::new().with_prefix_index(prefix_index));
            assert_eq!(engine.has_prefix_index(), prefix_index);

            let amd = engine.get_with_prefix("stocks.stock.amd");
            assert_eq!(amd.len(), 2);
            assert_eq!(amd["stocks.stock.amd.shares"], "200");
            assert_eq!(engine.get_with_prefix("feature.").len(), 2);
            assert!(engine.get_with_prefix("zzz").is_empty());
        }
    }

    #[test]
    fn test_prefix_index_follows_reload() {
        let source = Arc::new(StaticSource::from_entries([("f", "a.b", "1")]));
        let store = Arc::new(ConfigStore::new(Arc::clone(&source)));
        let engine =
            LookupEngine::with_options(Arc::clone(&store), LookupOptions::new().with_prefix_index(true));

        assert_eq!(engine.get_with_prefix("a").len(), 1);

        source.set("f", "a.c", "2");
        store.reload().unwrap();
        assert_eq!(engine.get_with_prefix("a").len(), 2);

        store.revert();
        assert_eq!(engine.get_with_prefix("a").len(), 1);

        let sink = MemorySink::new();
        engine.dump_prefix_index(&sink);
        assert_eq!(sink.lines(), vec!["a.b:1".to_string()]);
    }

    #[test]
    fn test_unavailable_store_yields_empty_results() {
        let store = ConfigStore::new(FnSource::new(|| Err(SourceError::msg("down"))));
        let engine = LookupEngine::new(Arc::new(store));

        assert_eq!(engine.get_by_key("a"), None);
        assert!(engine.get(&Pattern::catch_all().unwrap(), &[]).is_empty());
        assert!(engine.get_with_prefix("a").is_empty());
    }
}
