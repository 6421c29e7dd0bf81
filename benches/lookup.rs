//! Lookup benchmarks for confmap
//!
//! Compares the three pattern strategies, exact lookups and the two ways of
//! answering prefix lookups, with statistics collection on and off.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use confmap::pattern::{self, Pattern};
use confmap::store::{ConfigMaps, ConfigStore, FileMap, StaticSource};
use confmap::{LookupEngine, LookupOptions};

// =============================================================================
// Helper Functions
// =============================================================================

const TICKERS: [&str; 8] = ["amd", "intc", "nvda", "aapl", "msft", "goog", "amzn", "tsla"];
const FIELDS: [&str; 4] = ["shares", "price", "currency", "exchange"];

/// Build `files` files of `keys_per_file` stock entries each.
fn build_maps(files: usize, keys_per_file: usize, seed: u64) -> ConfigMaps {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut maps = ConfigMaps::new();
    for f in 0..files {
        let mut map = FileMap::new();
        for i in 0..keys_per_file {
            let ticker = TICKERS[rng.gen_range(0..TICKERS.len())];
            let field = FIELDS[rng.gen_range(0..FIELDS.len())];
            map.insert(
                format!("portfolio{f}.stock.{ticker}{i}.{field}"),
                rng.gen_range(1..10_000u32).to_string(),
            );
        }
        maps.insert(format!("file{f}"), map);
    }
    maps
}

fn create_engine(maps: ConfigMaps, options: LookupOptions) -> LookupEngine {
    let store = Arc::new(ConfigStore::new(StaticSource::new(maps)));
    LookupEngine::with_options(store, options)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup/strategy");
    let maps = build_maps(4, 2_500, 42);
    let total: usize = maps.values().map(|m| m.len()).sum();
    group.throughput(Throughput::Elements(total as u64));

    let patterns = [
        ("contains", Pattern::new("amd").unwrap()),
        ("find", pattern::build(false, &["stock", "amd"]).unwrap()),
        ("full_match", pattern::build(true, &["stock", "amd"]).unwrap()),
    ];

    for statistics in [false, true] {
        let engine = create_engine(
            maps.clone(),
            LookupOptions::new().with_statistics(statistics),
        );
        for (name, pattern) in &patterns {
            let id = BenchmarkId::new(*name, if statistics { "stats" } else { "plain" });
            group.bench_with_input(id, pattern, |b, pattern| {
                b.iter(|| black_box(engine.get(pattern, &["shares"])))
            });
        }
    }

    group.finish();
}

fn bench_get_by_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup/get_by_key");
    let maps = build_maps(4, 2_500, 7);
    let keys: Vec<String> = maps.values().flat_map(|m| m.keys().cloned()).collect();
    let engine = create_engine(maps, LookupOptions::new());
    let mut rng = StdRng::seed_from_u64(11);

    group.throughput(Throughput::Elements(1));
    group.bench_function("hit", |b| {
        b.iter(|| {
            let key = &keys[rng.gen_range(0..keys.len())];
            black_box(engine.get_by_key(key))
        })
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(engine.get_by_key("no.such.key")))
    });

    group.finish();
}

fn bench_prefix(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup/prefix");
    let maps = build_maps(4, 2_500, 99);

    for prefix_index in [false, true] {
        let engine = create_engine(
            maps.clone(),
            LookupOptions::new().with_prefix_index(prefix_index),
        );
        // Build the index outside the measurement.
        engine.get_with_prefix("");

        let name = if prefix_index { "trie" } else { "scan" };
        for prefix in ["portfolio1.stock.amd", "portfolio2."] {
            group.bench_with_input(BenchmarkId::new(name, prefix), prefix, |b, prefix| {
                b.iter(|| black_box(engine.get_with_prefix(prefix)))
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_get_by_key,
    bench_prefix
);
criterion_main!(benches);
