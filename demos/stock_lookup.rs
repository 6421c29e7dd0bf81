//! Stock lookup demo
//!
//! Walks through loading, querying, reloading and reverting a small stock
//! portfolio, then prints the collected statistics.
//!
//! Run: cargo run --example stock_lookup
//!
//! Settings are read from `CONFMAP_CONFIG` / `CONFMAP__section__field` when
//! present; set `RUST_LOG=confmap=debug` to see the library's log output.

use std::sync::Arc;

use confmap::config::ConfmapConfig;
use confmap::diagnostics::TracingSink;
use confmap::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== confmap stock lookup demo ===\n");

    // 1. Settings
    println!("--- 1. Settings ---");
    let settings = ConfmapConfig::load_from_env()?;
    let options = settings
        .to_lookup_options()
        .with_statistics(true)
        .with_prefix_index(true);
    println!("  {options:?}\n");

    // 2. Store
    println!("--- 2. Store ---");
    let source = Arc::new(StaticSource::from_entries([
        ("A", "stock.amd.shares", "200"),
        ("A", "stock.amd.price", "150.25"),
        ("B", "stock.intc.shares", "100"),
        ("B", "stock.intc.price", "31.50"),
        ("C", "alerts.enabled", "true"),
        ("C", "alerts.recipients", "ops@example.com,dev@example.com"),
    ]));
    let store = Arc::new(ConfigStore::new(Arc::clone(&source)));
    let engine = LookupEngine::with_options(Arc::clone(&store), options);
    println!("  files: {}", store.get_config()?.len());
    println!("  generation: {}\n", store.generation());

    // 3. Exact and typed lookups
    println!("--- 3. Exact lookups ---");
    println!("  stock.amd.shares = {:?}", engine.get_by_key("stock.amd.shares"));
    let price = engine.get_by_key_typed_in(Some("B"), "stock.intc.price", TargetType::Double);
    println!("  stock.intc.price (double) = {price:?}");
    let recipients = engine.get_by_key_typed("alerts.recipients", TargetType::List);
    println!("  alerts.recipients (list) = {recipients:?}\n");

    // 4. Group lookups
    println!("--- 4. Group lookups ---");
    let stocks = pattern::build(false, &["stock"])?;
    println!("  pattern {} uses {}", stocks, stocks.strategy());
    for (key, value) in engine.get_sorted(None, &stocks, &["shares"]) {
        println!("  {key} = {value}");
    }
    for (key, value) in engine.get_with_prefix("stock.amd") {
        println!("  prefix stock.amd: {key} = {value}");
    }
    println!();

    // 5. Reload and revert
    println!("--- 5. Reload and revert ---");
    source.set("A", "stock.amd.shares", "250");
    store.reload()?;
    println!("  after reload: {:?}", engine.get_by_key("stock.amd.shares"));
    store.compare_generations(&TracingSink);
    store.revert();
    println!("  after revert: {:?}", engine.get_by_key("stock.amd.shares"));
    println!();

    // 6. Statistics
    println!("--- 6. Statistics ---");
    print!("{}", settings.to_stats_reporter().report(engine.statistics()));

    Ok(())
}
