use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};

use super::diff::GenerationDiff;
use super::source::{ConfigSource, SourceError};
use super::ConfigMaps;
use crate::diagnostics::DiagnosticsSink;

/// Errors surfaced by the configuration store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store was queried before any successful load.
    #[error("configuration store has not been loaded")]
    NotInitialized,
    /// The configuration source failed.
    #[error("failed to load configuration: {0}")]
    ExternalLoad(#[from] SourceError),
}

/// Published state. Replaced as a whole under the state lock.
#[derive(Debug, Default)]
struct Generations {
    current: Arc<ConfigMaps>,
    previous: Arc<ConfigMaps>,
    last_updated: Option<SystemTime>,
    generation: u64,
}

/// Two-generation configuration cache.
///
/// Readers take cheap `Arc` snapshots and never observe a partially applied
/// reload. `reload` and `revert` are serialized by a writer lock held for the
/// whole operation, including the call into the source, so a source must not
/// call back into the store that owns it.
pub struct ConfigStore {
    source: Box<dyn ConfigSource>,
    state: RwLock<Generations>,
    writer: Mutex<()>,
    initialized: AtomicBool,
}

impl ConfigStore {
    /// Create a store loading from `source`. Nothing is loaded until the first
    /// [`get_config`](Self::get_config) or [`reload`](Self::reload).
    pub fn new(source: impl ConfigSource + 'static) -> Self {
        Self::with_boxed_source(Box::new(source))
    }

    /// Create a store from an already boxed source
    pub fn with_boxed_source(source: Box<dyn ConfigSource>) -> Self {
        Self {
            source,
            state: RwLock::new(Generations::default()),
            writer: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Current generation, loading it on first access.
    ///
    /// The first-access trigger runs once: later calls return whatever the
    /// store holds, even an empty map. A failed first load is returned to the
    /// caller and retried by the next call.
    pub fn get_config(&self) -> Result<Arc<ConfigMaps>, StoreError> {
        if !self.initialized.load(Ordering::Acquire) {
            let _writer = self.writer.lock();
            if !self.initialized.load(Ordering::Acquire) {
                self.load_locked()?;
            }
        }
        Ok(self.current())
    }

    /// Reload from the source, keeping the replaced generation as previous.
    pub fn reload(&self) -> Result<(), StoreError> {
        let _writer = self.writer.lock();
        self.load_locked()
    }

    /// Replace the current generation with the previous one.
    ///
    /// The previous generation is left untouched, so reverting twice in a
    /// row is the same as reverting once.
    pub fn revert(&self) {
        let _writer = self.writer.lock();
        let mut state = self.state.write();
        state.current = Arc::clone(&state.previous);
        state.generation += 1;
        let generation = state.generation;
        drop(state);

        if tracing::enabled!(tracing::Level::INFO) {
            tracing::info!(generation, "configuration reverted to previous generation");
        }
    }

    /// Time of the most recent successful load
    pub fn last_updated(&self) -> Result<SystemTime, StoreError> {
        self.state
            .read()
            .last_updated
            .ok_or(StoreError::NotInitialized)
    }

    /// Current generation without triggering a load
    pub fn current(&self) -> Arc<ConfigMaps> {
        Arc::clone(&self.state.read().current)
    }

    /// Previous generation
    pub fn previous(&self) -> Arc<ConfigMaps> {
        Arc::clone(&self.state.read().previous)
    }

    /// Counter bumped by every reload and revert
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Current generation paired with its counter, read atomically
    pub fn current_with_generation(&self) -> (Arc<ConfigMaps>, u64) {
        let state = self.state.read();
        (Arc::clone(&state.current), state.generation)
    }

    /// Whether a load has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Report the differences between the previous and current generations.
    pub fn compare_generations(&self, sink: &dyn DiagnosticsSink) -> GenerationDiff {
        let (previous, current) = {
            let state = self.state.read();
            (Arc::clone(&state.previous), Arc::clone(&state.current))
        };
        let diff = GenerationDiff::compute(&previous, &current);
        diff.emit(sink);
        diff
    }

    /// Emit every current `key:value` entry.
    pub fn dump_current(&self, sink: &dyn DiagnosticsSink) {
        dump_generation("current generation", &self.current(), sink);
    }

    /// Emit every current and previous `key:value` entry.
    pub fn dump_all(&self, sink: &dyn DiagnosticsSink) {
        let (previous, current) = {
            let state = self.state.read();
            (Arc::clone(&state.previous), Arc::clone(&state.current))
        };
        dump_generation("current generation", &current, sink);
        dump_generation("previous generation", &previous, sink);
    }

    /// Must be called with the writer lock held.
    fn load_locked(&self) -> Result<(), StoreError> {
        let fresh = match self.source.load() {
            Ok(maps) => Arc::new(maps),
            Err(err) => {
                if tracing::enabled!(tracing::Level::WARN) {
                    tracing::warn!(error = %err, "configuration load failed");
                }
                return Err(err.into());
            }
        };
        let files = fresh.len();

        let mut state = self.state.write();
        let replaced = std::mem::replace(&mut state.current, Arc::clone(&fresh));
        // Only the first successful load seeds both generations; later loads
        // keep the replaced map as previous even when it is empty.
        state.previous = if self.initialized.load(Ordering::Acquire) {
            replaced
        } else {
            fresh
        };
        state.last_updated = Some(SystemTime::now());
        state.generation += 1;
        let generation = state.generation;
        drop(state);

        self.initialized.store(true, Ordering::Release);

        if tracing::enabled!(tracing::Level::INFO) {
            tracing::info!(files, generation, "configuration loaded");
        }
        Ok(())
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ConfigStore")
            .field("files", &state.current.len())
            .field("generation", &state.generation)
            .field("last_updated", &state.last_updated)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

fn dump_generation(label: &str, maps: &ConfigMaps, sink: &dyn DiagnosticsSink) {
    sink.emit(&format!("dumping {label}"));
    let sorted: BTreeMap<&String, BTreeMap<&String, &String>> = maps
        .iter()
        .map(|(file, entries)| (file, entries.iter().collect()))
        .collect();
    for (file, entries) in sorted {
        sink.emit(&format!("[{file}]"));
        for (key, value) in entries {
            sink.emit(&format!("{key}:{value}"));
        }
    }
}
