//! Configuration sources
//!
//! A [`ConfigSource`] supplies the flattened `file -> (key -> value)` maps.
//! Parsing concrete file formats is the source's business; the store only sees
//! the finished maps.

use std::io;

use parking_lot::RwLock;

use super::ConfigMaps;

/// Errors reported by a configuration source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Source-specific failure.
    #[error("{0}")]
    Message(String),
    /// I/O error while reading a source.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    /// Create a source error from a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Loader for flattened configuration maps.
///
/// `load` runs while the owning [`ConfigStore`](super::ConfigStore) holds its
/// writer lock. Implementations must not call back into that store
/// (`get_config`, `reload` or `revert`); the lock is not reentrant and the
/// call deadlocks. Reading a different store is fine.
pub trait ConfigSource: Send + Sync {
    /// Load every configured file as a flat key/value map.
    fn load(&self) -> Result<ConfigMaps, SourceError>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for Box<S> {
    fn load(&self) -> Result<ConfigMaps, SourceError> {
        (**self).load()
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<S> {
    fn load(&self) -> Result<ConfigMaps, SourceError> {
        (**self).load()
    }
}

/// In-memory source whose contents can be replaced between loads.
#[derive(Debug, Default)]
pub struct StaticSource {
    maps: RwLock<ConfigMaps>,
}

impl StaticSource {
    /// Create a source serving `maps`
    pub fn new(maps: ConfigMaps) -> Self {
        Self {
            maps: RwLock::new(maps),
        }
    }

    /// Build a source from `(file, key, value)` triples.
    pub fn from_entries<F, K, V>(entries: impl IntoIterator<Item = (F, K, V)>) -> Self
    where
        F: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut maps = ConfigMaps::new();
        for (file, key, value) in entries {
            maps.entry(file.into())
                .or_default()
                .insert(key.into(), value.into());
        }
        Self::new(maps)
    }

    /// Replace the maps served by subsequent loads
    pub fn replace(&self, maps: ConfigMaps) {
        *self.maps.write() = maps;
    }

    /// Set one entry for subsequent loads
    pub fn set(&self, file: &str, key: &str, value: &str) {
        self.maps
            .write()
            .entry(file.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Remove one entry for subsequent loads
    pub fn remove(&self, file: &str, key: &str) -> Option<String> {
        let mut maps = self.maps.write();
        let removed = maps.get_mut(file)?.remove(key);
        if maps.get(file).is_some_and(|map| map.is_empty()) {
            maps.remove(file);
        }
        removed
    }
}

impl ConfigSource for StaticSource {
    fn load(&self) -> Result<ConfigMaps, SourceError> {
        Ok(self.maps.read().clone())
    }
}

/// Source backed by a closure.
pub struct FnSource<F> {
    loader: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<ConfigMaps, SourceError> + Send + Sync,
{
    /// Wrap `loader`
    pub fn new(loader: F) -> Self {
        Self { loader }
    }
}

impl<F> ConfigSource for FnSource<F>
where
    F: Fn() -> Result<ConfigMaps, SourceError> + Send + Sync,
{
    fn load(&self) -> Result<ConfigMaps, SourceError> {
        (self.loader)()
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}
