//! Generation comparison
//!
//! Computes what changed between the previous and the current generation of a
//! [`ConfigStore`](super::ConfigStore). Output is sorted by file and key so
//! reports are stable across runs.

use std::collections::BTreeSet;
use std::fmt;

use super::ConfigMaps;
use crate::diagnostics::DiagnosticsSink;

/// One per-key difference inside a file present in both generations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChange {
    /// Key only present in the current generation.
    Added {
        /// Config file name.
        file: String,
        /// Flattened key.
        key: String,
        /// Current value.
        value: String,
    },
    /// Key only present in the previous generation.
    Removed {
        /// Config file name.
        file: String,
        /// Flattened key.
        key: String,
        /// Previous value.
        value: String,
    },
    /// Key present in both with different values.
    Changed {
        /// Config file name.
        file: String,
        /// Flattened key.
        key: String,
        /// Previous value.
        old: String,
        /// Current value.
        new: String,
    },
}

impl KeyChange {
    /// File the change belongs to
    pub fn file(&self) -> &str {
        match self {
            KeyChange::Added { file, .. }
            | KeyChange::Removed { file, .. }
            | KeyChange::Changed { file, .. } => file,
        }
    }

    /// Key the change belongs to
    pub fn key(&self) -> &str {
        match self {
            KeyChange::Added { key, .. }
            | KeyChange::Removed { key, .. }
            | KeyChange::Changed { key, .. } => key,
        }
    }
}

impl fmt::Display for KeyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyChange::Added { file, key, value } => {
                write!(f, "[{file}] added {key}:{value}")
            }
            KeyChange::Removed { file, key, value } => {
                write!(f, "[{file}] removed {key}:{value}")
            }
            KeyChange::Changed {
                file,
                key,
                old,
                new,
            } => write!(f, "[{file}] {key}: {old} -> {new}"),
        }
    }
}

/// Differences between two generations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationDiff {
    /// Files only present in the current generation.
    pub files_added: Vec<String>,
    /// Files only present in the previous generation.
    pub files_removed: Vec<String>,
    /// Per-key changes for files present in both.
    pub changes: Vec<KeyChange>,
}

impl GenerationDiff {
    /// Compare `previous` against `current`.
    pub fn compute(previous: &ConfigMaps, current: &ConfigMaps) -> Self {
        let mut diff = Self::default();

        let files: BTreeSet<&String> = previous.keys().chain(current.keys()).collect();
        for file in files {
            match (previous.get(file), current.get(file)) {
                (None, Some(_)) => diff.files_added.push(file.clone()),
                (Some(_), None) => diff.files_removed.push(file.clone()),
                (Some(old_map), Some(new_map)) => {
                    let keys: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();
                    for key in keys {
                        let change = match (old_map.get(key), new_map.get(key)) {
                            (None, Some(value)) => KeyChange::Added {
                                file: file.clone(),
                                key: key.clone(),
                                value: value.clone(),
                            },
                            (Some(value), None) => KeyChange::Removed {
                                file: file.clone(),
                                key: key.clone(),
                                value: value.clone(),
                            },
                            (Some(old), Some(new)) if old != new => KeyChange::Changed {
                                file: file.clone(),
                                key: key.clone(),
                                old: old.clone(),
                                new: new.clone(),
                            },
                            _ => continue,
                        };
                        diff.changes.push(change);
                    }
                }
                (None, None) => {}
            }
        }

        diff
    }

    /// Whether the generations are identical
    pub fn is_empty(&self) -> bool {
        self.files_added.is_empty() && self.files_removed.is_empty() && self.changes.is_empty()
    }

    /// Report lines, in emission order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(
            self.files_added.len() + self.files_removed.len() + self.changes.len(),
        );
        for file in &self.files_added {
            lines.push(format!("previous generation missing file: {file}"));
        }
        for file in &self.files_removed {
            lines.push(format!("current generation missing file: {file}"));
        }
        lines.extend(self.changes.iter().map(ToString::to_string));
        lines
    }

    /// Emit the report through `sink`.
    pub fn emit(&self, sink: &dyn DiagnosticsSink) {
        if self.is_empty() {
            sink.emit("generations are identical");
            return;
        }
        for line in self.lines() {
            sink.emit(&line);
        }
    }
}
