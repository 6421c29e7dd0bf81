//! Prefix index over flattened configuration keys
//!
//! Keys form a hierarchy by plain string prefix: `a.b` sits under `a`.
//! The [`PrefixTrie`] keeps that hierarchy so every key below a prefix can be
//! found without scanning the whole configuration.

mod trie;

pub use trie::{Iter, PrefixTrie, TrieNode};
