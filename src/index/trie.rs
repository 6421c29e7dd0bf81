//! Prefix trie over flattened keys
//!
//! Groups keys by textual prefix so that a whole configuration subtree can be
//! fetched without scanning every key. A node only ever has children whose
//! keys start with its own key:
//!
//! ```text
//! a
//! | a.b
//! | a.c
//! |   | a.c.e
//! b
//! | b.d
//! ```
//!
//! Lookup cost depends on how much the keys share prefixes; with no shared
//! prefixes it degrades to a linear scan of the top level.
//!
//! The trie has no internal synchronization. Mutation takes `&mut self`, so
//! sharing one between threads requires an external lock.

use std::fmt;

use crate::diagnostics::DiagnosticsSink;

/// A key/value entry and the entries it prefixes.
///
/// Equality compares key and value only.
#[derive(Debug, Clone)]
pub struct TrieNode {
    key: String,
    value: String,
    children: Vec<TrieNode>,
}

impl TrieNode {
    /// Create a leaf node
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Full dotted key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Direct children
    pub fn children(&self) -> &[TrieNode] {
        &self.children
    }

    /// Whether the node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether `key` belongs below this node
    pub fn is_parent_of(&self, key: &str) -> bool {
        key.starts_with(self.key.as_str())
    }

    /// Whether this node belongs below `key`
    pub fn is_child_of(&self, key: &str) -> bool {
        self.key.starts_with(key)
    }

    /// Whether both keys share everything up to their last `.`
    pub fn is_sibling_of(&self, key: &str) -> bool {
        parent_path(&self.key) == parent_path(key)
    }

    /// This node followed by all of its descendants, depth first
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

impl PartialEq for TrieNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Eq for TrieNode {}

impl fmt::Display for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

fn parent_path(key: &str) -> &str {
    key.rfind('.').map_or("", |idx| &key[..idx])
}

/// Depth-first iterator over trie nodes.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    stack: Vec<&'a TrieNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TrieNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Trie of [`TrieNode`]s keyed by string prefix.
#[derive(Debug, Clone, Default)]
pub struct PrefixTrie {
    roots: Vec<TrieNode>,
    /// Nodes created by inserts.
    size: usize,
}

impl PrefixTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` with `value`.
    ///
    /// Re-inserting an existing key replaces its value without creating a
    /// node. An empty key is ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        if insert_at(&mut self.roots, TrieNode::new(key, value)) {
            self.size += 1;
        }
    }

    /// Node whose key equals `key`
    pub fn get_exact(&self, key: &str) -> Option<&TrieNode> {
        let mut level = self.roots.as_slice();
        'descend: loop {
            for node in level {
                if node.key == key {
                    return Some(node);
                }
                if node.is_parent_of(key) {
                    level = &node.children;
                    continue 'descend;
                }
            }
            return None;
        }
    }

    /// Value stored for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_exact(key).map(TrieNode::value)
    }

    /// Whether `key` is stored
    pub fn contains_key(&self, key: &str) -> bool {
        self.get_exact(key).is_some()
    }

    /// Whether any node stores `value`
    pub fn contains_value(&self, value: &str) -> bool {
        self.iter().any(|node| node.value == value)
    }

    /// Every node whose key starts with `prefix`, with all of its descendants.
    pub fn get_with_prefix(&self, prefix: &str) -> Vec<&TrieNode> {
        let mut found = Vec::new();
        collect_with_prefix(&self.roots, prefix, &mut found);
        found
    }

    /// Nodes created by inserts
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the trie holds no node
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Top-level nodes
    pub fn roots(&self) -> &[TrieNode] {
        &self.roots
    }

    /// All nodes, depth first
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// All nodes, depth first
    pub fn all_nodes(&self) -> Vec<&TrieNode> {
        self.iter().collect()
    }

    /// All keys, depth first
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(TrieNode::key).collect()
    }

    /// Remove every node and reset the insert counter
    pub fn clear(&mut self) {
        self.roots.clear();
        self.size = 0;
    }

    /// Emit one indented `key:value` line per node.
    pub fn dump(&self, sink: &dyn DiagnosticsSink) {
        fn dump_level(nodes: &[TrieNode], depth: usize, sink: &dyn DiagnosticsSink) {
            for node in nodes {
                sink.emit(&format!("{:indent$}{node}", "", indent = depth * 2));
                dump_level(&node.children, depth + 1, sink);
            }
        }
        dump_level(&self.roots, 0, sink);
    }
}

/// Returns whether a node was created.
fn insert_at(level: &mut Vec<TrieNode>, mut node: TrieNode) -> bool {
    if let Some(existing) = level.iter_mut().find(|n| n.key == node.key) {
        existing.value = node.value;
        return false;
    }

    if let Some(parent) = level.iter_mut().find(|n| n.is_parent_of(&node.key)) {
        return insert_at(&mut parent.children, node);
    }

    if level.iter().any(|n| n.is_child_of(&node.key)) {
        let (moved, kept): (Vec<_>, Vec<_>) = std::mem::take(level)
            .into_iter()
            .partition(|n| n.is_child_of(&node.key));
        *level = kept;
        node.children.extend(moved);
    }

    level.push(node);
    true
}

fn collect_with_prefix<'a>(level: &'a [TrieNode], prefix: &str, found: &mut Vec<&'a TrieNode>) {
    for node in level {
        if node.is_child_of(prefix) {
            found.extend(node.iter());
        } else if node.is_parent_of(prefix) {
            collect_with_prefix(&node.children, prefix, found);
        }
    }
}

impl<K, V> Extend<(K, V)> for PrefixTrie
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PrefixTrie
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = PrefixTrie::new();
        trie.extend(iter);
        trie
    }
}
