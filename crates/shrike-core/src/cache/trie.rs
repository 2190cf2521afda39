//! Set-keyed trie.
//!
//! Keys are collections treated as sets: every lookup sorts the key first,
//! so permutations of the same items land on the same node. Nodes live in
//! an arena and reference their children by index.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct TrieNode<K, V> {
    children: BTreeMap<K, usize>,
    value: Option<V>,
}

impl<K, V> TrieNode<K, V> {
    const fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            value: None,
        }
    }
}

/// Trie mapping an order-independent key collection to a value.
#[derive(Debug, Clone)]
pub struct TrieCache<K, V> {
    nodes: Vec<TrieNode<K, V>>,
    len: usize,
}

impl<K: Ord + Clone, V> TrieCache<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new()],
            len: 0,
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up the value stored for `key`, in any order.
    #[must_use]
    pub fn get(&self, key: &[K]) -> Option<&V> {
        let mut cursor = 0;
        for part in canonical(key) {
            cursor = *self.nodes[cursor].children.get(part)?;
        }
        self.nodes[cursor].value.as_ref()
    }

    /// Return `true` if an entry is stored for exactly this key set.
    #[must_use]
    pub fn contains(&self, key: &[K]) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: &[K], value: V) -> Option<V> {
        let mut cursor = 0;
        for part in canonical(key) {
            cursor = if let Some(&child) = self.nodes[cursor].children.get(part) {
                child
            } else {
                let child = self.nodes.len();
                self.nodes.push(TrieNode::new());
                self.nodes[cursor].children.insert(part.clone(), child);
                child
            };
        }

        let previous = self.nodes[cursor].value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0] = TrieNode::new();
        self.len = 0;
    }
}

impl<K: Ord + Clone, V> Default for TrieCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical<K: Ord>(key: &[K]) -> Vec<&K> {
    let mut sorted: Vec<&K> = key.iter().collect();
    sorted.sort_unstable();
    sorted
}
