//! The compiled configuration document
//!
//! Blocks are ordered association lists rather than maps so that duplicate
//! keys (see [`DuplicateKey`]) survive merging and serialization. Attribute
//! values below the `name` level are plain JSON values.

pub mod serialize;

use crate::objects::DuplicateKey;
use core::cmp::Ordering;
use core::mem;
use serde_json::{Map, Value};

/// A key in a document block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Ordinary key, equal to any other plain key with the same text
    Plain(String),
    /// Intentionally repeated key, equal only to itself
    Duplicate(DuplicateKey),
}

impl Key {
    /// The key text as written in the output
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        match *self {
            Self::Plain(ref key) => key,
            Self::Duplicate(ref key) => key.as_str(),
        }
    }

    fn sort_slot(&self) -> Option<usize> {
        match *self {
            Self::Plain(_) => None,
            Self::Duplicate(ref key) => Some(key.slot()),
        }
    }
}

impl Ord for Key {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str()
            .cmp(other.as_str())
            .then_with(|| self.sort_slot().cmp(&other.sort_slot()))
    }
}

impl PartialOrd for Key {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Key {
    #[inline]
    fn from(key: &str) -> Self {
        Self::Plain(key.to_owned())
    }
}

impl From<String> for Key {
    #[inline]
    fn from(key: String) -> Self {
        Self::Plain(key)
    }
}

impl From<DuplicateKey> for Key {
    #[inline]
    fn from(key: DuplicateKey) -> Self {
        Self::Duplicate(key)
    }
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Structural level (category, type or name)
    Block(Block),
    /// Attribute payload
    Value(Value),
}

impl Node {
    /// Borrow the block if this node is one
    #[must_use]
    #[inline]
    pub const fn as_block(&self) -> Option<&Block> {
        match *self {
            Self::Block(ref block) => Some(block),
            Self::Value(_) => None,
        }
    }

    /// Mutably borrow the block if this node is one
    #[inline]
    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match *self {
            Self::Block(ref mut block) => Some(block),
            Self::Value(_) => None,
        }
    }

    /// Borrow the JSON payload if this node is a value
    #[must_use]
    #[inline]
    pub const fn as_value(&self) -> Option<&Value> {
        match *self {
            Self::Value(ref value) => Some(value),
            Self::Block(_) => None,
        }
    }

    /// Convert to plain JSON. Duplicate keys collapse, the last one wins.
    #[must_use]
    #[inline]
    pub fn to_value(&self) -> Value {
        match *self {
            Self::Block(ref block) => block.to_value(),
            Self::Value(ref value) => value.clone(),
        }
    }

    /// Merge `incoming` into this node: blocks and JSON objects merge
    /// recursively, anything else is replaced
    #[inline]
    pub fn merge(&mut self, incoming: Self) {
        match (self, incoming) {
            (&mut Self::Block(ref mut existing), Self::Block(other)) => existing.merge(other),
            (&mut Self::Value(Value::Object(ref mut existing)), Self::Value(Value::Object(other))) => {
                merge_values(existing, other);
            }
            (slot, other) => *slot = other,
        }
    }
}

impl From<Block> for Node {
    #[inline]
    fn from(block: Block) -> Self {
        Self::Block(block)
    }
}

impl From<Value> for Node {
    #[inline]
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Recursively merge JSON objects, `source` wins on conflicts
#[inline]
pub fn merge_values(dest: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        if let Value::Object(incoming) = value {
            if let Some(&mut Value::Object(ref mut existing)) = dest.get_mut(&key) {
                merge_values(existing, incoming);
                continue;
            }
            dest.insert(key, Value::Object(incoming));
        } else {
            dest.insert(key, value);
        }
    }
}

/// An ordered list of key/node entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    entries: Vec<(Key, Node)>,
}

impl Block {
    /// Create an empty block
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Block::insert`]
    #[must_use]
    #[inline]
    pub fn with<K: Into<Key>, N: Into<Node>>(mut self, key: K, node: N) -> Self {
        self.insert(key, node);
        self
    }

    /// Insert or replace the entry for `key`, returning the previous node
    #[inline]
    pub fn insert<K: Into<Key>, N: Into<Node>>(&mut self, key: K, node: N) -> Option<Node> {
        let key = key.into();
        let node = node.into();
        if let Some(existing) = self.get_mut(&key) {
            return Some(mem::replace(existing, node));
        }
        self.entries.push((key, node));
        None
    }

    /// Look up the entry stored under exactly `key`
    #[must_use]
    #[inline]
    pub fn get(&self, key: &Key) -> Option<&Node> {
        self.entries
            .iter()
            .find(|entry| entry.0 == *key)
            .map(|entry| &entry.1)
    }

    /// Mutable variant of [`Block::get`]
    #[inline]
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|entry| entry.0 == *key)
            .map(|entry| &mut entry.1)
    }

    /// Look up the plain entry named `key`
    #[must_use]
    #[inline]
    pub fn get_plain(&self, key: &str) -> Option<&Node> {
        self.get(&Key::from(key))
    }

    /// Every entry whose text equals `key`, duplicates included, in insertion order
    #[inline]
    pub fn entries_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.0.as_str() == key)
            .map(|entry| &entry.1)
    }

    /// Mutable variant of [`Block::entries_named`]
    #[inline]
    pub fn entries_named_mut<'a>(
        &'a mut self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a mut Node> + 'a {
        self.entries
            .iter_mut()
            .filter(move |entry| entry.0.as_str() == key)
            .map(|entry| &mut entry.1)
    }

    /// Remove and return the entry stored under exactly `key`
    #[inline]
    pub fn remove(&mut self, key: &Key) -> Option<Node> {
        let position = self.entries.iter().position(|entry| entry.0 == *key)?;
        Some(self.entries.remove(position).1)
    }

    /// Iterate over entries in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Node)> {
        self.entries.iter().map(|&(ref key, ref node)| (key, node))
    }

    /// Iterate mutably over entries in insertion order
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut Node)> {
        self.entries
            .iter_mut()
            .map(|&mut (ref key, ref mut node)| (key, node))
    }

    /// Number of entries, duplicates counted separately
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the block has no entries
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key text, then duplicate slot; ties keep insertion order
    #[must_use]
    #[inline]
    pub fn sorted_entries(&self) -> Vec<(&Key, &Node)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|&(a, _), &(b, _)| a.cmp(b));
        entries
    }

    /// Recursively merge `other` into this block
    #[inline]
    pub fn merge(&mut self, other: Self) {
        for (key, node) in other.entries {
            if let Some(existing) = self.get_mut(&key) {
                existing.merge(node);
            } else {
                self.entries.push((key, node));
            }
        }
    }

    /// Convert to plain JSON. Duplicate keys collapse, the last one wins.
    #[must_use]
    #[inline]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for &(ref key, ref node) in &self.entries {
            map.insert(key.as_str().to_owned(), node.to_value());
        }
        Value::Object(map)
    }
}

/// The merged output of a compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Block,
}

impl Document {
    /// Create an empty document
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self { root: Block::new() }
    }

    /// The top-level block (one entry per category)
    #[must_use]
    #[inline]
    pub const fn root(&self) -> &Block {
        &self.root
    }

    /// The block for a category such as `resource`
    #[must_use]
    #[inline]
    pub fn category(&self, category: &str) -> Option<&Block> {
        self.root.get_plain(category).and_then(Node::as_block)
    }

    /// Whether nothing was compiled
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Merge one built fragment into the document
    #[inline]
    pub fn merge(&mut self, fragment: Block) {
        self.root.merge(fragment);
    }

    /// Convert to plain JSON. Duplicate keys collapse; use
    /// [`Document::to_json_pretty`] to keep them.
    #[must_use]
    #[inline]
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }
}

impl From<Block> for Document {
    #[inline]
    fn from(root: Block) -> Self {
        Self { root }
    }
}
