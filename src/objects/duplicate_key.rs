//! Keys that are intentionally repeated in the output document
//!
//! Terraform accepts the same provider name several times at the top of the
//! `provider` block (distinguished only by `alias`). Each repeated key gets a
//! slot number at allocation time; the slot, not the text, decides identity.

use core::fmt;
use std::collections::HashMap;

/// A textual key that never collides with other keys of the same text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey {
    key: String,
    slot: usize,
}

impl DuplicateKey {
    /// The key text as it appears in the output
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Allocation order among keys with the same text (0 for the first)
    #[must_use]
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for DuplicateKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for DuplicateKey {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl PartialEq<str> for DuplicateKey {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.key == other
    }
}

impl PartialEq<&str> for DuplicateKey {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.key == *other
    }
}

/// Hands out monotonically increasing slots per distinct key text
#[derive(Debug, Default)]
pub struct DuplicateKeys {
    next_slot: HashMap<String, usize>,
}

impl DuplicateKeys {
    /// Create an empty allocator
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next slot for `key`
    #[inline]
    pub fn allocate(&mut self, key: &str) -> DuplicateKey {
        let next = self.next_slot.entry(key.to_owned()).or_insert(0);
        let slot = *next;
        *next += 1;
        DuplicateKey {
            key: key.to_owned(),
            slot,
        }
    }

    /// Forget every allocation
    #[inline]
    pub fn clear(&mut self) {
        self.next_slot.clear();
    }
}
