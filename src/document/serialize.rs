//! JSON rendering of compiled documents
//!
//! Terraform's JSON dialect allows repeated keys, which `serde_json::Value`
//! cannot represent. Blocks are therefore serialized entry by entry through
//! `serialize_map`, which writes every pair it is given.

use super::{Block, Document, Node};
use serde::ser::{Error as _, SerializeMap as _, SerializeSeq as _};
use serde::{Serialize, Serializer};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// Indentation used for written documents
const INDENT: &[u8] = b"    ";

impl Serialize for Block {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.sorted_entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, node) in entries {
            map.serialize_entry(key.as_str(), node)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Block(ref block) => block.serialize(serializer),
            Self::Value(ref value) => SortedValue(value).serialize(serializer),
        }
    }
}

impl Serialize for Document {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

/// Serializes a JSON value with object keys in sorted order
struct SortedValue<'a>(&'a Value);

impl Serialize for SortedValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self.0 {
            Value::Object(ref object) => {
                let mut entries: Vec<_> = object.iter().collect();
                entries.sort_by(|&(a, _), &(b, _)| a.cmp(b));
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, &SortedValue(value))?;
                }
                map.end()
            }
            Value::Array(ref items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&SortedValue(item))?;
                }
                seq.end()
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                self.0.serialize(serializer)
            }
        }
    }
}

impl Document {
    /// Render with sorted keys and four-space indentation, keeping duplicate keys
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A value cannot be serialized
    #[inline]
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        self.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(serde_json::Error::custom)
    }

    /// Render on a single line with sorted keys, keeping duplicate keys
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A value cannot be serialized
    #[inline]
    pub fn to_json_compact(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
