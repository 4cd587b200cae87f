//! Core host-side types: records, stored values and submitted form data.
//!
//! All types serialize via serde. [`MetaValue`] covers both what the store
//! holds and what an admin form submits: plain strings, flat lists, or
//! string-keyed maps (named sub-keys of a multi-checkbox).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a host content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A host content record: the item a block of fields is attached to.
///
/// The engine only needs the identity and the record type name; everything
/// else about the record stays on the host side of the seam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Record type name, e.g. `"article"` or `"page"`.
    pub kind: String,
}

impl Record {
    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id: RecordId(id),
            kind: kind.into(),
        }
    }
}

/// One stored or submitted field value.
///
/// Values are always strings or string-keyed structures; the store never sees
/// anything richer. A flat list is what a multi-checkbox submits without
/// named sub-keys; a map is what it submits with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl MetaValue {
    /// Empty text, empty list or empty map.
    pub fn is_empty(&self) -> bool {
        match self {
            MetaValue::Text(s) => s.is_empty(),
            MetaValue::List(v) => v.is_empty(),
            MetaValue::Map(m) => m.is_empty(),
        }
    }

    /// The text content, or `None` for list/map values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The text content, or `""` for list/map values.
    pub fn text(&self) -> &str {
        self.as_text().unwrap_or("")
    }

    /// Whether a flat-list value contains `item`.
    pub fn list_contains(&self, item: &str) -> bool {
        matches!(self, MetaValue::List(v) if v.iter().any(|x| x == item))
    }

    /// Whether a map value has an entry under `key`.
    pub fn map_has(&self, key: &str) -> bool {
        matches!(self, MetaValue::Map(m) if m.contains_key(key))
    }
}

impl Default for MetaValue {
    fn default() -> Self {
        MetaValue::Text(String::new())
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(v: Vec<String>) -> Self {
        MetaValue::List(v)
    }
}

/// One submitted admin-screen form, as handed over by the host.
///
/// Field values arrive grouped: every block instance owns exactly one group
/// named `{instance_id}_meta`, so several blocks (and unrelated form fields)
/// can share a screen without colliding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    /// Group name → field value key → submitted value.
    pub groups: IndexMap<String, IndexMap<String, MetaValue>>,
    /// Anti-forgery token sent with the form, if any.
    pub nonce: Option<String>,
    /// Whether the host is autosaving rather than handling a real submit.
    pub autosave: bool,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value under a group, creating the group as needed.
    pub fn with_value(
        mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<MetaValue>,
    ) -> Self {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn as_autosave(mut self) -> Self {
        self.autosave = true;
        self
    }

    /// The value map submitted for one block instance, if present.
    pub fn group(&self, name: &str) -> Option<&IndexMap<String, MetaValue>> {
        self.groups.get(name)
    }
}
