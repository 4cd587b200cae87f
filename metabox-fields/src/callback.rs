//! Callable configuration values.
//!
//! Schemas carry behavior as well as data: disable predicates, output and
//! update transforms, sanitizers and whole-field render callbacks. All of
//! them are `Arc<dyn Fn>` behind the [`Hook`] wrapper so spec structs stay
//! `Clone + Debug`, and all of them are excluded from serialization — two
//! specs differing only in callables hash to the same instance id.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use metabox_host::{MetaValue, Record, RecordId};

use crate::types::FieldSpec;

/// Shared wrapper for function-valued configuration.
///
/// Exists so schema structs can derive `Clone` and `Debug` while holding
/// trait objects. Call through it with `(hook.0)(args)`.
pub struct Hook<F: ?Sized>(pub Arc<F>);

impl<F: ?Sized> Hook<F> {
    pub fn new(f: Arc<F>) -> Self {
        Self(f)
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Arguments handed to an explicit per-field render callback.
#[derive(Debug)]
pub struct RenderArgs<'a> {
    pub spec: &'a FieldSpec,
    pub key: &'a str,
    pub meta_key: &'a str,
    /// The computed HTML form-field name.
    pub name: &'a str,
    pub value: &'a MetaValue,
    pub record: &'a Record,
}

/// Disable predicate for a whole block: `(record) -> bool`.
pub type BlockDisableFn = Hook<dyn Fn(&Record) -> bool + Send + Sync>;

/// Disable predicate for one field: `(record, meta_key) -> bool`.
pub type DisableFn = Hook<dyn Fn(&Record, &str) -> bool + Send + Sync>;

/// Value transform applied before display: `(record, meta_key, value) -> value`.
pub type OutputFn = Hook<dyn Fn(&Record, &str, MetaValue) -> MetaValue + Send + Sync>;

/// Persistence override for one field: `(record, meta_key, value)`.
pub type UpdateFn = Hook<dyn Fn(&Record, &str, &MetaValue) + Send + Sync>;

/// Sanitizer for one submitted value.
pub type SanitizeFn = Hook<dyn Fn(MetaValue) -> MetaValue + Send + Sync>;

/// Sanitizer for a whole block's submitted map: `(values, record_id) -> values`.
pub type BlockSanitizeFn =
    Hook<dyn Fn(IndexMap<String, MetaValue>, RecordId) -> IndexMap<String, MetaValue> + Send + Sync>;

/// Explicit render callback replacing every built-in strategy.
pub type RenderFn = Hook<dyn Fn(&RenderArgs<'_>) -> String + Send + Sync>;

/// A block-level text that is either a literal or computed from the record.
#[derive(Debug, Clone)]
pub enum BlockText {
    Str(String),
    Call(Hook<dyn Fn(&Record) -> String + Send + Sync>),
}

impl BlockText {
    pub fn call(f: impl Fn(&Record) -> String + Send + Sync + 'static) -> Self {
        BlockText::Call(Hook(Arc::new(f)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BlockText::Str(s) if s.is_empty())
    }

    pub fn resolve(&self, record: &Record) -> String {
        match self {
            BlockText::Str(s) => s.clone(),
            BlockText::Call(f) => (f.0)(record),
        }
    }
}

impl Default for BlockText {
    fn default() -> Self {
        BlockText::Str(String::new())
    }
}

impl From<&str> for BlockText {
    fn from(s: &str) -> Self {
        BlockText::Str(s.to_string())
    }
}

impl From<String> for BlockText {
    fn from(s: String) -> Self {
        BlockText::Str(s)
    }
}

// Callables serialize as the empty string, so a literal and a closure never
// produce different instance ids by accident.
impl Serialize for BlockText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockText::Str(s) => serializer.serialize_str(s),
            BlockText::Call(_) => serializer.serialize_str(""),
        }
    }
}

/// A field-level text: literal or computed from
/// `(record, meta_key, value, name)`.
#[derive(Debug, Clone)]
pub enum FieldText {
    Str(String),
    Call(Hook<dyn Fn(&Record, &str, &MetaValue, &str) -> String + Send + Sync>),
}

impl FieldText {
    pub fn call(
        f: impl Fn(&Record, &str, &MetaValue, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        FieldText::Call(Hook(Arc::new(f)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldText::Str(s) if s.is_empty())
    }

    pub fn resolve(&self, record: &Record, meta_key: &str, value: &MetaValue, name: &str) -> String {
        match self {
            FieldText::Str(s) => s.clone(),
            FieldText::Call(f) => (f.0)(record, meta_key, value, name),
        }
    }
}

impl Default for FieldText {
    fn default() -> Self {
        FieldText::Str(String::new())
    }
}

impl From<&str> for FieldText {
    fn from(s: &str) -> Self {
        FieldText::Str(s.to_string())
    }
}

impl From<String> for FieldText {
    fn from(s: String) -> Self {
        FieldText::Str(s)
    }
}

impl Serialize for FieldText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldText::Str(s) => serializer.serialize_str(s),
            FieldText::Call(_) => serializer.serialize_str(""),
        }
    }
}

/// How a submitted value is cleaned before persistence.
#[derive(Debug, Clone, Default)]
pub enum Sanitize {
    /// Type-driven default cleaning.
    #[default]
    Auto,
    /// No cleaning at all.
    None,
    /// A custom per-field sanitizer.
    With(SanitizeFn),
}

impl Sanitize {
    pub fn with(f: impl Fn(MetaValue) -> MetaValue + Send + Sync + 'static) -> Self {
        Sanitize::With(Hook(Arc::new(f)))
    }
}

impl Serialize for Sanitize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sanitize::Auto => serializer.serialize_str(""),
            Sanitize::None => serializer.serialize_str("none"),
            Sanitize::With(_) => serializer.serialize_str(""),
        }
    }
}
