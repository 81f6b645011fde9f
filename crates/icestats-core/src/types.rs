//! Core types for icestats-core.
//!
//! This module defines the vocabulary shared by both decoders: the typed
//! [`Value`] a field normalises to, the [`FeedEvent`] produced for every line
//! of the stats feed, and the [`EntityRecord`] produced for every completed
//! server / source / listener element of a stats document.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::normalizer::normalize_name;
use crate::schema;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// An integer field value.
///
/// Integer coercion never fails a decode. Text that does not start with a
/// base-10 number (or overflows `i64`) becomes [`Integer::NaN`], which
/// serialises as the string `"NaN"` so it stays distinct from an unset
/// (`null`) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integer {
    Finite(i64),
    NaN,
}

impl Serialize for Integer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Integer::Finite(n) => serializer.serialize_i64(*n),
            Integer::NaN => serializer.serialize_str("NaN"),
        }
    }
}

impl Integer {
    /// The parsed number, or `None` for [`Integer::NaN`].
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Integer::Finite(n) => Some(n),
            Integer::NaN => None,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Integer::NaN)
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        Integer::Finite(n)
    }
}

impl std::fmt::Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Integer::Finite(n) => write!(f, "{n}"),
            Integer::NaN => write!(f, "NaN"),
        }
    }
}

/// A normalised field value.
///
/// Which variant a field produces is decided by its canonical name alone, see
/// [`normalize_data`](crate::normalizer::normalize_data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(Integer),
    String(String),
    /// The `audioInfo` composite (`channels=2;samplerate=44100;bitrate=64`).
    Mapping(BTreeMap<String, Integer>),
}

impl Value {
    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Integer>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(Integer::Finite(n))
    }
}

impl From<Integer> for Value {
    fn from(n: Integer) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

// ---------------------------------------------------------------------------
// Feed events
// ---------------------------------------------------------------------------

/// Whether a feed event describes the whole server or a single mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Server,
    Mount,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Server => write!(f, "server"),
            Scope::Mount => write!(f, "mount"),
        }
    }
}

/// One decoded line of the stats feed.
///
/// The scope is derived from the mount: an event carries a mount if and only
/// if it is mount-scoped. `data` is `None` for payload-less events
/// (`delete`, `flush`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    pub data: Option<Value>,
}

impl FeedEvent {
    /// Build an event for `field`, prefixing `mount.` or `server.` depending on
    /// whether a mount is present.
    pub fn new(field: &str, mount: Option<String>, data: Option<Value>) -> Self {
        let scope = if mount.is_some() { Scope::Mount } else { Scope::Server };
        Self {
            name: format!("{scope}.{field}"),
            mount,
            data,
        }
    }

    pub fn scope(&self) -> Scope {
        if self.mount.is_some() {
            Scope::Mount
        } else {
            Scope::Server
        }
    }

    /// Event name without its scope prefix (`bitrate` for `mount.bitrate`).
    pub fn field(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(_, field)| field)
            .unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Stats entities
// ---------------------------------------------------------------------------

/// The three record shapes produced by the stats document decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Server,
    Source,
    Listener,
}

impl EntityKind {
    /// Raw element names collected for this kind, in schema order.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            EntityKind::Server => schema::SERVER_TAGS,
            EntityKind::Source => schema::SOURCE_TAGS,
            EntityKind::Listener => schema::LISTENER_TAGS,
        }
    }

    /// Whether records of this kind carry the enclosing source's mount.
    pub fn has_mount(self) -> bool {
        !matches!(self, EntityKind::Server)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Server => write!(f, "server"),
            EntityKind::Source => write!(f, "source"),
            EntityKind::Listener => write!(f, "listener"),
        }
    }
}

/// Name of the field holding a source / listener's mount point.
pub const MOUNT_FIELD: &str = "mount";

/// A completed (or in-progress) server, source or listener record.
///
/// Every canonical field of the kind is present from construction onwards,
/// holding `None` until the document supplies a value, so consumers can rely
/// on a stable key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    kind: EntityKind,
    fields: BTreeMap<String, Option<Value>>,
}

impl EntityRecord {
    /// A record with every field of `kind` set to `None`.
    pub fn new(kind: EntityKind) -> Self {
        let fields = kind
            .tags()
            .iter()
            .map(|tag| (normalize_name(tag), None))
            .collect();
        Self { kind, fields }
    }

    /// A source or listener record whose `mount` field is pre-set.
    pub fn with_mount(kind: EntityKind, mount: Option<&str>) -> Self {
        let mut record = Self::new(kind);
        if kind.has_mount() {
            record.fields.insert(
                MOUNT_FIELD.to_string(),
                mount.map(|m| Value::String(m.to_string())),
            );
        }
        record
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Value of `name`, or `None` when unset or not part of the schema.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` is part of this record's key set (set or not).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.fields.insert(name.into(), value);
    }

    pub fn mount(&self) -> Option<&str> {
        self.get(MOUNT_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for EntityRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
