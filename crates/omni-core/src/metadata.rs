//! Open note metadata: a mapping from string keys to a small union of value
//! types.
//!
//! All type-specific note fields (url, solution, severity, attendees, ...)
//! live in this mapping instead of dedicated columns, so adding a note type
//! never requires a schema change. The union keeps the mapping type-safe
//! while staying extensible.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

/// A single metadata value.
///
/// Serialized untagged, so the stored/wire form is plain JSON scalars and
/// string arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value (confidence scores, counters).
    Number(f64),
    /// Free text (urls, solutions, status labels, dates).
    Text(String),
    /// List of strings (attendees).
    List(Vec<String>),
}

impl MetadataValue {
    /// Text content, if this value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content, if this value is a flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String-list content, if this value is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// The open metadata mapping carried by every note.
pub type Metadata = HashMap<String, MetadataValue>;

/// Well-known metadata keys written by the note forms.
///
/// The mapping is open; these are the keys the built-in note types use.
pub mod keys {
    /// Link/video target URL.
    pub const URL: &str = "url";
    /// Problem resolution text.
    pub const SOLUTION: &str = "solution";
    /// Problem severity label.
    pub const SEVERITY: &str = "severity";
    /// Problem status label.
    pub const STATUS: &str = "status";
    /// Environment a problem occurred in.
    pub const ENVIRONMENT: &str = "environment";
    /// Where a lesson/video came from.
    pub const SOURCE: &str = "source";
    /// Meeting attendee names.
    pub const ATTENDEES: &str = "attendees";
    /// Meeting date/time.
    pub const MEETING_DATE: &str = "meetingDate";
    /// General-note sub-type (idea or checklist).
    pub const SUB_TYPE: &str = "subType";
    /// General-note priority.
    pub const PRIORITY: &str = "priority";
    /// Lesson confidence score.
    pub const CONFIDENCE: &str = "confidence";
    /// Note accent color.
    pub const THEME_COLOR: &str = "themeColor";
}

/// Convert an arbitrary JSON value into a metadata mapping.
///
/// Tolerant by design: a non-object input yields an empty mapping, and keys
/// whose values do not fit [`MetadataValue`] are dropped rather than failing
/// the whole conversion. Used when decoding the remote `metadataJson` field,
/// which may carry shapes written by other clients.
pub fn metadata_from_json(value: JsonValue) -> Metadata {
    let JsonValue::Object(map) = value else {
        return Metadata::new();
    };

    let mut out = Metadata::new();
    for (key, val) in map {
        match json_to_value(val) {
            Some(v) => {
                out.insert(key, v);
            }
            None => {
                debug!(key = %key, "dropping metadata value with unsupported shape");
            }
        }
    }
    out
}

/// Convert a metadata mapping back to a JSON object.
pub fn metadata_to_json(metadata: &Metadata) -> JsonValue {
    let mut map = serde_json::Map::new();
    for (key, val) in metadata {
        let json = match val {
            MetadataValue::Bool(b) => JsonValue::Bool(*b),
            MetadataValue::Number(n) => serde_json::json!(n),
            MetadataValue::Text(s) => JsonValue::String(s.clone()),
            MetadataValue::List(items) => serde_json::json!(items),
        };
        map.insert(key.clone(), json);
    }
    JsonValue::Object(map)
}

fn json_to_value(val: JsonValue) -> Option<MetadataValue> {
    match val {
        JsonValue::Bool(b) => Some(MetadataValue::Bool(b)),
        JsonValue::Number(n) => n.as_f64().map(MetadataValue::Number),
        JsonValue::String(s) => Some(MetadataValue::Text(s)),
        JsonValue::Array(items) => {
            let strings: Option<Vec<String>> = items
                .into_iter()
                .map(|item| match item {
                    JsonValue::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            strings.map(MetadataValue::List)
        }
        // Nulls and nested objects have no typed representation.
        JsonValue::Null | JsonValue::Object(_) => None,
    }
}

/// Look up a text value by key.
pub fn text_value<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(MetadataValue::as_text)
}

/// Look up a string-list value by key.
pub fn list_value<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a [String]> {
    metadata.get(key).and_then(MetadataValue::as_list)
}

/// Look up a numeric value by key.
pub fn number_value(metadata: &Metadata, key: &str) -> Option<f64> {
    metadata.get(key).and_then(MetadataValue::as_number)
}
