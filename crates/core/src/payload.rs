//! Backend payload shapes
//!
//! The backend wraps everything as
//! `{data, meta?, message?, error?, messages?}`. Records are read leniently:
//! every field is optional, a field of the wrong type reads as absent, and an
//! entry that is not an object renders as an empty row instead of failing the
//! whole fragment.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Record identifier, numeric or textual depending on the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub due_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub assigned_to: Option<RecordId>,
}

/// Field of the expected type, or `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Pagination block attached to list payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageMeta {
    /// Meta describing a single page holding `len` records
    pub const fn single_page(len: u64) -> Self {
        Self {
            page: 1,
            per_page: len,
            total: len,
        }
    }
}

/// The `data` array of a list payload, or nothing
pub fn data_array(payload: &Value) -> &[Value] {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Deserialize each entry of the `data` array, defaulting the ones that do not fit
pub fn records<T: DeserializeOwned + Default>(payload: &Value) -> Vec<T> {
    data_array(payload)
        .iter()
        .map(record)
        .collect()
}

/// Deserialize a single record, defaulting on mismatch
pub fn record<T: DeserializeOwned + Default>(value: &Value) -> T {
    T::deserialize(value).unwrap_or_else(|e| {
        tracing::debug!("Record does not match expected shape: {e}");
        T::default()
    })
}

/// Pagination meta, or a single page sized to the collection when absent
pub fn meta_or_single_page(payload: &Value, len: usize) -> PageMeta {
    payload
        .get("meta")
        .filter(|meta| !meta.is_null())
        .and_then(|meta| PageMeta::deserialize(meta).ok())
        .unwrap_or_else(|| PageMeta::single_page(len as u64))
}

/// Non-empty top-level `message`
pub fn message(payload: &Value) -> Option<&str> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}

/// Whether the payload flags itself as an error
///
/// The backend sends either `true` or an error code string.
pub fn has_error_flag(payload: &Value) -> bool {
    payload.get("error").is_some_and(is_truthy)
}

/// Field-level messages, each coalesced into a list
pub fn field_messages(payload: &Value) -> Vec<(String, Vec<String>)> {
    let Some(messages) = payload.get("messages").and_then(Value::as_object) else {
        return Vec::new();
    };

    messages
        .iter()
        .map(|(field, errors)| {
            let errors = match errors {
                Value::Array(items) => items.iter().map(display_value).collect(),
                other => vec![display_value(other)],
            };
            (field.clone(), errors)
        })
        .collect()
}

/// String form of a JSON value the way a template would print it
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
