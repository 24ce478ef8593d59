//! Items: the records a selection is made of.
//!
//! An [`Item`] pairs an identifier with a display label. Identifiers are
//! either strings or numbers ([`ItemId`]) and identity is strict: the number
//! `1` and the string `"1"` are different items.
//!
//! Raw input arriving from dynamic sources (option maps, query responses,
//! selection resolvers) is a [`serde_json::Value`] and goes through
//! [`normalize`] or [`validate_item`] before the engine accepts it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

use crate::error::{Error, Result};

// ============================================================================
// Item Id
// ============================================================================

/// The identifier of an item: a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// A numeric identifier.
    Number(Number),
    /// A string identifier.
    Text(String),
}

impl ItemId {
    /// Interpret a raw value as an identifier.
    ///
    /// Returns `None` unless the value is a string or a number.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(text) => Some(Self::Text(text.clone())),
            JsonValue::Number(number) => Some(Self::Number(number.clone())),
            _ => None,
        }
    }

    /// Interpret a raw value as an identifier, failing on any other type.
    pub fn try_from_json(value: &JsonValue) -> Result<Self> {
        Self::from_json(value).ok_or_else(|| Error::InvalidId(value.to_string()))
    }

    /// The raw representation of this identifier.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Number(number) => JsonValue::Number(number.clone()),
            Self::Text(text) => JsonValue::String(text.clone()),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ItemId {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ItemId {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for ItemId {
    fn from(number: i64) -> Self {
        Self::Number(number.into())
    }
}

impl From<i32> for ItemId {
    fn from(number: i32) -> Self {
        Self::Number(number.into())
    }
}

impl From<u64> for ItemId {
    fn from(number: u64) -> Self {
        Self::Number(number.into())
    }
}

// ============================================================================
// Item
// ============================================================================

/// A selectable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// The unique identifier.
    pub id: ItemId,
    /// The display label.
    pub text: String,
}

impl Item {
    /// Create a new item.
    pub fn new(id: impl Into<ItemId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Create an item whose label is its identifier.
    pub fn from_id(id: impl Into<ItemId>) -> Self {
        let id = id.into();
        let text = id.to_string();
        Self { id, text }
    }

    /// The raw representation of this item.
    pub fn to_json(&self) -> JsonValue {
        serde_json::json!({ "id": self.id.to_json(), "text": self.text })
    }
}

impl From<ItemId> for Item {
    fn from(id: ItemId) -> Self {
        Self::from_id(id)
    }
}

impl From<&str> for Item {
    fn from(id: &str) -> Self {
        Self::from_id(id)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Whether a raw value may serve as an item identifier.
///
/// True for strings and numbers; false for booleans, objects, arrays and null.
pub fn is_valid_id(value: &JsonValue) -> bool {
    matches!(value, JsonValue::String(_) | JsonValue::Number(_))
}

/// Coerce raw input into an item.
///
/// A bare identifier becomes `{id, text: id}`. An object with a valid `id`
/// field is taken as an item record. Anything else is rejected.
///
/// Normalization is idempotent: normalizing the raw form of a normalized item
/// yields the same item.
pub fn normalize(raw: &JsonValue) -> Result<Item> {
    if let Some(id) = ItemId::from_json(raw) {
        return Ok(Item::from_id(id));
    }
    match raw {
        JsonValue::Object(fields) if fields.get("id").is_some_and(is_valid_id) => {
            validate_item(raw)
        }
        _ => Err(Error::invalid_item(format!(
            "expected an id or an object with a valid id, got {raw}"
        ))),
    }
}

/// Strictly validate an item record.
///
/// Fails unless `raw` is an object whose `id` is a valid identifier and whose
/// `text` is a string.
pub fn validate_item(raw: &JsonValue) -> Result<Item> {
    let JsonValue::Object(fields) = raw else {
        return Err(Error::invalid_item(format!("expected an object, got {raw}")));
    };

    let id = fields
        .get("id")
        .and_then(ItemId::from_json)
        .ok_or_else(|| Error::invalid_item(format!("id must be a string or a number in {raw}")))?;

    let text = match fields.get("text") {
        Some(JsonValue::String(text)) => text.clone(),
        _ => return Err(Error::invalid_item(format!("text must be a string in {raw}"))),
    };

    Ok(Item { id, text })
}
