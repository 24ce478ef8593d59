//! Selection shapes: single versus multiple.
//!
//! A control is built for one [`Mode`] and its two views of the selection
//! follow that cardinality:
//!
//! - [`Value`] - identifiers only (one optional id, or an ordered list)
//! - [`Data`] - full records, positionally paired with the value
//!
//! The value is always derivable from the data with [`Data::project`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, validate_item};

// ============================================================================
// Mode
// ============================================================================

/// Selection cardinality of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// At most one item is selected.
    #[default]
    Single,
    /// An ordered list of items is selected.
    Multiple,
}

impl Mode {
    /// The implementation name of this mode.
    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }

    /// The empty value for this mode.
    pub fn empty_value(self) -> Value {
        match self {
            Self::Single => Value::Single(None),
            Self::Multiple => Value::Multiple(Vec::new()),
        }
    }

    /// The empty data for this mode.
    pub fn empty_data(self) -> Data {
        match self {
            Self::Single => Data::Single(None),
            Self::Multiple => Data::Multiple(Vec::new()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            _ => Err(Error::UnknownImplementation(name.to_string())),
        }
    }
}

// ============================================================================
// Value
// ============================================================================

/// The identifier-only view of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The selected id of a single-select control, if any.
    Single(Option<ItemId>),
    /// The selected ids of a multi-select control, in selection order.
    Multiple(Vec<ItemId>),
}

impl Value {
    /// The mode this value belongs to.
    pub fn mode(&self) -> Mode {
        match self {
            Self::Single(_) => Mode::Single,
            Self::Multiple(_) => Mode::Multiple,
        }
    }

    /// The selected ids as a slice.
    pub fn ids(&self) -> &[ItemId] {
        match self {
            Self::Single(id) => id.as_slice(),
            Self::Multiple(ids) => ids,
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    /// Parse a raw value for the given mode.
    ///
    /// Single mode accepts `null` or one id; multiple mode accepts an array of
    /// ids (`null` is read as the empty list).
    pub fn from_json(mode: Mode, raw: &JsonValue) -> Result<Self> {
        match (mode, raw) {
            (Mode::Single, JsonValue::Null) => Ok(Self::Single(None)),
            (Mode::Single, JsonValue::Array(_)) => Err(Error::ModeMismatch { expected: mode }),
            (Mode::Single, raw) => Ok(Self::Single(Some(ItemId::try_from_json(raw)?))),
            (Mode::Multiple, JsonValue::Null) => Ok(Self::Multiple(Vec::new())),
            (Mode::Multiple, JsonValue::Array(raw_ids)) => raw_ids
                .iter()
                .map(ItemId::try_from_json)
                .collect::<Result<Vec<_>>>()
                .map(Self::Multiple),
            (Mode::Multiple, _) => Err(Error::ModeMismatch { expected: mode }),
        }
    }
}

// ============================================================================
// Data
// ============================================================================

/// The full-record view of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// The selected item of a single-select control, if any.
    Single(Option<Item>),
    /// The selected items of a multi-select control, in selection order.
    Multiple(Vec<Item>),
}

impl Data {
    /// The mode this data belongs to.
    pub fn mode(&self) -> Mode {
        match self {
            Self::Single(_) => Mode::Single,
            Self::Multiple(_) => Mode::Multiple,
        }
    }

    /// The selected items as a slice.
    pub fn items(&self) -> &[Item] {
        match self {
            Self::Single(item) => item.as_slice(),
            Self::Multiple(items) => items,
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Whether an item with this id is selected.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items().iter().any(|item| &item.id == id)
    }

    /// Project the records onto their ids.
    pub fn project(&self) -> Value {
        match self {
            Self::Single(item) => Value::Single(item.as_ref().map(|item| item.id.clone())),
            Self::Multiple(items) => {
                Value::Multiple(items.iter().map(|item| item.id.clone()).collect())
            }
        }
    }

    /// Trim a result set for display.
    ///
    /// Single selection shows every result. Multiple selection hides results
    /// that are already selected so they cannot be picked twice. The input is
    /// never modified.
    pub fn filter_results(&self, results: &[Item]) -> Vec<Item> {
        match self {
            Self::Single(_) => results.to_vec(),
            Self::Multiple(selected) => results
                .iter()
                .filter(|result| !selected.iter().any(|item| item.id == result.id))
                .cloned()
                .collect(),
        }
    }

    /// Parse and strictly validate raw data for the given mode.
    ///
    /// Single mode accepts `null` or one item record; multiple mode accepts an
    /// array of item records.
    pub fn from_json(mode: Mode, raw: &JsonValue) -> Result<Self> {
        match (mode, raw) {
            (Mode::Single, JsonValue::Null) => Ok(Self::Single(None)),
            (Mode::Single, JsonValue::Array(_)) => Err(Error::ModeMismatch { expected: mode }),
            (Mode::Single, raw) => Ok(Self::Single(Some(validate_item(raw)?))),
            (Mode::Multiple, JsonValue::Null) => Ok(Self::Multiple(Vec::new())),
            (Mode::Multiple, JsonValue::Array(raw_items)) => raw_items
                .iter()
                .map(validate_item)
                .collect::<Result<Vec<_>>>()
                .map(Self::Multiple),
            (Mode::Multiple, _) => Err(Error::ModeMismatch { expected: mode }),
        }
    }
}
