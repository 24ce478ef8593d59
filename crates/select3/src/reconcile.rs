//! Value/data reconciliation.
//!
//! The engine keeps two views of the selection in step. Setting data derives
//! the value by projection; setting a value has to find the matching records,
//! either synchronously from the local item set or asynchronously through an
//! `initSelection` resolver answering via a [`SelectionCallback`].

use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::item::{Item, ItemId};
use crate::selection::{Data, Mode, Value};

/// The paired value and data of a control.
///
/// The two may only diverge while an asynchronous resolution is in flight.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectionState {
    pub value: Value,
    pub data: Data,
}

impl SelectionState {
    pub fn new(mode: Mode) -> Self {
        Self {
            value: mode.empty_value(),
            data: mode.empty_data(),
        }
    }

    /// Store settled data and re-derive the value from it.
    pub fn install(&mut self, data: Data) {
        self.value = data.project();
        self.data = data;
    }

    /// Whether the data matches the value, i.e. no resolution is pending.
    pub fn is_settled(&self) -> bool {
        self.data.project() == self.value
    }

    /// The selected record for `id`, or a fabricated one while it is pending.
    pub fn record(&self, id: &ItemId) -> Item {
        self.data
            .items()
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .unwrap_or_else(|| Item::from_id(id.clone()))
    }
}

/// Find the records for a value in the local item set.
///
/// Ids without a local match (or every id, when there is no local set) get a
/// fabricated record labelled with the id itself.
pub fn resolve_locally(value: &Value, items: Option<&[Item]>) -> Data {
    let lookup = |id: &ItemId| {
        items
            .and_then(|items| items.iter().find(|item| &item.id == id))
            .cloned()
            .unwrap_or_else(|| Item::from_id(id.clone()))
    };

    match value {
        Value::Single(id) => Data::Single(id.as_ref().map(lookup)),
        Value::Multiple(ids) => Data::Multiple(ids.iter().map(lookup).collect()),
    }
}

/// Continuation handed to an `initSelection` resolver.
///
/// The resolver calls [`resolve`](Self::resolve) once, whenever its answer is
/// ready. Answers for a value that has since been superseded are dropped by
/// the engine without error.
pub struct SelectionCallback {
    mode: Mode,
    sink: Box<dyn FnOnce(Data) + Send>,
}

impl SelectionCallback {
    pub(crate) fn new<F>(mode: Mode, sink: F) -> Self
    where
        F: FnOnce(Data) + Send + 'static,
    {
        Self {
            mode,
            sink: Box::new(sink),
        }
    }

    /// The selection mode the answer must match.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Deliver the resolved records.
    pub fn resolve(self, data: Data) -> Result<()> {
        if data.mode() != self.mode {
            return Err(Error::ModeMismatch {
                expected: self.mode,
            });
        }
        (self.sink)(data);
        Ok(())
    }

    /// Deliver raw resolved records, validating each one first.
    pub fn resolve_json(self, raw: &JsonValue) -> Result<()> {
        let data = Data::from_json(self.mode, raw)?;
        self.resolve(data)
    }
}

impl fmt::Debug for SelectionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionCallback")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
