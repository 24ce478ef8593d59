//! Event payloads and the declarative event table.
//!
//! Outbound notifications are plain [`Signal`](select3_core::Signal)s on the
//! control; their payloads live here. Inbound events from the host (the
//! dropdown, the control's own input) are routed through an [`EventTable`]:
//! a list of `(kind, target filter) -> handler` bindings installed when the
//! control is built and cleared wholesale when it is destroyed.

use serde::Serialize;
use select3_core::CancelableEvent;

use crate::error::Result;
use crate::item::{Item, ItemId};
use crate::select::Select;
use crate::selection::Value;

// ============================================================================
// Outbound payloads
// ============================================================================

/// Payload of the `change` notification.
///
/// Serializes as `{"val": ..., "added"?: ..., "removed"?: ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// The value after the change.
    #[serde(rename = "val")]
    pub value: Value,
    /// The item added by an incremental change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<Item>,
    /// The item removed by an incremental change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<Item>,
}

impl ChangeEvent {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            added: None,
            removed: None,
        }
    }

    pub(crate) fn with_added(mut self, item: Option<Item>) -> Self {
        self.added = item;
        self
    }

    pub(crate) fn with_removed(mut self, item: Option<Item>) -> Self {
        self.removed = item;
        self
    }
}

/// Payload of `select3-opening`; preventing it keeps the control closed.
pub type OpeningEvent = CancelableEvent<()>;

/// Payload of `select3-selecting`; preventing it rejects the pick.
pub type SelectingEvent = CancelableEvent<Item>;

// ============================================================================
// Inbound events
// ============================================================================

/// Kinds of inbound host events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A result was picked.
    Selected,
    /// A selected item should be removed.
    Removed,
    /// The search input changed.
    SearchInput,
    /// The dropdown reported that it closed.
    Closed,
}

/// Where an inbound event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// The live dropdown session.
    Dropdown,
    /// The control's own input element.
    Input,
    /// Anything else in the host.
    Host,
}

/// Which sources a binding accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFilter {
    /// Events from any source.
    Any,
    /// Events from one source only.
    Only(EventSource),
}

impl TargetFilter {
    /// Whether an event from `source` passes this filter.
    pub fn accepts(self, source: EventSource) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => only == source,
        }
    }
}

/// An inbound host event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A result was picked.
    Selected(Item),
    /// A selected item should be removed.
    Removed(ItemId),
    /// The search input now holds this term.
    SearchInput(String),
    /// The dropdown is gone.
    Closed,
}

impl HostEvent {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Selected(_) => EventKind::Selected,
            Self::Removed(_) => EventKind::Removed,
            Self::SearchInput(_) => EventKind::SearchInput,
            Self::Closed => EventKind::Closed,
        }
    }
}

/// Outcome of routing an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A binding handled the event.
    Handled,
    /// No binding matched (or the control is gone).
    Ignored,
}

// ============================================================================
// Event Table
// ============================================================================

/// Handler invoked for a matching binding.
pub type EventHandler = fn(&Select, HostEvent) -> Result<()>;

#[derive(Clone, Copy)]
struct Binding {
    kind: EventKind,
    filter: TargetFilter,
    handler: EventHandler,
}

/// Declarative `(kind, filter) -> handler` bindings.
///
/// The first binding whose kind matches and whose filter accepts the source
/// wins.
#[derive(Clone, Default)]
pub struct EventTable {
    bindings: Vec<Binding>,
}

impl EventTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bindings every control starts with.
    pub fn standard() -> Self {
        Self::new()
            .with_binding(
                EventKind::Selected,
                TargetFilter::Only(EventSource::Dropdown),
                |select, event| match event {
                    HostEvent::Selected(item) => select.select_item(item).map(drop),
                    _ => Ok(()),
                },
            )
            .with_binding(EventKind::Removed, TargetFilter::Any, |select, event| {
                match event {
                    HostEvent::Removed(id) => select.remove(&id).map(drop),
                    _ => Ok(()),
                }
            })
            .with_binding(EventKind::SearchInput, TargetFilter::Any, |select, event| {
                if let HostEvent::SearchInput(term) = event {
                    select.search(&term);
                }
                Ok(())
            })
            .with_binding(
                EventKind::Closed,
                TargetFilter::Only(EventSource::Dropdown),
                |select, _| {
                    select.session_closed();
                    Ok(())
                },
            )
    }

    /// Add a binding.
    pub fn bind(&mut self, kind: EventKind, filter: TargetFilter, handler: EventHandler) {
        self.bindings.push(Binding {
            kind,
            filter,
            handler,
        });
    }

    /// Add a binding using builder pattern.
    pub fn with_binding(
        mut self,
        kind: EventKind,
        filter: TargetFilter,
        handler: EventHandler,
    ) -> Self {
        self.bind(kind, filter, handler);
        self
    }

    /// Find the handler for an event of `kind` from `source`.
    pub fn lookup(&self, kind: EventKind, source: EventSource) -> Option<EventHandler> {
        self.bindings
            .iter()
            .find(|binding| binding.kind == kind && binding.filter.accepts(source))
            .map(|binding| binding.handler)
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.bindings
                    .iter()
                    .map(|binding| (binding.kind, binding.filter)),
            )
            .finish()
    }
}
