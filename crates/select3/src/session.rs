//! Dropdown session coordination.
//!
//! A control owns at most one open search session at a time. The session
//! object itself comes from a [`DropdownFactory`] supplied at construction and
//! handles all presentation; the coordinator only tracks whether one is live
//! and forwards results and positioning requests to it.
//!
//! Closing is always confirmed by the dropdown: [`Dropdown::close`] asks it to
//! go away, and the dropdown answers through [`DropdownContext::closed`] once
//! it has. Only that answer moves the coordinator back to
//! [`SessionState::Closed`], whatever triggered the close.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use select3_core::Property;
use select3_core::logging::targets;

use crate::error::Result;
use crate::events::{DispatchResult, EventSource, HostEvent};
use crate::item::{Item, ItemId};
use crate::select::SelectHandle;

/// Pagination metadata passed along with results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultsMeta {
    /// Whether the source has more results past these.
    pub has_more: bool,
}

/// A live dropdown/search session.
///
/// Implementations are presentation objects; they hold no selection state.
pub trait Dropdown: Send + Sync {
    /// Display a (filtered) result set.
    fn show_results(&self, results: &[Item], meta: ResultsMeta);

    /// Re-position relative to the control.
    fn position(&self);

    /// Dismiss the session.
    ///
    /// The dropdown must report back through [`DropdownContext::closed`] once
    /// it is gone, synchronously or later.
    fn close(&self);
}

/// Creates a dropdown for a new session.
pub type DropdownFactory = Arc<dyn Fn(DropdownContext) -> Arc<dyn Dropdown> + Send + Sync>;

/// The link from a dropdown back to the control that opened it.
#[derive(Debug, Clone)]
pub struct DropdownContext {
    handle: SelectHandle,
}

impl DropdownContext {
    pub(crate) fn new(handle: SelectHandle) -> Self {
        Self { handle }
    }

    /// A weak handle to the owning control.
    pub fn handle(&self) -> &SelectHandle {
        &self.handle
    }

    /// Report that the dropdown has been dismissed.
    pub fn closed(&self) -> Result<DispatchResult> {
        self.handle.dispatch(EventSource::Dropdown, HostEvent::Closed)
    }

    /// Report that the user picked a result.
    pub fn selected(&self, item: Item) -> Result<DispatchResult> {
        self.handle
            .dispatch(EventSource::Dropdown, HostEvent::Selected(item))
    }

    /// Report that the user typed into the dropdown's search input.
    pub fn search(&self, term: impl Into<String>) -> Result<DispatchResult> {
        self.handle
            .dispatch(EventSource::Dropdown, HostEvent::SearchInput(term.into()))
    }

    /// Report that the user asked to deselect an item.
    pub fn removed(&self, id: ItemId) -> Result<DispatchResult> {
        self.handle
            .dispatch(EventSource::Dropdown, HostEvent::Removed(id))
    }
}

/// Whether a session is live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session exists.
    #[default]
    Closed,
    /// A session is live.
    Open,
}

/// What the coordinator currently holds.
enum Slot {
    Idle,
    /// The factory is running; `closed` records a close report made meanwhile.
    Starting { closed: bool },
    Live(Arc<dyn Dropdown>),
}

/// Owns the (at most one) live session of a control.
pub(crate) struct SessionCoordinator {
    factory: Option<DropdownFactory>,
    state: Property<SessionState>,
    slot: Mutex<Slot>,
}

impl SessionCoordinator {
    pub fn new(factory: Option<DropdownFactory>) -> Self {
        Self {
            factory,
            state: Property::new(SessionState::Closed),
            slot: Mutex::new(Slot::Idle),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Create and install a new session.
    ///
    /// Returns `false` when no dropdown factory is configured, when a session
    /// already exists or is being created, or when the new dropdown reported
    /// closing before construction finished.
    pub fn start(&self, context: DropdownContext) -> bool {
        let Some(factory) = &self.factory else {
            tracing::warn!(target: targets::SESSION, "cannot open: no dropdown factory configured");
            return false;
        };

        {
            let mut slot = self.slot.lock();
            if !matches!(*slot, Slot::Idle) {
                tracing::trace!(target: targets::SESSION, "session already exists");
                return false;
            }
            *slot = Slot::Starting { closed: false };
        }

        let dropdown = factory(context);

        let mut slot = self.slot.lock();
        match std::mem::replace(&mut *slot, Slot::Idle) {
            Slot::Starting { closed: false } => {
                *slot = Slot::Live(dropdown);
                drop(slot);
                self.state.set(SessionState::Open);
                tracing::debug!(target: targets::SESSION, "session opened");
                true
            }
            Slot::Starting { closed: true } => {
                tracing::debug!(target: targets::SESSION, "session closed while opening");
                false
            }
            // Torn down while the factory ran.
            previous => {
                *slot = previous;
                drop(slot);
                tracing::debug!(target: targets::SESSION, "session torn down while opening");
                dropdown.close();
                false
            }
        }
    }

    fn live(&self) -> Option<Arc<dyn Dropdown>> {
        match &*self.slot.lock() {
            Slot::Live(dropdown) => Some(dropdown.clone()),
            Slot::Idle | Slot::Starting { .. } => None,
        }
    }

    pub fn show_results(&self, results: &[Item], meta: ResultsMeta) {
        match self.live() {
            Some(dropdown) => dropdown.show_results(results, meta),
            None => tracing::trace!(
                target: targets::SESSION,
                count = results.len(),
                "session closed, dropping results"
            ),
        }
    }

    pub fn position(&self) {
        if let Some(dropdown) = self.live() {
            dropdown.position();
        }
    }

    /// Ask the live session to close; the state changes only once it reports back.
    pub fn request_close(&self) {
        if let Some(dropdown) = self.live() {
            tracing::trace!(target: targets::SESSION, "requesting session close");
            dropdown.close();
        }
    }

    /// Drop the live session after it reported closing.
    ///
    /// Returns `true` if a session was actually live. A report made while the
    /// session is still being created is remembered and cancels the open.
    pub fn finish_close(&self) -> bool {
        let mut slot = self.slot.lock();
        match &mut *slot {
            Slot::Live(_) => {}
            Slot::Starting { closed } => {
                *closed = true;
                return false;
            }
            Slot::Idle => return false,
        }
        *slot = Slot::Idle;
        drop(slot);

        self.state.set(SessionState::Closed);
        tracing::debug!(target: targets::SESSION, "session closed");
        true
    }

    /// Forget the live session without waiting for it, returning it.
    pub fn teardown(&self) -> Option<Arc<dyn Dropdown>> {
        let previous = std::mem::replace(&mut *self.slot.lock(), Slot::Idle);
        self.state.set(SessionState::Closed);
        match previous {
            Slot::Live(dropdown) => Some(dropdown),
            Slot::Idle | Slot::Starting { .. } => None,
        }
    }
}

impl fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("has_factory", &self.factory.is_some())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDropdown {
        shown: AtomicUsize,
        closes: AtomicUsize,
    }

    impl Dropdown for CountingDropdown {
        fn show_results(&self, _results: &[Item], _meta: ResultsMeta) {
            self.shown.fetch_add(1, Ordering::SeqCst);
        }

        fn position(&self) {}

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn coordinator() -> (SessionCoordinator, Arc<CountingDropdown>) {
        let dropdown = Arc::new(CountingDropdown::default());
        let shared = dropdown.clone();
        let factory: DropdownFactory = Arc::new(move |_ctx| shared.clone() as Arc<dyn Dropdown>);
        (SessionCoordinator::new(Some(factory)), dropdown)
    }

    fn context() -> DropdownContext {
        DropdownContext::new(SelectHandle::dangling())
    }

    #[test]
    fn test_start_and_finish() {
        let (session, _dropdown) = coordinator();
        assert_eq!(session.state(), SessionState::Closed);

        assert!(session.start(context()));
        assert!(session.is_open());

        assert!(session.finish_close());
        assert!(!session.is_open());
        assert!(!session.finish_close());
    }

    #[test]
    fn test_request_close_waits_for_confirmation() {
        let (session, dropdown) = coordinator();
        session.start(context());

        session.request_close();
        assert_eq!(dropdown.closes.load(Ordering::SeqCst), 1);
        assert!(session.is_open());
    }

    #[test]
    fn test_results_dropped_when_closed() {
        let (session, dropdown) = coordinator();
        session.show_results(&[Item::new(1, "One")], ResultsMeta::default());
        assert_eq!(dropdown.shown.load(Ordering::SeqCst), 0);

        session.start(context());
        session.show_results(&[Item::new(1, "One")], ResultsMeta::default());
        assert_eq!(dropdown.shown.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_start_refuses_second_session() {
        let (session, _dropdown) = coordinator();
        assert!(session.start(context()));
        assert!(!session.start(context()));
        assert!(session.is_open());
    }

    #[test]
    fn test_nested_start_during_construction_is_refused() {
        let nested = Arc::new(Mutex::new(None));
        let nested_clone = nested.clone();
        let created = Arc::new(AtomicUsize::new(0));
        let created_clone = created.clone();
        let session = Arc::new_cyclic(|weak: &std::sync::Weak<SessionCoordinator>| {
            let weak = weak.clone();
            let factory: DropdownFactory = Arc::new(move |_ctx| {
                created_clone.fetch_add(1, Ordering::SeqCst);
                if let Some(session) = weak.upgrade() {
                    *nested_clone.lock() = Some(session.start(context()));
                }
                Arc::new(CountingDropdown::default()) as Arc<dyn Dropdown>
            });
            SessionCoordinator::new(Some(factory))
        });

        assert!(session.start(context()));
        assert_eq!(*nested.lock(), Some(false));
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_reported_during_construction() {
        let session = Arc::new_cyclic(|weak: &std::sync::Weak<SessionCoordinator>| {
            let weak = weak.clone();
            let factory: DropdownFactory = Arc::new(move |_ctx| {
                if let Some(session) = weak.upgrade() {
                    assert!(!session.finish_close());
                }
                Arc::new(CountingDropdown::default()) as Arc<dyn Dropdown>
            });
            SessionCoordinator::new(Some(factory))
        });

        assert!(!session.start(context()));
        assert!(!session.is_open());
        assert!(session.live().is_none());
    }

    #[test]
    fn test_start_without_factory() {
        let session = SessionCoordinator::new(None);
        assert!(!session.start(context()));
        assert!(!session.is_open());
    }

    #[test]
    fn test_context_on_dropped_control_is_ignored() {
        let ctx = context();
        assert_eq!(ctx.closed().unwrap(), DispatchResult::Ignored);
    }
}
