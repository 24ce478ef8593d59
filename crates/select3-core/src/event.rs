//! Cancelable notifications.
//!
//! Some notifications are emitted *before* an action takes place so that
//! observers get a chance to veto it ("opening", "selecting"). The payload is
//! wrapped in a [`CancelableEvent`] whose "default prevented" flag is shared by
//! every clone handed to the connected slots.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::signal::Signal;

/// A notification payload that observers may cancel.
#[derive(Debug, Clone)]
pub struct CancelableEvent<T> {
    payload: T,
    prevented: Arc<AtomicBool>,
}

impl<T> CancelableEvent<T> {
    /// Create a new, not yet prevented, event.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            prevented: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The wrapped payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Cancel the action this event announces.
    pub fn prevent_default(&self) {
        self.prevented.store(true, Ordering::SeqCst);
    }

    /// Whether any observer cancelled the action.
    pub fn is_default_prevented(&self) -> bool {
        self.prevented.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<CancelableEvent<T>> {
    /// Emit a cancelable event and report whether the action may proceed.
    ///
    /// Returns `false` if any slot called
    /// [`prevent_default`](CancelableEvent::prevent_default). A blocked signal
    /// never cancels.
    pub fn emit_cancelable(&self, payload: T) -> bool {
        let event = CancelableEvent::new(payload);
        self.emit(event.clone());
        !event.is_default_prevented()
    }
}
