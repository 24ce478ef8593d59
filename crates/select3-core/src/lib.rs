//! Core primitives for select3.
//!
//! This crate provides the building blocks the selection engine is made of,
//! none of which know anything about items or selections:
//!
//! - **Signal/Slot System**: Type-safe notification of observers
//! - **Cancelable Events**: Notifications observers may veto
//! - **Property System**: Values with change detection
//! - **Staleness Guard**: Generation tickets that make late async answers harmless
//! - **Logging**: Tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use select3_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Cancelable Example
//!
//! ```
//! use select3_core::{CancelableEvent, Signal};
//!
//! let opening = Signal::<CancelableEvent<()>>::new();
//! opening.connect(|event| event.prevent_default());
//!
//! assert!(!opening.emit_cancelable(()));
//! ```

pub mod event;
pub mod logging;
pub mod property;
pub mod signal;
pub mod staleness;

pub use event::CancelableEvent;
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionId, Signal, SignalEmitter};
pub use staleness::{StalenessGuard, Ticket};
