//! select3 - a headless selection-box engine.
//!
//! The engine owns everything about a selection control except its
//! presentation:
//!
//! - **Items**: normalization and validation of `{id, text}` records
//! - **Selection**: single and multiple cardinality, value/data reconciliation
//! - **Search**: local filtering or remote queries, with stale answers dropped
//! - **Sessions**: one dropdown at a time, supplied by the host
//! - **Events**: cancelable notifications and a declarative inbound event table
//!
//! Rendering is left to a [`Dropdown`](session::Dropdown) implementation the
//! host provides; the engine hands it filtered results and templates.
//!
//! # Example
//!
//! ```
//! use select3::prelude::*;
//!
//! let select = Select::from_json(&serde_json::json!({
//!     "multiple": true,
//!     "items": [{"id": 1, "text": "Foo"}, {"id": 2, "text": "Bar"}],
//! }))
//! .unwrap();
//!
//! select.signals().change.connect(|event| {
//!     println!("value is now {:?}", event.value);
//! });
//!
//! select.set_value_json(&serde_json::json!([1])).unwrap();
//! assert_eq!(select.data().items(), &[Item::new(1, "Foo")]);
//! ```

pub mod error;
pub mod events;
pub mod item;
pub mod options;
pub mod prelude;
pub mod reconcile;
pub mod search;
pub mod select;
pub mod selection;
pub mod session;
pub mod template;

pub use error::{Error, Result};
pub use events::{ChangeEvent, DispatchResult, EventKind, EventSource, HostEvent, TargetFilter};
pub use item::{Item, ItemId};
pub use options::{Config, SelectOptions};
pub use select::{Select, SelectBuilder, SelectHandle, SelectSignals};
pub use selection::{Data, Mode, Value};
pub use session::{Dropdown, DropdownContext, ResultsMeta, SessionState};
pub use select3_core::{CancelableEvent, ConnectionId, Signal};
