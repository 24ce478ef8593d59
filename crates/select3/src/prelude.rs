//! Prelude module for select3.
//!
//! ```ignore
//! use select3::prelude::*;
//! ```

// ============================================================================
// Control
// ============================================================================

pub use crate::select::{Select, SelectBuilder, SelectHandle};
pub use crate::options::SelectOptions;
pub use crate::error::{Error, Result};

// ============================================================================
// Items & Selection
// ============================================================================

pub use crate::item::{Item, ItemId};
pub use crate::selection::{Data, Mode, Value};

// ============================================================================
// Collaborators
// ============================================================================

pub use crate::reconcile::SelectionCallback;
pub use crate::search::{QueryCallback, QueryRequest, QueryResponse};
pub use crate::session::{Dropdown, DropdownContext, ResultsMeta};
pub use crate::template::Template;

// ============================================================================
// Events
// ============================================================================

pub use crate::events::{ChangeEvent, DispatchResult, EventSource, HostEvent};
pub use select3_core::{CancelableEvent, Signal};
