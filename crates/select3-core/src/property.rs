//! Reactive properties with change detection.
//!
//! A [`Property<T>`] wraps a value behind a lock and reports, on every write,
//! whether the value actually changed. Owners pair a property with a
//! [`Signal`](crate::Signal) and emit only when `set` returns `true`.
//!
//! # Example
//!
//! ```
//! use select3_core::{Property, Signal};
//!
//! struct Toggle {
//!     open: Property<bool>,
//!     open_changed: Signal<bool>,
//! }
//!
//! impl Toggle {
//!     fn set_open(&self, open: bool) {
//!         if self.open.set(open) {
//!             self.open_changed.emit(open);
//!         }
//!     }
//! }
//!
//! let toggle = Toggle { open: Property::new(false), open_changed: Signal::new() };
//! toggle.set_open(true);
//! assert!(toggle.open.get());
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A reactive property that tracks changes.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}
