//! Generation-counter staleness guard.
//!
//! Asynchronous collaborators (remote queries, selection resolvers) answer
//! through fire-once continuations that cannot be cancelled once handed out.
//! Rather than cancelling them, the owner issues a [`Ticket`] when it starts an
//! operation and checks the ticket before applying the answer. Starting a newer
//! operation supersedes every ticket issued before it, so late answers become
//! harmless.
//!
//! # Example
//!
//! ```
//! use select3_core::StalenessGuard;
//!
//! let guard = StalenessGuard::new();
//! let first = guard.begin();
//! let second = guard.begin();
//!
//! assert!(!first.is_current());
//! assert!(second.is_current());
//!
//! guard.invalidate();
//! assert!(!second.is_current());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues tickets and tracks which one is current.
///
/// Cloning the guard shares the underlying generation counter.
#[derive(Debug, Clone, Default)]
pub struct StalenessGuard {
    current: Arc<AtomicU64>,
}

impl StalenessGuard {
    /// Create a guard with no outstanding operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Supersede every outstanding ticket without starting a new operation.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// The current generation number.
    pub fn generation(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Proof that an operation was started at a given generation.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl Ticket {
    /// Whether no newer operation has started since this ticket was issued.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    /// The generation this ticket was issued at.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
