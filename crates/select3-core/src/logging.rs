//! Logging facilities for select3.
//!
//! select3 uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] so subsystems can be
//! filtered individually, e.g. `RUST_LOG=select3::search=trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "select3_core::signal";
    /// Selection engine target.
    pub const SELECT: &str = "select3";
    /// Option validation and application.
    pub const OPTIONS: &str = "select3::options";
    /// Value/data reconciliation.
    pub const RECONCILE: &str = "select3::reconcile";
    /// Search dispatch (local filtering and remote queries).
    pub const SEARCH: &str = "select3::search";
    /// Dropdown session lifecycle.
    pub const SESSION: &str = "select3::session";
    /// Host event dispatch.
    pub const EVENTS: &str = "select3::events";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "select3::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic
        let _span = PerfSpan::new("test_operation");
    }
}
