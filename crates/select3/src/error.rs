//! Error types for the selection engine.

use crate::selection::Mode;

/// Result type alias for selection engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the selection engine.
///
/// Every error is raised synchronously at the offending call and is fatal to
/// that call only; the instance stays usable. Stale asynchronous answers are
/// not errors and are discarded silently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An item record has the wrong shape.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// An identifier is neither a string nor a number.
    #[error("Invalid item id: {0}")]
    InvalidId(String),

    /// An option was given a value of the wrong type.
    #[error("Option '{option}' must be {expected}")]
    OptionType {
        option: String,
        expected: &'static str,
    },

    /// A value or data shape does not match the control's selection mode.
    #[error("Expected a value for {expected} selection")]
    ModeMismatch { expected: Mode },

    /// No template is registered under the requested name.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// No implementation is known under the requested name.
    #[error("Unknown implementation: {0}")]
    UnknownImplementation(String),

    /// A query callback received a response without an array of results.
    #[error("Malformed query response: {0}")]
    MalformedResponse(String),

    /// The instance was destroyed and no longer accepts mutations.
    #[error("The select instance has been destroyed")]
    Destroyed,
}

impl Error {
    /// Create an item shape error.
    pub fn invalid_item(message: impl Into<String>) -> Self {
        Self::InvalidItem(message.into())
    }

    /// Create an option type error.
    pub fn option_type(option: impl Into<String>, expected: &'static str) -> Self {
        Self::OptionType {
            option: option.into(),
            expected,
        }
    }

    /// Whether this is a caller input validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidItem(_)
                | Self::InvalidId(_)
                | Self::OptionType { .. }
                | Self::ModeMismatch { .. }
        )
    }

    /// Whether this reports a lookup of something that does not exist.
    pub fn is_unknown_capability(&self) -> bool {
        matches!(self, Self::UnknownTemplate(_) | Self::UnknownImplementation(_))
    }
}
