//! Dispatch error types.

use std::fmt;

/// Error produced while executing a resolved handler.
#[derive(Debug)]
pub enum HandlerError {
    /// The normalized parameters could not be deserialized into the
    /// handler's request type.
    Deserialization(String),

    /// The handler's response could not be serialized.
    Serialization(String),

    /// The handler itself failed.
    Internal(anyhow::Error),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deserialization(message) => write!(f, "deserialization error: {message}"),
            Self::Serialization(message) => write!(f, "serialization error: {message}"),
            Self::Internal(error) => write!(f, "handler error: {error}"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Internal(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        Self::Internal(error)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Deserialization(error.to_string())
    }
}

/// Error returned when a handler is registered under a name that falls
/// outside the lookup convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHandlerName {
    name: String,
}

impl InvalidHandlerName {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the rejected name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for InvalidHandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid handler name '{}': expected 'name', 'container.name', or 'container#action'",
            self.name
        )
    }
}

impl std::error::Error for InvalidHandlerName {}
