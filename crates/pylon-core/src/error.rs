//! Error taxonomy for the contract gate.
//!
//! Three distinct failure classes flow through the gate. Contract
//! integrity problems ([`ContractError`]) are fatal at index-build
//! time. Validation problems ([`ValidationFailure`]) are per-request
//! and recoverable, rendered through the [`ErrorEnvelope`] wire shape.
//! Routing and resolution misses are not errors at all; they are
//! ordinary `Option`/enum outcomes on their APIs.

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract integrity error found while indexing.
///
/// Any of these means the contract must not serve requests; surface
/// them at startup and abort.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Two operations share one operation id.
    #[error("duplicate operation id '{operation_id}'")]
    DuplicateOperationId {
        /// The repeated id.
        operation_id: String,
    },

    /// Two operations declare the same (method, path template) route.
    #[error("duplicate route {method} {template}")]
    DuplicateRoute {
        /// Method of the repeated route.
        method: http::Method,
        /// Template of the repeated route.
        template: String,
    },

    /// An operation's path template failed to parse.
    #[error("operation '{operation_id}' has an invalid path template: {source}")]
    InvalidTemplate {
        /// Operation whose template is broken.
        operation_id: String,
        /// The underlying template error.
        #[source]
        source: pylon_router::TemplateError,
    },
}

/// Where a validation error points.
///
/// Serializes to the tagged wire form `{"pointer": "/name"}` or
/// `{"parameter": "limit"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// JSON pointer into the request body.
    Pointer(String),
    /// Name of a declared path or query parameter.
    Parameter(String),
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// What the error points at.
    pub source: ErrorSource,
    /// Human-readable summary of the violation.
    pub title: String,
    /// Optional elaboration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ValidationError {
    /// An error about a named path or query parameter.
    #[must_use]
    pub fn parameter(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: ErrorSource::Parameter(name.into()),
            title: title.into(),
            detail: None,
        }
    }

    /// An error about a body location, addressed by JSON pointer.
    #[must_use]
    pub fn pointer(pointer: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: ErrorSource::Pointer(pointer.into()),
            title: title.into(),
            detail: None,
        }
    }

    /// Attaches an elaboration.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ErrorSource::Parameter(name) => write!(f, "parameter '{name}': {}", self.title),
            ErrorSource::Pointer(pointer) => write!(f, "body '{pointer}': {}", self.title),
        }
    }
}

/// Aggregated validation failure for one request.
///
/// Carries every error found across the query, path and body passes,
/// in discovery order. Raised once per request, never per field.
#[derive(Debug, Clone, Error)]
#[error("validation of '{operation_id}' failed with {} error(s)", .errors.len())]
pub struct ValidationFailure {
    operation_id: String,
    errors: Vec<ValidationError>,
}

impl ValidationFailure {
    /// Wraps the collected errors for one operation.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            operation_id: operation_id.into(),
            errors,
        }
    }

    /// Returns the operation the request resolved to.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the collected errors in discovery order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consumes the failure, returning its errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// HTTP status to report this failure with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Builds the wire envelope, attaching a request id when known.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            status: ErrorEnvelope::INVALID_REQUEST.to_string(),
            errors: self.errors.clone(),
            request_id: request_id.map(str::to_string),
        }
    }
}

/// Wire shape for a reported validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Overall classification of the failure.
    pub status: String,
    /// Every violation found, in discovery order.
    pub errors: Vec<ValidationError>,
    /// Correlation id of the failing request, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// Classification used for parameter and body validation failures.
    pub const INVALID_REQUEST: &'static str = "invalid request";
}
