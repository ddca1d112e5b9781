//! # Pylon Validate
//!
//! Aggregating request validation for the Pylon contract gate.
//!
//! This crate checks the parameters extracted by `pylon-extract` (and an
//! optional decoded request body) against the schemas an operation
//! declares, and reports every violation at once rather than stopping at
//! the first. A request with a malformed query parameter *and* a missing
//! required field comes back with both problems in a single response.
//!
//! ## Components
//!
//! | Type | Role |
//! |------|------|
//! | [`ValidationPipeline`] | Runs query, path, and body checks for one operation |
//! | [`SchemaValidator`] | Capability checking one value against one schema |
//! | [`BasicValidator`] | Structural validator for the built-in schema kinds |
//! | [`Violation`] | One problem found inside a checked value |
//!
//! ## Example
//!
//! ```rust
//! use pylon_core::contract::{OperationDescriptor, ParamSchema, ParameterDeclaration};
//! use pylon_core::ParamMap;
//! use pylon_validate::ValidationPipeline;
//!
//! let operation = OperationDescriptor::builder("listPets")
//!     .query_param(
//!         ParameterDeclaration::query("limit", ParamSchema::integer().minimum(1)).required(),
//!     )
//!     .build();
//!
//! let mut params = ParamMap::new();
//! params.insert("limit".into(), serde_json::json!("abc"));
//!
//! let pipeline = ValidationPipeline::new();
//! let failure = pipeline
//!     .validate(&operation, &params, None)
//!     .expect_err("a non-numeric limit must be rejected");
//! assert_eq!(failure.errors().len(), 1);
//! ```
//!
//! The order of checks is fixed: query parameters first, then path
//! parameters, then the request body. Each phase runs to completion even
//! when an earlier phase already found problems.

#![doc(html_root_url = "https://docs.rs/pylon-validate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pipeline;
mod validator;

pub use pipeline::ValidationPipeline;
pub use validator::{BasicValidator, SchemaValidator, Violation};
