//! Parameter extraction for the Pylon contract gate.
//!
//! Turns the raw material of a matched request (path-variable
//! bindings and the raw query string) into typed parameter values,
//! driven entirely by the operation's [`ParameterDeclaration`]s.
//! Undeclared values on the wire are ignored; declared values are
//! unpacked per their serialization style and coerced toward their
//! schema's kind. Extraction never fails: a value that does not parse
//! as its declared kind is kept as the raw string so validation can
//! report the mismatch alongside every other problem.
//!
//! # Example
//!
//! ```rust
//! use pylon_core::contract::{OperationDescriptor, ParamSchema, ParameterDeclaration};
//! use pylon_extract::ParameterExtractor;
//! use pylon_router::PathBindings;
//!
//! let operation = OperationDescriptor::builder("listPets")
//!     .path("/pets")
//!     .query_param(ParameterDeclaration::query("limit", ParamSchema::integer()))
//!     .build();
//!
//! let extractor = ParameterExtractor::new();
//! let params = extractor.extract(&operation, &PathBindings::new(), Some("limit=2"));
//! assert_eq!(params.get("limit"), Some(&serde_json::json!(2)));
//! ```
//!
//! [`ParameterDeclaration`]: pylon_core::contract::ParameterDeclaration

#![doc(html_root_url = "https://docs.rs/pylon-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod decode;
mod extract;

pub use decode::{ParamDecoder, StyleDecoder};
pub use extract::ParameterExtractor;
