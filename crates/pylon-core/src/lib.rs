//! Core types for the Pylon contract gate.
//!
//! This crate defines the data model the gate works with: the
//! [`Contract`] and its [`OperationDescriptor`]s, the
//! [`OperationIndex`] that makes a contract matchable, the per-request
//! [`RoutingContext`] threaded through pipeline stages, and the error
//! taxonomy ([`ContractError`], [`ValidationFailure`] and the
//! [`ErrorEnvelope`] wire shape).
//!
//! Contracts are declared in code with builders; loading a contract
//! document format into this model is left to callers.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use pylon_core::contract::{Contract, OperationDescriptor, ParamSchema, ParameterDeclaration};
//! use pylon_core::{OperationIndex, RouteOutcome};
//!
//! let contract = Contract::builder("petstore", "1.0.0")
//!     .operation(
//!         OperationDescriptor::builder("listPets")
//!             .method(Method::GET)
//!             .path("/pets")
//!             .query_param(ParameterDeclaration::query("limit", ParamSchema::integer()))
//!             .build(),
//!     )
//!     .build();
//!
//! let index = OperationIndex::build(&contract).unwrap();
//! match index.resolve(&Method::GET, "/pets?limit=2") {
//!     RouteOutcome::Matched { operation, .. } => {
//!         assert_eq!(operation.operation_id(), "listPets");
//!     }
//!     _ => unreachable!(),
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/pylon-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contract;
mod context;
mod error;
mod index;

pub use contract::{Contract, OperationDescriptor, ParamSchema, ParameterDeclaration};
pub use context::{ParamMap, RequestId, RoutingContext};
pub use error::{ContractError, ErrorEnvelope, ErrorSource, ValidationError, ValidationFailure};
pub use index::{OperationIndex, RouteOutcome};
