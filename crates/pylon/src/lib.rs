//! # Pylon
//!
//! **Contract-Enforcing Request Gate for HTTP Applications**
//!
//! Pylon is a request-matching and validation layer that sits in front
//! of an HTTP application and provides:
//!
//! - 🔒 **Contract-First Matching** – Requests resolve against declared operations, not ad-hoc routes
//! - 🧪 **Parameter Validation** – Typed extraction and schema checks with aggregated errors
//! - 📦 **Uniform Error Envelopes** – Every rejection carries a machine-readable envelope
//! - ⚡ **Zero-Copy Descriptors** – Operations are indexed once and shared across requests
//! - 🔗 **Fixed Stage Order** – Request id, routing, validation and dispatch always run in order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pylon::prelude::*;
//!
//! let contract = Contract::builder("pets", "1.0.0")
//!     .operation(
//!         OperationDescriptor::builder("listPets")
//!             .path("/pets")
//!             .query_param(ParameterDeclaration::query("limit", ParamSchema::integer()))
//!             .build(),
//!     )
//!     .build();
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("listPets", |ctx, params: ListParams| async move {
//!     // Your handler logic here
//! })?;
//!
//! let index = OperationIndex::build(&contract)?;
//! let gate = ContractGate::builder(index, registry).build();
//! let response = gate.handle(request).await?;
//! ```
//!
//! ## Architecture
//!
//! Pylon enforces a fixed stage order that cannot be disabled or reordered:
//!
//! ```text
//! Request → RequestId → Routing → Validation → Dispatch → Handler
//!                          ↓ miss      ↓ invalid
//!                       fallback   error envelope
//! ```

#![doc(html_root_url = "https://docs.rs/pylon/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use pylon_core as core;

// Re-export router types
pub use pylon_router as router;

// Re-export extraction types
pub use pylon_extract as extract;

// Re-export validation types
pub use pylon_validate as validate;

// Re-export dispatch types
pub use pylon_dispatch as dispatch;

// Re-export middleware types
pub use pylon_middleware as middleware;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use pylon::prelude::*;
/// ```
pub mod prelude {
    pub use pylon_core::{
        Contract, ContractError, ErrorEnvelope, ErrorSource, OperationDescriptor, OperationIndex,
        ParamMap, ParamSchema, ParameterDeclaration, RequestId, RouteOutcome, RoutingContext,
        ValidationError, ValidationFailure,
    };

    // Re-export path matching types
    pub use pylon_router::{MatchOutcome, PathBindings, PathMatcher, PathTemplate};

    // Re-export extraction types
    pub use pylon_extract::ParameterExtractor;

    // Re-export validation types
    pub use pylon_validate::{BasicValidator, SchemaValidator, ValidationPipeline, Violation};

    // Re-export handler registry types
    pub use pylon_dispatch::{
        Callable, HandlerError, HandlerName, HandlerRegistry, ResolvedHandler,
    };

    // Re-export gate and pipeline types
    pub use pylon_middleware::{
        ContractGate, ContractGateBuilder, Middleware, Next, Pipeline, PipelineError,
        PipelineResult, Request, Response, ResponseExt, Stage,
    };
}
