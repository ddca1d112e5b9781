//! Request pipeline and contract gate stages for Pylon.
//!
//! This crate ties the routing, extraction, validation and dispatch
//! crates together into a middleware pipeline that fronts an HTTP
//! application. Requests flow through four stages:
//!
//! | Stage | Responsibility |
//! |-------|----------------|
//! | [`RequestIdStage`](stages::RequestIdStage) | Assign a correlation id |
//! | [`RoutingStage`](stages::RoutingStage) | Match the operation index |
//! | [`ValidationStage`](stages::ValidationStage) | Extract and validate parameters |
//! | [`DispatchStage`](stages::DispatchStage) | Invoke the registered handler |
//!
//! [`ContractGate`] assembles all four over a contract's
//! [`OperationIndex`](pylon_core::OperationIndex) and a
//! [`HandlerRegistry`](pylon_dispatch::HandlerRegistry); custom stages
//! implement [`Middleware`] and compose through [`Pipeline`].
//!
//! ```
//! use pylon_middleware::Stage;
//!
//! let order: Vec<_> = Stage::all().iter().map(|s| s.name()).collect();
//! assert_eq!(order, ["request_id", "routing", "validation", "dispatch"]);
//! ```

#![doc(html_root_url = "https://docs.rs/pylon-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod gate;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use error::{PipelineError, PipelineResult};
pub use gate::{ContractGate, ContractGateBuilder, DownstreamHandler};
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder, Stage};
pub use stages::{DispatchStage, FallbackHandler, RequestIdStage, RoutingStage, ValidationStage};
pub use types::{Request, Response, ResponseExt};
