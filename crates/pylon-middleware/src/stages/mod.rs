//! The gate's built-in stages.
//!
//! Execution order is request id, routing, validation, dispatch; see
//! [`Stage`](crate::Stage) for the canonical list.

pub mod dispatch;
pub mod request_id;
pub mod routing;
pub mod validation;

pub use dispatch::DispatchStage;
pub use request_id::{RequestIdStage, REQUEST_ID_HEADER};
pub use routing::{FallbackHandler, RoutingStage};
pub use validation::ValidationStage;
