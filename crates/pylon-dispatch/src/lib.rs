//! # Pylon Dispatch
//!
//! Operation handler registration and resolution.
//!
//! A contract names its operations; something still has to map those
//! names onto application code. This crate provides the
//! [`HandlerRegistry`]: an explicit table populated at startup, looked
//! up at request time through a restricted naming convention. Only
//! names that were registered resolve; there is no reflective or
//! ambient lookup, so a request can never reach code that was not
//! deliberately exposed.
//!
//! ## The naming convention
//!
//! | Form | Meaning |
//! |------|---------|
//! | `list` | A function registered at the root |
//! | `pets.list` | A function one level down (exactly one level) |
//! | `pets#show` | An action type constructed per request, then invoked |
//!
//! Anything else, including two-level names such as `a.b.c`, is
//! outside the convention and never resolves.
//!
//! ## Example
//!
//! ```rust
//! use pylon_core::RoutingContext;
//! use pylon_dispatch::{HandlerError, HandlerRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct ListParams {
//!     limit: Option<u32>,
//! }
//!
//! #[derive(Serialize)]
//! struct Page {
//!     items: Vec<String>,
//! }
//!
//! async fn list_pets(_ctx: RoutingContext, params: ListParams) -> Result<Page, HandlerError> {
//!     let limit = params.limit.unwrap_or(10) as usize;
//!     Ok(Page { items: vec!["rex".into(); limit.min(3)] })
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("pets.list", list_pets).expect("valid handler name");
//! assert!(registry.contains("pets.list"));
//! ```

#![doc(html_root_url = "https://docs.rs/pylon-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod name;
mod registry;

pub use error::{HandlerError, InvalidHandlerName};
pub use name::HandlerName;
pub use registry::{BoxedHandlerResult, Callable, ErasedHandler, HandlerRegistry, ResolvedHandler};
