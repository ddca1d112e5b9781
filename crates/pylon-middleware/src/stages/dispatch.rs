//! Dispatch stage.
//!
//! The innermost stage. Looks the matched operation's id up in the
//! [`HandlerRegistry`], invokes the resolved handler with a snapshot
//! of the context, and wraps the serialized result in a 200 response.
//! An operation with no registered handler gets a 501; a handler that
//! fails gets a 500 with the detail kept out of the response.
//!
//! With a namespace configured the operation id is prefixed before
//! lookup, so `listPets` under namespace `api` resolves `api.listPets`.

use std::sync::Arc;

use http::StatusCode;
use pylon_core::RoutingContext;
use pylon_dispatch::HandlerRegistry;

use crate::error::PipelineResult;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Invokes the registered handler for the matched operation.
pub struct DispatchStage {
    registry: Arc<HandlerRegistry>,
    namespace: Option<String>,
}

impl DispatchStage {
    /// Creates a dispatch stage over the given registry.
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            namespace: None,
        }
    }

    /// Prefixes every operation id with `namespace.` before lookup.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn handler_name(&self, operation_id: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{operation_id}"),
            None => operation_id.to_string(),
        }
    }
}

impl Middleware for DispatchStage {
    fn name(&self) -> &'static str {
        "dispatch"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RoutingContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        Box::pin(async move {
            let Some(operation_id) = ctx.operation_id().map(str::to_string) else {
                return next.run(ctx, request).await;
            };

            let name = self.handler_name(&operation_id);
            let Some(handler) = self.registry.resolve(&name, ctx) else {
                tracing::warn!(
                    operation_id = %operation_id,
                    handler = %name,
                    "no handler registered for matched operation"
                );
                return Ok(Response::json_error(
                    StatusCode::NOT_IMPLEMENTED,
                    "not_implemented",
                    "no handler is registered for the operation",
                ));
            };

            match handler.invoke(ctx.clone()).await {
                Ok(payload) => Ok(Response::json(StatusCode::OK, payload)),
                Err(error) => {
                    tracing::error!(
                        operation_id = %operation_id,
                        error = %error,
                        "handler failed"
                    );
                    Ok(Response::json_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "the handler failed to produce a response",
                    ))
                }
            }
        })
    }
}

impl std::fmt::Debug for DispatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchStage")
            .field("handlers", &self.registry.len())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
