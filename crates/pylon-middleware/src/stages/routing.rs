//! Routing stage.
//!
//! Resolves the request's method and path against the contract's
//! [`OperationIndex`]. On a match the operation and its raw path
//! bindings are recorded on the context and the chain continues. On a
//! miss the stage hands the untouched request to a fallback handler,
//! or forwards it down the chain when unknown operations are allowed.

use std::sync::Arc;

use pylon_core::{OperationIndex, RouteOutcome, RoutingContext};

use crate::error::PipelineResult;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Handler invoked with the original request when no operation
/// matches.
pub type FallbackHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Matches requests against the operation index.
pub struct RoutingStage {
    index: Arc<OperationIndex>,
    allow_unknown_operation: bool,
    fallback: FallbackHandler,
}

impl RoutingStage {
    /// Creates a routing stage over the given index.
    ///
    /// Unmatched requests get a JSON 404 unless a fallback is set.
    #[must_use]
    pub fn new(index: Arc<OperationIndex>) -> Self {
        Self {
            index,
            allow_unknown_operation: false,
            fallback: Arc::new(|_request| {
                Box::pin(async {
                    Response::json_error(
                        http::StatusCode::NOT_FOUND,
                        "not_found",
                        "no operation matches the request",
                    )
                })
            }),
        }
    }

    /// Lets unmatched requests continue down the chain with the
    /// context untouched, instead of going to the fallback.
    #[must_use]
    pub fn allow_unknown_operation(mut self, allow: bool) -> Self {
        self.allow_unknown_operation = allow;
        self
    }

    /// Replaces the fallback invoked on a routing miss.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackHandler) -> Self {
        self.fallback = fallback;
        self
    }
}

impl Middleware for RoutingStage {
    fn name(&self) -> &'static str {
        "routing"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RoutingContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        Box::pin(async move {
            let path = ctx.path_to_match(request.uri().path()).to_string();
            match self.index.resolve(request.method(), &path) {
                RouteOutcome::Matched {
                    operation,
                    bindings,
                } => {
                    tracing::debug!(
                        operation_id = operation.operation_id(),
                        path = %path,
                        "operation matched"
                    );
                    ctx.record_match(operation, bindings, &path);
                    next.run(ctx, request).await
                }
                RouteOutcome::MethodNotAllowed | RouteOutcome::NotFound => {
                    tracing::debug!(
                        method = %request.method(),
                        path = %path,
                        "no operation matched"
                    );
                    if self.allow_unknown_operation {
                        next.run(ctx, request).await
                    } else {
                        Ok((self.fallback)(request).await)
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for RoutingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingStage")
            .field("operations", &self.index.len())
            .field("allow_unknown_operation", &self.allow_unknown_operation)
            .finish_non_exhaustive()
    }
}
