//! Core middleware trait and chain types.
//!
//! This module defines the [`Middleware`] trait the gate's stages
//! implement, and the [`Next`] handle a stage uses to pass control to
//! the rest of the chain.
//!
//! # Example
//!
//! ```ignore
//! use pylon_core::RoutingContext;
//! use pylon_middleware::{BoxFuture, Middleware, Next, PipelineResult, Request};
//!
//! struct TimingStage;
//!
//! impl Middleware for TimingStage {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut RoutingContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, PipelineResult> {
//!         Box::pin(async move {
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
//!             response
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use pylon_core::RoutingContext;

use crate::error::PipelineResult;
use crate::types::Request;

/// A boxed future returned by middleware.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The trait every gate stage implements.
///
/// A stage receives the mutable per-request [`RoutingContext`], the
/// incoming request, and a [`Next`] handle. It forwards with
/// `next.run`, short-circuits with a response of its own, or refuses
/// the request with an error the gate's caller receives directly.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once.
/// - A stage must not swallow errors from downstream stages.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the stage's unique name, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut RoutingContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult>;
}

/// Handle for the remainder of the chain.
///
/// Passed to each stage; calling [`run`](Next::run) continues
/// processing. Not calling it short-circuits the pipeline with the
/// stage's own result.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More stages to process.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain, invoke the terminal handler.
    Handler(
        Box<dyn FnOnce(&mut RoutingContext, Request) -> BoxFuture<'static, PipelineResult> + Send + 'a>,
    ),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given stage.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub(crate) fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut RoutingContext, Request) -> BoxFuture<'static, PipelineResult> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the terminal handler.
    ///
    /// Consumes `self` so the chain can be continued at most once.
    pub async fn run(self, ctx: &mut RoutingContext, request: Request) -> PipelineResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::{Request as HttpRequest, StatusCode};
    use http_body_util::Full;

    struct MarkingStage {
        name: &'static str,
    }

    impl Middleware for MarkingStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'b>(
            &'b self,
            ctx: &'b mut RoutingContext,
            request: Request,
            next: Next<'b>,
        ) -> BoxFuture<'b, PipelineResult> {
            Box::pin(async move {
                let mut response = next.run(ctx, request).await?;
                response
                    .headers_mut()
                    .append("x-visited", self.name.parse().expect("valid header value"));
                Ok(response)
            })
        }
    }

    fn empty_request() -> Request {
        HttpRequest::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler(
    ) -> impl FnOnce(&mut RoutingContext, Request) -> BoxFuture<'static, PipelineResult> {
        |_ctx, _req| {
            Box::pin(async { Ok(Response::json(StatusCode::OK, Bytes::from_static(b"{}"))) })
        }
    }

    #[tokio::test]
    async fn test_terminal_handler_runs() {
        let mut ctx = RoutingContext::new();
        let next = Next::handler(ok_handler());

        let response = next.run(&mut ctx, empty_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chain_runs_stages_around_the_handler() {
        let first = MarkingStage { name: "first" };
        let second = MarkingStage { name: "second" };

        let mut ctx = RoutingContext::new();
        let next = Next::new(&first, Next::new(&second, Next::handler(ok_handler())));

        let response = next.run(&mut ctx, empty_request()).await.unwrap();
        let visited: Vec<_> = response.headers().get_all("x-visited").iter().collect();
        // Headers append on the way back out, innermost stage first.
        assert_eq!(visited, ["second", "first"]);
    }

    #[tokio::test]
    async fn test_stage_can_short_circuit() {
        struct RefusingStage;

        impl Middleware for RefusingStage {
            fn name(&self) -> &'static str {
                "refusing"
            }

            fn process<'b>(
                &'b self,
                _ctx: &'b mut RoutingContext,
                _request: Request,
                _next: Next<'b>,
            ) -> BoxFuture<'b, PipelineResult> {
                Box::pin(async {
                    Ok(Response::json_error(
                        StatusCode::FORBIDDEN,
                        "forbidden",
                        "refused",
                    ))
                })
            }
        }

        let stage = RefusingStage;
        let mut ctx = RoutingContext::new();
        let next = Next::new(&stage, Next::handler(ok_handler()));

        let response = next.run(&mut ctx, empty_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
