//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] holds the gate's stages in execution order and runs
//! a request through them toward a terminal handler. Stages are
//! composed back-to-front so the first registered stage is the
//! outermost one.

use std::sync::Arc;

use pylon_core::RoutingContext;

use crate::error::PipelineResult;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::Request;

/// A reference-counted, type-erased middleware stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The gate's four fixed stages, in execution order.
///
/// The enum exists for introspection and logging; the pipeline itself
/// runs whatever stages it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Assigns or extracts the request id.
    RequestId = 1,
    /// Matches the request against the operation index.
    Routing = 2,
    /// Extracts and validates parameters.
    Validation = 3,
    /// Invokes the registered handler.
    Dispatch = 4,
}

impl Stage {
    /// Returns the stage's name as used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestId => "request_id",
            Self::Routing => "routing",
            Self::Validation => "validation",
            Self::Dispatch => "dispatch",
        }
    }

    /// Returns all stages in execution order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::RequestId, Self::Routing, Self::Validation, Self::Dispatch]
    }
}

/// An ordered sequence of middleware stages.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a builder for assembling a pipeline.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Runs the request through every stage and into the handler.
    ///
    /// The handler is the innermost element of the chain; a stage
    /// that does not call `next.run` prevents it from running.
    pub async fn process<H>(
        &self,
        ctx: &mut RoutingContext,
        request: Request,
        handler: H,
    ) -> PipelineResult
    where
        H: FnOnce(&mut RoutingContext, Request) -> BoxFuture<'static, PipelineResult>
            + Send
            + 'static,
    {
        self.build_chain(handler).run(ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut RoutingContext, Request) -> BoxFuture<'static, PipelineResult> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of the stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Appends a stage to the end of the pipeline.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Finishes the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::{Request as HttpRequest, StatusCode};
    use http_body_util::Full;
    use pylon_core::{ValidationError, ValidationFailure};
    use std::sync::Mutex;

    struct OrderTrackingStage {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for OrderTrackingStage {
        fn name(&self) -> &'static str {
            self.label
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut RoutingContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, PipelineResult> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("{}:before", self.label));
                let response = next.run(ctx, request).await;
                self.log.lock().unwrap().push(format!("{}:after", self.label));
                response
            })
        }
    }

    struct ShortCircuitStage;

    impl Middleware for ShortCircuitStage {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut RoutingContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, PipelineResult> {
            Box::pin(async {
                Ok(Response::json_error(
                    StatusCode::TOO_MANY_REQUESTS,
                    "throttled",
                    "slow down",
                ))
            })
        }
    }

    struct FailingStage;

    impl Middleware for FailingStage {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut RoutingContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, PipelineResult> {
            Box::pin(async {
                let failure = ValidationFailure::new(
                    "failingOp",
                    vec![ValidationError::parameter("limit", "must be an integer")],
                );
                Err(PipelineError::Validation(failure))
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
    ) -> impl FnOnce(&mut RoutingContext, Request) -> BoxFuture<'static, PipelineResult> + Send + 'static
    {
        |_ctx, _req| {
            Box::pin(async { Ok(Response::json(StatusCode::OK, Bytes::from_static(b"{}"))) })
        }
    }

    #[tokio::test]
    async fn test_stages_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .stage(OrderTrackingStage {
                label: "outer",
                log: Arc::clone(&log),
            })
            .stage(OrderTrackingStage {
                label: "inner",
                log: Arc::clone(&log),
            })
            .build();

        let mut ctx = RoutingContext::new();
        let response = pipeline
            .process(&mut ctx, empty_request(), ok_handler())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let entries = log.lock().unwrap().clone();
        assert_eq!(
            entries,
            ["outer:before", "inner:before", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_stages_and_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .stage(ShortCircuitStage)
            .stage(OrderTrackingStage {
                label: "unreached",
                log: Arc::clone(&log),
            })
            .build();

        let mut ctx = RoutingContext::new();
        let response = pipeline
            .process(&mut ctx, empty_request(), ok_handler())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stage_error_propagates_to_the_caller() {
        let pipeline = Pipeline::builder().stage(FailingStage).build();

        let mut ctx = RoutingContext::new();
        let result = pipeline.process(&mut ctx, empty_request(), ok_handler()).await;

        let PipelineError::Validation(failure) = result.unwrap_err();
        assert_eq!(failure.operation_id(), "failingOp");
    }

    #[tokio::test]
    async fn test_empty_pipeline_runs_the_handler_directly() {
        let pipeline = Pipeline::new();
        let mut ctx = RoutingContext::new();
        let response = pipeline
            .process(&mut ctx, empty_request(), ok_handler())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_stage_names_reflect_registration_order() {
        let pipeline = Pipeline::builder()
            .stage(ShortCircuitStage)
            .stage(FailingStage)
            .build();
        assert_eq!(pipeline.stage_names(), ["short_circuit", "failing"]);
        assert_eq!(pipeline.stage_count(), 2);
    }

    #[test]
    fn test_stage_enum_lists_the_gate_stages_in_order() {
        let names: Vec<_> = Stage::all().iter().map(|stage| stage.name()).collect();
        assert_eq!(names, ["request_id", "routing", "validation", "dispatch"]);
    }
}
