//! The contract gate: a fully assembled four-stage pipeline.
//!
//! [`ContractGate`] is the crate's main entry point. It wires the
//! request id, routing, validation and dispatch stages over an
//! operation index and a handler registry, and hands anything the
//! stages decline to a downstream application handler.
//!
//! # Example
//!
//! ```ignore
//! use pylon_core::{Contract, OperationIndex};
//! use pylon_dispatch::HandlerRegistry;
//! use pylon_middleware::ContractGate;
//!
//! let index = OperationIndex::build(&contract)?;
//! let gate = ContractGate::builder(index, registry)
//!     .mount_namespace("api")
//!     .build();
//!
//! let response = gate.handle(request).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use http::StatusCode;
use pylon_core::{OperationIndex, RoutingContext};
use pylon_dispatch::HandlerRegistry;
use pylon_extract::ParameterExtractor;
use pylon_validate::ValidationPipeline;

use crate::error::PipelineResult;
use crate::middleware::BoxFuture;
use crate::pipeline::Pipeline;
use crate::stages::{
    DispatchStage, FallbackHandler, RequestIdStage, RoutingStage, ValidationStage,
};
use crate::types::{Request, Response, ResponseExt};

/// Handler for requests the stages passed through without answering,
/// which only happens when unknown operations are allowed.
pub type DownstreamHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A request gate enforcing one contract.
///
/// Cheap to clone; clones share the stages and the downstream
/// handler.
#[derive(Clone)]
pub struct ContractGate {
    pipeline: Pipeline,
    downstream: DownstreamHandler,
}

impl ContractGate {
    /// Starts building a gate over the given index and registry.
    #[must_use]
    pub fn builder(index: OperationIndex, registry: HandlerRegistry) -> ContractGateBuilder {
        ContractGateBuilder {
            index,
            registry,
            extractor: ParameterExtractor::new(),
            validation: ValidationPipeline::new(),
            mount_namespace: None,
            allow_unknown_operation: false,
            raise_on_validation_error: false,
            trust_request_id_header: false,
            fallback: None,
            downstream: None,
        }
    }

    /// Handles one request with a fresh [`RoutingContext`].
    pub async fn handle(&self, request: Request) -> PipelineResult {
        let mut ctx = RoutingContext::new();
        self.handle_with_context(&mut ctx, request).await
    }

    /// Handles one request with a caller-provided context, e.g. one
    /// carrying a mount split from an outer router.
    pub async fn handle_with_context(
        &self,
        ctx: &mut RoutingContext,
        request: Request,
    ) -> PipelineResult {
        let downstream = Arc::clone(&self.downstream);
        self.pipeline
            .process(ctx, request, move |_ctx, request| {
                Box::pin(async move { Ok(downstream(request).await) })
            })
            .await
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }
}

impl std::fmt::Debug for ContractGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractGate")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ContractGate`].
pub struct ContractGateBuilder {
    index: OperationIndex,
    registry: HandlerRegistry,
    extractor: ParameterExtractor,
    validation: ValidationPipeline,
    mount_namespace: Option<String>,
    allow_unknown_operation: bool,
    raise_on_validation_error: bool,
    trust_request_id_header: bool,
    fallback: Option<FallbackHandler>,
    downstream: Option<DownstreamHandler>,
}

impl ContractGateBuilder {
    /// Namespaces handler lookups: operation `listPets` under
    /// namespace `api` resolves the handler named `api.listPets`.
    #[must_use]
    pub fn mount_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.mount_namespace = Some(namespace.into());
        self
    }

    /// Forwards unmatched requests to the downstream handler instead
    /// of answering them with the fallback.
    #[must_use]
    pub fn allow_unknown_operation(mut self, allow: bool) -> Self {
        self.allow_unknown_operation = allow;
        self
    }

    /// Surfaces validation failures as errors from
    /// [`ContractGate::handle`] instead of 400 responses.
    #[must_use]
    pub fn raise_on_validation_error(mut self, raise: bool) -> Self {
        self.raise_on_validation_error = raise;
        self
    }

    /// Honors a well-formed `x-request-id` header from the client.
    #[must_use]
    pub fn trust_request_id_header(mut self, trust: bool) -> Self {
        self.trust_request_id_header = trust;
        self
    }

    /// Replaces the handler invoked on a routing miss.
    #[must_use]
    pub fn fallback_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.fallback = Some(Arc::new(move |request| Box::pin(handler(request))));
        self
    }

    /// Sets the downstream application behind the gate.
    #[must_use]
    pub fn downstream<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.downstream = Some(Arc::new(move |request| Box::pin(handler(request))));
        self
    }

    /// Replaces the parameter extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: ParameterExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the validation pipeline.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationPipeline) -> Self {
        self.validation = validation;
        self
    }

    /// Assembles the gate.
    #[must_use]
    pub fn build(self) -> ContractGate {
        let index = Arc::new(self.index);
        let registry = Arc::new(self.registry);

        let request_id = if self.trust_request_id_header {
            RequestIdStage::trust_incoming()
        } else {
            RequestIdStage::new()
        };

        let mut routing = RoutingStage::new(Arc::clone(&index))
            .allow_unknown_operation(self.allow_unknown_operation);
        if let Some(fallback) = self.fallback {
            routing = routing.with_fallback(fallback);
        }

        let validation = ValidationStage::new()
            .with_extractor(self.extractor)
            .with_pipeline(self.validation)
            .raise_on_validation_error(self.raise_on_validation_error);

        let mut dispatch = DispatchStage::new(Arc::clone(&registry));
        if let Some(namespace) = self.mount_namespace {
            dispatch = dispatch.with_namespace(namespace);
        }

        let pipeline = Pipeline::builder()
            .stage(request_id)
            .stage(routing)
            .stage(validation)
            .stage(dispatch)
            .build();

        let downstream = self.downstream.unwrap_or_else(|| {
            Arc::new(|_request| {
                Box::pin(async {
                    Response::json_error(
                        StatusCode::NOT_FOUND,
                        "not_found",
                        "no downstream application is configured",
                    )
                })
            })
        });

        tracing::debug!(
            operations = index.len(),
            handlers = registry.len(),
            "contract gate assembled"
        );

        ContractGate {
            pipeline,
            downstream,
        }
    }
}

impl std::fmt::Debug for ContractGateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractGateBuilder")
            .field("mount_namespace", &self.mount_namespace)
            .field("allow_unknown_operation", &self.allow_unknown_operation)
            .field("raise_on_validation_error", &self.raise_on_validation_error)
            .field("trust_request_id_header", &self.trust_request_id_header)
            .finish_non_exhaustive()
    }
}
