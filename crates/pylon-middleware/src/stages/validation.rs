//! Validation stage.
//!
//! For a matched operation this stage extracts the declared
//! parameters, validates them together with the request body, and
//! either commits the normalized values to the context or stops the
//! request. Requests that matched no operation pass through
//! untouched.
//!
//! Failures normally become a 400 response carrying the error
//! envelope. With `raise_on_validation_error` the stage returns the
//! failure as a [`PipelineError`] instead, for callers that want to
//! map it themselves.

use bytes::Bytes;
use http_body_util::BodyExt;
use pylon_core::{RoutingContext, ValidationError, ValidationFailure};
use pylon_extract::ParameterExtractor;
use pylon_validate::ValidationPipeline;

use crate::error::{PipelineError, PipelineResult};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Extracts and validates parameters for the matched operation.
#[derive(Clone, Default)]
pub struct ValidationStage {
    extractor: ParameterExtractor,
    pipeline: ValidationPipeline,
    raise_on_validation_error: bool,
}

impl ValidationStage {
    /// Creates a stage with the default extractor and validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the parameter extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: ParameterExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the validation pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ValidationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Returns failures as [`PipelineError::Validation`] instead of
    /// writing the 400 response here.
    #[must_use]
    pub fn raise_on_validation_error(mut self, raise: bool) -> Self {
        self.raise_on_validation_error = raise;
        self
    }
}

impl Middleware for ValidationStage {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RoutingContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        Box::pin(async move {
            let Some(operation) = ctx.operation().cloned() else {
                return next.run(ctx, request).await;
            };

            let params =
                self.extractor
                    .extract(&operation, ctx.raw_path_bindings(), request.uri().query());

            let mut body = None;
            let mut body_parse_error = None;
            if operation.request_body_schema().is_some() {
                let bytes = match request.body().clone().collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(never) => match never {},
                };
                if !bytes.is_empty() {
                    match serde_json::from_slice(&bytes) {
                        Ok(value) => body = Some(value),
                        Err(_) => {
                            body_parse_error =
                                Some(ValidationError::pointer("", "must be valid JSON"));
                        }
                    }
                }
            }

            let mut errors = match self.pipeline.validate(&operation, &params, body.as_ref()) {
                Ok(()) => Vec::new(),
                Err(failure) => failure.into_errors(),
            };
            // The body is validated after the parameters, so a parse
            // failure sorts last too.
            if let Some(error) = body_parse_error {
                errors.push(error);
            }

            if errors.is_empty() {
                ctx.set_normalized_params(params);
                return next.run(ctx, request).await;
            }

            let failure = ValidationFailure::new(operation.operation_id(), errors);
            tracing::debug!(
                operation_id = failure.operation_id(),
                errors = failure.errors().len(),
                "request failed validation"
            );
            if self.raise_on_validation_error {
                return Err(PipelineError::Validation(failure));
            }

            let envelope = failure.to_envelope(Some(&ctx.request_id().to_string()));
            let payload =
                serde_json::to_vec(&envelope).expect("failed to serialize error envelope");
            Ok(Response::json(failure.status_code(), Bytes::from(payload)))
        })
    }
}

impl std::fmt::Debug for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationStage")
            .field("raise_on_validation_error", &self.raise_on_validation_error)
            .finish_non_exhaustive()
    }
}
