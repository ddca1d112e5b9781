//! Request id stage.
//!
//! Runs first so every later stage, and every response, carries a
//! request id. By default the stage generates a fresh id per request;
//! with [`RequestIdStage::trust_incoming`] it honors a well-formed
//! `x-request-id` header from the client instead.

use pylon_core::{RequestId, RoutingContext};
use uuid::Uuid;

use crate::error::PipelineResult;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::Request;

/// Header carrying the request id on requests and responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assigns a request id to the context and echoes it on the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdStage {
    trust_incoming: bool,
}

impl RequestIdStage {
    /// Creates a stage that always generates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage that reuses a valid incoming `x-request-id`.
    ///
    /// Malformed header values are ignored and a fresh id is
    /// generated as usual.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        let value = request.headers().get(REQUEST_ID_HEADER)?;
        let text = value.to_str().ok()?;
        Uuid::parse_str(text).ok().map(RequestId::from)
    }
}

impl Middleware for RequestIdStage {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RoutingContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, PipelineResult> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await?;
            response.headers_mut().insert(
                REQUEST_ID_HEADER,
                ctx.request_id()
                    .to_string()
                    .parse()
                    .expect("valid header value"),
            );
            Ok(response)
        })
    }
}
