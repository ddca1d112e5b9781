//! Per-request routing state.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pylon_router::PathBindings;

use crate::contract::OperationDescriptor;

/// Normalized parameter values keyed by declared name.
///
/// Path and query parameters share this one namespace. Iteration order
/// is insertion order, which follows declaration order, so logs and
/// serialized output are deterministic.
pub type ParamMap = IndexMap<String, serde_json::Value>;

/// Unique id for one request, used for correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new time-ordered id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request state threaded through the gate's stages.
///
/// Created fresh for each request and owned by the task handling it;
/// nothing here is shared across requests. Each stage records what it
/// learned: the routing stage the resolved operation, raw path
/// bindings and the consumed mount prefix; the validation stage the
/// normalized parameters.
///
/// The mount split (`mount_prefix` / `remaining_path`) tracks how much
/// of the incoming path outer mounts have already consumed. On a
/// successful match the matched remainder moves into the prefix; on a
/// miss the split is left exactly as it was.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    request_id: RequestId,
    mount_prefix: String,
    remaining_path: Option<String>,
    operation: Option<Arc<OperationDescriptor>>,
    raw_path_bindings: PathBindings,
    normalized_params: ParamMap,
    started_at: Instant,
}

impl RoutingContext {
    /// Creates a fresh context with a generated request id and an
    /// untouched mount split.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            mount_prefix: String::new(),
            remaining_path: None,
            operation: None,
            raw_path_bindings: PathBindings::new(),
            normalized_params: ParamMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Replaces the generated request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Carries over a path split recorded by an outer mount.
    #[must_use]
    pub fn with_mount_split(
        mut self,
        prefix: impl Into<String>,
        remaining: impl Into<String>,
    ) -> Self {
        self.mount_prefix = prefix.into();
        self.remaining_path = Some(remaining.into());
        self
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Overrides the request id, e.g. from an inbound header.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the path portion already consumed by outer mounts.
    #[must_use]
    pub fn mount_prefix(&self) -> &str {
        &self.mount_prefix
    }

    /// Returns the un-consumed remainder recorded by an outer mount,
    /// if any.
    #[must_use]
    pub fn remaining_path(&self) -> Option<&str> {
        self.remaining_path.as_deref()
    }

    /// The path the matcher should see: the recorded remainder when an
    /// outer mount left one, otherwise the request's own path.
    #[must_use]
    pub fn path_to_match<'a>(&'a self, request_path: &'a str) -> &'a str {
        self.remaining_path.as_deref().unwrap_or(request_path)
    }

    /// Records a successful match: the consumed path moves into the
    /// mount prefix and the operation plus its raw bindings are kept.
    pub fn record_match(
        &mut self,
        operation: Arc<OperationDescriptor>,
        bindings: PathBindings,
        consumed: &str,
    ) {
        self.mount_prefix.push_str(consumed);
        self.remaining_path = Some(String::new());
        self.operation = Some(operation);
        self.raw_path_bindings = bindings;
    }

    /// Returns the resolved operation, absent until a match is
    /// recorded.
    #[must_use]
    pub const fn operation(&self) -> Option<&Arc<OperationDescriptor>> {
        self.operation.as_ref()
    }

    /// Returns the resolved operation's id, when matched.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation.as_deref().map(OperationDescriptor::operation_id)
    }

    /// Returns the raw path-variable bindings from the match.
    #[must_use]
    pub const fn raw_path_bindings(&self) -> &PathBindings {
        &self.raw_path_bindings
    }

    /// Returns the normalized parameters, empty until validation ran.
    #[must_use]
    pub const fn normalized_params(&self) -> &ParamMap {
        &self.normalized_params
    }

    /// Stores the normalized parameters.
    pub fn set_normalized_params(&mut self, params: ParamMap) {
        self.normalized_params = params;
    }

    /// Returns one normalized parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.normalized_params.get(name)
    }

    /// Time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self::new()
    }
}
