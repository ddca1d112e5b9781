//! Read-only operation lookup built from a contract.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use pylon_router::{MatchOutcome, PathBindings, PathMatcher};

use crate::contract::{Contract, OperationDescriptor};
use crate::error::ContractError;

/// Outcome of resolving a concrete request against the index.
///
/// Both miss variants are ordinary outcomes, not errors; the caller
/// decides what status (if any) each maps to.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    /// An operation matched the path under the requested method.
    Matched {
        /// The matched operation.
        operation: Arc<OperationDescriptor>,
        /// Raw path-variable bindings from the template.
        bindings: PathBindings,
    },
    /// The path belongs to some operation, but not under this method.
    MethodNotAllowed,
    /// No declared template matched the path.
    NotFound,
}

impl RouteOutcome {
    /// Returns true unless an operation matched.
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        !matches!(self, Self::Matched { .. })
    }
}

/// Lookup structure over a contract's operations.
///
/// Built once at startup; immutable afterwards and cheap to share
/// behind an `Arc` across concurrent requests. Descriptors live here
/// exactly once; resolution hands out `Arc` clones, never copies.
#[derive(Debug)]
pub struct OperationIndex {
    operations: Vec<Arc<OperationDescriptor>>,
    by_id: HashMap<String, usize>,
    by_route: HashMap<(Method, String), usize>,
    matcher: PathMatcher,
}

impl OperationIndex {
    /// Indexes a contract, rejecting integrity violations.
    ///
    /// Fails on a duplicate operation id, a duplicate (method,
    /// template) route, or a malformed template. A contract that does
    /// not index must not serve requests.
    pub fn build(contract: &Contract) -> Result<Self, ContractError> {
        let mut operations = Vec::with_capacity(contract.operations().len());
        let mut by_id = HashMap::new();
        let mut by_route = HashMap::new();
        let mut matcher = PathMatcher::new();

        for op in contract.operations() {
            let slot = operations.len();
            if by_id.insert(op.operation_id().to_string(), slot).is_some() {
                return Err(ContractError::DuplicateOperationId {
                    operation_id: op.operation_id().to_string(),
                });
            }

            let route = (op.method().clone(), normalize_template(op.path_template()));
            if by_route.insert(route, slot).is_some() {
                return Err(ContractError::DuplicateRoute {
                    method: op.method().clone(),
                    template: op.path_template().to_string(),
                });
            }

            matcher
                .add_route(op.method().clone(), op.path_template(), op.operation_id())
                .map_err(|source| ContractError::InvalidTemplate {
                    operation_id: op.operation_id().to_string(),
                    source,
                })?;
            operations.push(Arc::new(op.clone()));
        }

        tracing::debug!(
            contract = contract.name(),
            operations = operations.len(),
            routes = matcher.route_count(),
            "operation index built"
        );

        Ok(Self {
            operations,
            by_id,
            by_route,
            matcher,
        })
    }

    /// Looks up an operation by id.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&Arc<OperationDescriptor>> {
        self.by_id.get(operation_id).map(|&slot| &self.operations[slot])
    }

    /// Looks up an operation by its exact (method, template) route.
    ///
    /// This is template equality, not path matching: `/pets/{petId}`
    /// is found by that template string, not by `/pets/1`.
    #[must_use]
    pub fn lookup(&self, method: &Method, template: &str) -> Option<&Arc<OperationDescriptor>> {
        let route = (method.clone(), normalize_template(template));
        self.by_route.get(&route).map(|&slot| &self.operations[slot])
    }

    /// Matches a concrete request path and method.
    ///
    /// Query strings and fragments on `path` are ignored. Misses come
    /// back as [`RouteOutcome`] variants, never as errors.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteOutcome {
        match self.matcher.match_request(method, path) {
            MatchOutcome::Matched(m) => match self.get(m.operation_id()) {
                Some(operation) => RouteOutcome::Matched {
                    operation: Arc::clone(operation),
                    bindings: m.into_bindings(),
                },
                None => RouteOutcome::NotFound,
            },
            MatchOutcome::MethodNotAllowed => RouteOutcome::MethodNotAllowed,
            MatchOutcome::NotFound => RouteOutcome::NotFound,
        }
    }

    /// Returns the number of indexed operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if the contract declared no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterates the indexed operation ids.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.operation_id())
    }
}

/// Collapses slash variance so `/pets`, `pets` and `/pets/` key the
/// same route.
fn normalize_template(template: &str) -> String {
    let joined = template
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}
