//! Ordered route table for concrete request paths.

use http::Method;

use crate::{PathBindings, PathTemplate, TemplateError};

/// One registered route.
#[derive(Debug, Clone)]
struct Route {
    method: Method,
    template: PathTemplate,
    operation_id: String,
}

/// Result of matching a request against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'m> {
    /// A template matched for the requested method.
    Matched(RouteMatch<'m>),
    /// Some template matched the path, but none under this method.
    MethodNotAllowed,
    /// No template matched the path at all.
    NotFound,
}

impl MatchOutcome<'_> {
    /// Returns true unless a route matched.
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        !matches!(self, Self::Matched(_))
    }
}

/// A successful match: the route's operation id and captured bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'m> {
    operation_id: &'m str,
    bindings: PathBindings,
}

impl<'m> RouteMatch<'m> {
    /// Returns the matched route's operation id.
    #[must_use]
    pub const fn operation_id(&self) -> &'m str {
        self.operation_id
    }

    /// Returns the captured placeholder bindings.
    #[must_use]
    pub const fn bindings(&self) -> &PathBindings {
        &self.bindings
    }

    /// Consumes the match, returning the bindings.
    #[must_use]
    pub fn into_bindings(self) -> PathBindings {
        self.bindings
    }
}

/// The compiled route table.
///
/// Routes are checked in registration order and the first match wins.
/// A well-formed contract has at most one template matching any
/// concrete path per method; when templates overlap anyway, the
/// registration-order tie-break is the documented behavior rather than
/// an arbitrary runtime pick. The table does not reject duplicates
/// itself; contract-level duplicate detection happens where the table
/// is built from a contract.
///
/// Construction happens once at startup; after that the table is
/// read-only and safe to share across concurrent requests.
#[derive(Debug, Default)]
pub struct PathMatcher {
    routes: Vec<Route>,
}

impl PathMatcher {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route, parsing and validating its template.
    pub fn add_route(
        &mut self,
        method: Method,
        template: &str,
        operation_id: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let template = PathTemplate::parse(template)?;
        self.routes.push(Route {
            method,
            template,
            operation_id: operation_id.into(),
        });
        Ok(())
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Matches a concrete request path against the table.
    ///
    /// Any query string or fragment on `path` is stripped before
    /// matching. Misses are ordinary outcomes, not errors.
    #[must_use]
    pub fn match_request(&self, method: &Method, path: &str) -> MatchOutcome<'_> {
        let path = strip_target(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for route in &self.routes {
            if route.method == *method {
                if let Some(bindings) = route.template.capture(&segments) {
                    return MatchOutcome::Matched(RouteMatch {
                        operation_id: &route.operation_id,
                        bindings,
                    });
                }
            }
        }

        if self
            .routes
            .iter()
            .any(|route| route.method != *method && route.template.matches(&segments))
        {
            return MatchOutcome::MethodNotAllowed;
        }
        MatchOutcome::NotFound
    }
}

/// Cuts a request target down to its path portion.
fn strip_target(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
