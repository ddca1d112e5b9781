//! Path template matching for the Pylon contract gate.
//!
//! This crate holds the route table the gate matches incoming request
//! paths against. A route is a `(method, template)` pair pointing at an
//! operation id; templates are `/`-separated patterns whose segments
//! are either literals or `{name}` placeholders. A placeholder matches
//! exactly one non-empty path segment; there are no cross-segment
//! wildcards. Query strings and fragments are stripped before matching.
//!
//! Routes are checked in registration order and the first match wins,
//! so overlapping templates resolve deterministically. A path that
//! matches a template only under a different method is reported as
//! [`MatchOutcome::MethodNotAllowed`] so callers can tell the two kinds
//! of miss apart.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use pylon_router::{MatchOutcome, PathMatcher};
//!
//! let mut matcher = PathMatcher::new();
//! matcher.add_route(Method::GET, "/pets", "listPets").unwrap();
//! matcher.add_route(Method::GET, "/pets/{petId}", "showPet").unwrap();
//!
//! match matcher.match_request(&Method::GET, "/pets/42?verbose=1") {
//!     MatchOutcome::Matched(m) => {
//!         assert_eq!(m.operation_id(), "showPet");
//!         assert_eq!(m.bindings().get("petId"), Some("42"));
//!     }
//!     _ => unreachable!(),
//! }
//!
//! assert!(matcher.match_request(&Method::DELETE, "/pets").is_miss());
//! ```

mod bindings;
mod matcher;
mod template;

pub use bindings::PathBindings;
pub use matcher::{MatchOutcome, PathMatcher, RouteMatch};
pub use template::{PathTemplate, TemplateError, TemplateSegment};

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn pets_matcher() -> PathMatcher {
        let mut matcher = PathMatcher::new();
        matcher.add_route(Method::GET, "/pets", "listPets").unwrap();
        matcher
            .add_route(Method::GET, "/pets/{petId}", "showPet")
            .unwrap();
        matcher
            .add_route(Method::POST, "/pets", "createPet")
            .unwrap();
        matcher
    }

    #[test]
    fn test_literal_match() {
        let matcher = pets_matcher();
        let MatchOutcome::Matched(m) = matcher.match_request(&Method::GET, "/pets") else {
            panic!("expected a match");
        };
        assert_eq!(m.operation_id(), "listPets");
        assert!(m.bindings().is_empty());
    }

    #[test]
    fn test_placeholder_match() {
        let matcher = pets_matcher();
        let MatchOutcome::Matched(m) = matcher.match_request(&Method::GET, "/pets/1") else {
            panic!("expected a match");
        };
        assert_eq!(m.operation_id(), "showPet");
        assert_eq!(m.bindings().get("petId"), Some("1"));
    }

    #[test]
    fn test_method_selects_route() {
        let matcher = pets_matcher();
        let MatchOutcome::Matched(m) = matcher.match_request(&Method::POST, "/pets") else {
            panic!("expected a match");
        };
        assert_eq!(m.operation_id(), "createPet");
    }

    #[test]
    fn test_undeclared_method_is_distinct_miss() {
        let matcher = pets_matcher();
        assert_eq!(
            matcher.match_request(&Method::DELETE, "/pets"),
            MatchOutcome::MethodNotAllowed
        );
    }

    #[test]
    fn test_unknown_path_not_found() {
        let matcher = pets_matcher();
        assert_eq!(
            matcher.match_request(&Method::GET, "/unknown"),
            MatchOutcome::NotFound
        );
    }

    #[test]
    fn test_matching_is_repeatable() {
        let matcher = pets_matcher();
        let first = matcher.match_request(&Method::GET, "/pets/7");
        let second = matcher.match_request(&Method::GET, "/pets/7");
        assert_eq!(first, second);
    }
}
