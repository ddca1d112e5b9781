//! The handler name convention.

/// A handler name parsed against the lookup convention.
///
/// Three shapes are recognized:
///
/// - `list` resolves a function registered at the root.
/// - `pets.list` resolves a function exactly one level down. Deeper
///   names (`a.b.c`) are outside the convention.
/// - `pets#show` resolves an action type nested under a container,
///   constructed fresh for each request.
///
/// Parsing is purely syntactic. A name can parse and still resolve to
/// nothing when nothing was registered under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerName<'a> {
    /// A registered function, keyed by the full name as written.
    Function(&'a str),

    /// A per-request action instance.
    Instance {
        /// Container the action type is nested under.
        container: &'a str,
        /// The action type's name.
        action: &'a str,
    },
}

impl<'a> HandlerName<'a> {
    /// Parses `name`, returning `None` for anything outside the
    /// convention: empty names or halves, more than one `.` level, or
    /// a `#` mixed with further separators.
    #[must_use]
    pub fn parse(name: &'a str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        if let Some((container, action)) = name.split_once('#') {
            if container.is_empty() || action.is_empty() {
                return None;
            }
            if container.contains(['.', '#']) || action.contains(['.', '#']) {
                return None;
            }
            return Some(Self::Instance { container, action });
        }
        match name.matches('.').count() {
            0 => Some(Self::Function(name)),
            1 => {
                let (scope, member) = name.split_once('.')?;
                if scope.is_empty() || member.is_empty() {
                    None
                } else {
                    Some(Self::Function(name))
                }
            }
            _ => None,
        }
    }
}
