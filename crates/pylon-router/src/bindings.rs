//! Raw path-variable bindings captured by a route match.

use smallvec::SmallVec;

/// Bindings stored inline before spilling to the heap.
///
/// Contracts rarely declare more than a handful of path variables per
/// template, so this keeps the common case allocation-free.
const INLINE_BINDINGS: usize = 4;

/// Placeholder-name to raw-value bindings from a matched path.
///
/// Values are the path segments exactly as they appeared on the wire;
/// typing them is the parameter extractor's job. Insertion order is
/// template order.
///
/// # Example
///
/// ```rust
/// use pylon_router::PathBindings;
///
/// let mut bindings = PathBindings::new();
/// bindings.insert("orgId", "acme");
/// bindings.insert("petId", "9");
///
/// assert_eq!(bindings.get("orgId"), Some("acme"));
/// assert_eq!(bindings.get("missing"), None);
/// assert_eq!(bindings.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathBindings {
    entries: SmallVec<[(String, String); INLINE_BINDINGS]>,
}

impl PathBindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding. Later inserts with the same name shadow
    /// earlier ones for `get`, which templates never produce.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the raw value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no bindings were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates bindings in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates bound names in capture order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl<'a> IntoIterator for &'a PathBindings {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PathBindings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
