//! Path template parsing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::PathBindings;

/// Identifier rule placeholder names must satisfy.
fn placeholder_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("placeholder name pattern is valid")
    })
}

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Fixed segment matched by string equality.
    Literal(String),
    /// `{name}` placeholder capturing exactly one non-empty segment.
    Placeholder(String),
}

/// Error raised when a template string is malformed.
///
/// Templates come from contract documents, so a malformed one is a
/// contract authoring problem and surfaces before any request is
/// served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{}` placeholder with no name.
    EmptyPlaceholder {
        /// The offending template string.
        template: String,
    },
    /// A placeholder whose name is not a plain identifier.
    InvalidPlaceholderName {
        /// The offending template string.
        template: String,
        /// The rejected placeholder name.
        name: String,
    },
    /// The same placeholder name appearing twice in one template.
    DuplicatePlaceholder {
        /// The offending template string.
        template: String,
        /// The repeated placeholder name.
        name: String,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPlaceholder { template } => {
                write!(f, "template '{template}' contains an unnamed placeholder")
            }
            Self::InvalidPlaceholderName { template, name } => {
                write!(
                    f,
                    "template '{template}' placeholder '{name}' is not a valid identifier"
                )
            }
            Self::DuplicatePlaceholder { template, name } => {
                write!(f, "template '{template}' repeats placeholder '{name}'")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// A parsed path template.
///
/// Parsing is tolerant of leading/trailing slashes and collapses empty
/// segments, so `/pets/`, `pets` and `/pets` are the same template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    /// Parses a template string, validating its placeholders.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut seen = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder {
                        template: raw.to_string(),
                    });
                }
                if !placeholder_name_pattern().is_match(name) {
                    return Err(TemplateError::InvalidPlaceholderName {
                        template: raw.to_string(),
                        name: name.to_string(),
                    });
                }
                if seen.contains(&name) {
                    return Err(TemplateError::DuplicatePlaceholder {
                        template: raw.to_string(),
                        name: name.to_string(),
                    });
                }
                seen.push(name);
                segments.push(TemplateSegment::Placeholder(name.to_string()));
            } else {
                segments.push(TemplateSegment::Literal(part.to_string()));
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns the template string as written.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Returns the placeholder names in template order.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|seg| match seg {
            TemplateSegment::Placeholder(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Returns true if the path segments line up with this template.
    pub(crate) fn matches(&self, path_segments: &[&str]) -> bool {
        if path_segments.len() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(path_segments)
            .all(|(seg, part)| match seg {
                TemplateSegment::Literal(lit) => lit == part,
                TemplateSegment::Placeholder(_) => !part.is_empty(),
            })
    }

    /// Matches and captures placeholder bindings, or `None` on mismatch.
    pub(crate) fn capture(&self, path_segments: &[&str]) -> Option<PathBindings> {
        if path_segments.len() != self.segments.len() {
            return None;
        }
        let mut bindings = PathBindings::new();
        for (seg, part) in self.segments.iter().zip(path_segments) {
            match seg {
                TemplateSegment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                TemplateSegment::Placeholder(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    bindings.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    #[test]
    fn test_parse_literals_and_placeholders() {
        let template = PathTemplate::parse("/orgs/{orgId}/pets/{petId}").unwrap();
        assert_eq!(template.segments().len(), 4);
        let names: Vec<_> = template.placeholder_names().collect();
        assert_eq!(names, vec!["orgId", "petId"]);
    }

    #[test]
    fn test_parse_tolerates_slashes() {
        let with_trailing = PathTemplate::parse("/pets/").unwrap();
        let bare = PathTemplate::parse("pets").unwrap();
        assert_eq!(with_trailing.segments(), bare.segments());
    }

    #[test]
    fn test_parse_root() {
        let root = PathTemplate::parse("/").unwrap();
        assert!(root.segments().is_empty());
        assert!(root.matches(&[]));
    }

    #[test]
    fn test_parse_rejects_empty_placeholder() {
        let err = PathTemplate::parse("/pets/{}").unwrap_err();
        assert!(matches!(err, TemplateError::EmptyPlaceholder { .. }));
    }

    #[test]
    fn test_parse_rejects_invalid_name() {
        let err = PathTemplate::parse("/pets/{pet-id}").unwrap_err();
        assert!(matches!(
            err,
            TemplateError::InvalidPlaceholderName { ref name, .. } if name == "pet-id"
        ));
    }

    #[test]
    fn test_parse_rejects_duplicate_name() {
        let err = PathTemplate::parse("/{id}/children/{id}").unwrap_err();
        assert!(matches!(
            err,
            TemplateError::DuplicatePlaceholder { ref name, .. } if name == "id"
        ));
    }

    #[test]
    fn test_capture_bindings() {
        let template = PathTemplate::parse("/orgs/{orgId}/pets/{petId}").unwrap();
        let bindings = template.capture(&split("/orgs/acme/pets/9")).unwrap();
        assert_eq!(bindings.get("orgId"), Some("acme"));
        assert_eq!(bindings.get("petId"), Some("9"));
    }

    #[test]
    fn test_capture_rejects_length_mismatch() {
        let template = PathTemplate::parse("/pets/{petId}").unwrap();
        assert!(template.capture(&split("/pets")).is_none());
        assert!(template.capture(&split("/pets/1/extra")).is_none());
    }

    #[test]
    fn test_capture_rejects_literal_mismatch() {
        let template = PathTemplate::parse("/pets/{petId}").unwrap();
        assert!(template.capture(&split("/cats/1")).is_none());
    }

    #[test]
    fn test_error_display() {
        let err = PathTemplate::parse("/pets/{}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "template '/pets/{}' contains an unnamed placeholder"
        );
    }
}
