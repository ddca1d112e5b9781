//! Schema checking for individual values.
//!
//! [`SchemaValidator`] is the seam the pipeline validates through: one
//! `(schema, value)` pair in, zero or more [`Violation`]s out. The
//! bundled [`BasicValidator`] covers every kind [`ParamSchema`] can
//! express; a full JSON-Schema engine can be slotted in behind the same
//! trait without touching the pipeline.

use pylon_core::contract::ParamSchema;
use serde_json::Value;

/// One problem found while checking a value against a schema.
///
/// `pointer` addresses the offending location *within* the checked
/// value: the empty string is the value itself, `/name` an object
/// property, `/2` an array element. The pipeline combines the pointer
/// with the value's own source (a named parameter or the request body)
/// when it builds the final error.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Location within the checked value, JSON-pointer style.
    pub pointer: String,
    /// Short human-readable description of the problem.
    pub title: String,
    /// Optional elaboration, such as the allowed values.
    pub detail: Option<String>,
}

impl Violation {
    /// Creates a violation at `pointer` with the given title.
    pub fn new(pointer: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            title: title.into(),
            detail: None,
        }
    }

    /// Attaches an elaboration to the violation.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Checks one value against one schema.
///
/// Implementations must report *every* violation they find, not just
/// the first, so the pipeline can surface them all in a single
/// response.
pub trait SchemaValidator: Send + Sync {
    /// Returns all violations of `schema` by `value`, in document
    /// order. An empty vector means the value conforms.
    fn check(&self, schema: &ParamSchema, value: &Value) -> Vec<Violation>;
}

/// Structural validator for the built-in schema kinds.
///
/// Checks type, string length and enumeration, numeric bounds, array
/// cardinality and element schemas, and object required properties.
/// Object properties absent from the schema are ignored rather than
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicValidator;

impl SchemaValidator for BasicValidator {
    fn check(&self, schema: &ParamSchema, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_at(schema, value, "", &mut violations);
        violations
    }
}

fn check_at(schema: &ParamSchema, value: &Value, pointer: &str, out: &mut Vec<Violation>) {
    match schema {
        ParamSchema::Any => {}
        ParamSchema::String {
            min_length,
            max_length,
            enum_values,
        } => {
            let Some(text) = value.as_str() else {
                out.push(type_mismatch(pointer, "a string", value));
                return;
            };
            let length = text.chars().count();
            if let Some(min) = min_length {
                if length < *min {
                    out.push(Violation::new(
                        pointer,
                        format!("must be at least {min} characters"),
                    ));
                }
            }
            if let Some(max) = max_length {
                if length > *max {
                    out.push(Violation::new(
                        pointer,
                        format!("must be at most {max} characters"),
                    ));
                }
            }
            if !enum_values.is_empty() && !enum_values.iter().any(|allowed| allowed == text) {
                out.push(
                    Violation::new(pointer, "is not one of the allowed values")
                        .with_detail(format!("allowed: {}", enum_values.join(", "))),
                );
            }
        }
        ParamSchema::Integer { minimum, maximum } => {
            let Some(number) = value.as_i64() else {
                out.push(type_mismatch(pointer, "an integer", value));
                return;
            };
            if let Some(min) = minimum {
                if number < *min {
                    out.push(Violation::new(pointer, format!("must be at least {min}")));
                }
            }
            if let Some(max) = maximum {
                if number > *max {
                    out.push(Violation::new(pointer, format!("must be at most {max}")));
                }
            }
        }
        ParamSchema::Number { minimum, maximum } => {
            let Some(number) = value.as_f64() else {
                out.push(type_mismatch(pointer, "a number", value));
                return;
            };
            if let Some(min) = minimum {
                if number < *min {
                    out.push(Violation::new(pointer, format!("must be at least {min}")));
                }
            }
            if let Some(max) = maximum {
                if number > *max {
                    out.push(Violation::new(pointer, format!("must be at most {max}")));
                }
            }
        }
        ParamSchema::Boolean => {
            if !value.is_boolean() {
                out.push(type_mismatch(pointer, "a boolean", value));
            }
        }
        ParamSchema::Array {
            items,
            min_items,
            max_items,
        } => {
            let Some(elements) = value.as_array() else {
                out.push(type_mismatch(pointer, "an array", value));
                return;
            };
            if let Some(min) = min_items {
                if elements.len() < *min {
                    out.push(Violation::new(
                        pointer,
                        format!("must have at least {min} items"),
                    ));
                }
            }
            if let Some(max) = max_items {
                if elements.len() > *max {
                    out.push(Violation::new(
                        pointer,
                        format!("must have at most {max} items"),
                    ));
                }
            }
            for (index, element) in elements.iter().enumerate() {
                check_at(items, element, &format!("{pointer}/{index}"), out);
            }
        }
        ParamSchema::Object {
            properties,
            required,
        } => {
            let Some(map) = value.as_object() else {
                out.push(type_mismatch(pointer, "an object", value));
                return;
            };
            for name in required {
                if !map.contains_key(name) {
                    out.push(Violation::new(format!("{pointer}/{name}"), "is required"));
                }
            }
            for (name, property_schema) in properties {
                if let Some(property) = map.get(name) {
                    check_at(property_schema, property, &format!("{pointer}/{name}"), out);
                }
            }
        }
    }
}

fn type_mismatch(pointer: &str, expected: &str, value: &Value) -> Violation {
    Violation::new(pointer, format!("must be {expected}"))
        .with_detail(format!("got {}", value_kind(value)))
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
