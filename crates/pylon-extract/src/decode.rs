//! Declaration-driven decoding of raw parameter text.

use pylon_core::contract::{ParamSchema, ParamStyle, ParameterDeclaration};
use serde_json::{Map, Value};

/// Decodes raw wire text into typed values per a declaration.
///
/// The extractor reaches path bindings only through this seam, so an
/// operation with no declared path parameters provably never exercises
/// path decoding; tests swap in a failing decoder to hold that line.
pub trait ParamDecoder: Send + Sync {
    /// Decodes one raw path binding.
    fn decode_path(&self, declaration: &ParameterDeclaration, raw: &str) -> Value;

    /// Decodes a query parameter from the request's decoded key/value
    /// pairs. `None` means the parameter is absent on the wire.
    fn decode_query(
        &self,
        declaration: &ParameterDeclaration,
        pairs: &[(String, String)],
    ) -> Option<Value>;
}

/// The standard style-aware decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleDecoder;

impl ParamDecoder for StyleDecoder {
    fn decode_path(&self, declaration: &ParameterDeclaration, raw: &str) -> Value {
        // Path parameters are simple style: comma-separated arrays,
        // plain scalars otherwise.
        match declaration.schema() {
            ParamSchema::Array { items, .. } => split_list(raw, items),
            schema => coerce(schema, raw),
        }
    }

    fn decode_query(
        &self,
        declaration: &ParameterDeclaration,
        pairs: &[(String, String)],
    ) -> Option<Value> {
        let name = declaration.name();
        match declaration.param_style() {
            ParamStyle::DeepObject => decode_deep_object(declaration, pairs),
            ParamStyle::Form | ParamStyle::Simple => match declaration.schema() {
                ParamSchema::Array { items, .. } => {
                    if declaration.is_exploded() {
                        let elements: Vec<Value> = pairs
                            .iter()
                            .filter(|(key, _)| key == name)
                            .map(|(_, value)| coerce(items, value))
                            .collect();
                        if elements.is_empty() {
                            None
                        } else {
                            Some(Value::Array(elements))
                        }
                    } else {
                        last_value(pairs, name).map(|raw| split_list(raw, items))
                    }
                }
                schema => last_value(pairs, name).map(|raw| coerce(schema, raw)),
            },
        }
    }
}

/// Builds an object from `name[prop]=value` pairs.
fn decode_deep_object(
    declaration: &ParameterDeclaration,
    pairs: &[(String, String)],
) -> Option<Value> {
    let name = declaration.name();
    let properties = match declaration.schema() {
        ParamSchema::Object { properties, .. } => Some(properties),
        _ => None,
    };

    let mut object = Map::new();
    for (key, value) in pairs {
        if let Some(prop) = deep_object_property(key, name) {
            let coerced = properties
                .and_then(|props| props.get(prop))
                .map_or_else(|| Value::String(value.clone()), |schema| coerce(schema, value));
            object.insert(prop.to_string(), coerced);
        }
    }

    if object.is_empty() {
        None
    } else {
        Some(Value::Object(object))
    }
}

/// Extracts `prop` from a `name[prop]` key, or `None` if the key is
/// for a different parameter.
fn deep_object_property<'k>(key: &'k str, name: &str) -> Option<&'k str> {
    let prop = key
        .strip_prefix(name)?
        .strip_prefix('[')?
        .strip_suffix(']')?;
    (!prop.is_empty()).then_some(prop)
}

/// Last occurrence of `name` in wire order.
fn last_value<'p>(pairs: &'p [(String, String)], name: &str) -> Option<&'p str> {
    pairs
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Splits a comma-joined list and coerces each element.
fn split_list(raw: &str, items: &ParamSchema) -> Value {
    if raw.is_empty() {
        return Value::Array(Vec::new());
    }
    Value::Array(raw.split(',').map(|piece| coerce(items, piece)).collect())
}

/// Coerces raw text toward the schema kind. Text that does not parse
/// stays a raw string so the validator can report the mismatch.
fn coerce(schema: &ParamSchema, raw: &str) -> Value {
    match schema {
        ParamSchema::Integer { .. } => raw
            .parse::<i64>()
            .map_or_else(|_| Value::String(raw.to_string()), Value::from),
        ParamSchema::Number { .. } => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| Value::String(raw.to_string()), Value::Number),
        ParamSchema::Boolean => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(query: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce(&ParamSchema::integer(), "2"), json!(2));
        assert_eq!(coerce(&ParamSchema::integer(), "-7"), json!(-7));
        assert_eq!(coerce(&ParamSchema::number(), "2.5"), json!(2.5));
        assert_eq!(coerce(&ParamSchema::boolean(), "true"), json!(true));
        assert_eq!(coerce(&ParamSchema::string(), "abc"), json!("abc"));
    }

    #[test]
    fn test_coerce_keeps_unparsable_text() {
        assert_eq!(coerce(&ParamSchema::integer(), "abc"), json!("abc"));
        assert_eq!(coerce(&ParamSchema::integer(), "2.5"), json!("2.5"));
        assert_eq!(coerce(&ParamSchema::number(), "NaN"), json!("NaN"));
        assert_eq!(coerce(&ParamSchema::boolean(), "TRUE"), json!("TRUE"));
    }

    #[test]
    fn test_path_simple_scalar() {
        let decl = ParameterDeclaration::path(
            "petId",
            ParamSchema::string(),
        );
        assert_eq!(StyleDecoder.decode_path(&decl, "1"), json!("1"));
    }

    #[test]
    fn test_path_simple_array_splits_commas() {
        let decl = ParameterDeclaration::path(
            "ids",
            ParamSchema::array(ParamSchema::integer()),
        );
        assert_eq!(StyleDecoder.decode_path(&decl, "3,4,5"), json!([3, 4, 5]));
    }

    #[test]
    fn test_query_scalar_takes_last_occurrence() {
        let decl =
            ParameterDeclaration::query("limit", ParamSchema::integer());
        let value = StyleDecoder.decode_query(&decl, &pairs("limit=1&limit=2"));
        assert_eq!(value, Some(json!(2)));
    }

    #[test]
    fn test_query_absent_is_none() {
        let decl =
            ParameterDeclaration::query("limit", ParamSchema::integer());
        assert_eq!(StyleDecoder.decode_query(&decl, &pairs("other=1")), None);
        assert_eq!(StyleDecoder.decode_query(&decl, &[]), None);
    }

    #[test]
    fn test_query_empty_value_is_empty_string() {
        let decl =
            ParameterDeclaration::query("status", ParamSchema::string());
        let value = StyleDecoder.decode_query(&decl, &pairs("status="));
        assert_eq!(value, Some(json!("")));
    }

    #[test]
    fn test_query_exploded_array_repeats_key() {
        let decl = ParameterDeclaration::query(
            "tag",
            ParamSchema::array(ParamSchema::string()),
        );
        let value = StyleDecoder.decode_query(&decl, &pairs("tag=a&other=x&tag=b"));
        assert_eq!(value, Some(json!(["a", "b"])));
    }

    #[test]
    fn test_query_unexploded_array_splits_commas() {
        let decl = ParameterDeclaration::query(
            "ids",
            ParamSchema::array(ParamSchema::integer()),
        )
        .explode(false);
        let value = StyleDecoder.decode_query(&decl, &pairs("ids=3,4,5"));
        assert_eq!(value, Some(json!([3, 4, 5])));
    }

    #[test]
    fn test_query_deep_object() {
        let decl = ParameterDeclaration::query(
            "filter",
            ParamSchema::object()
                .property("age", ParamSchema::integer())
                .property("name", ParamSchema::string()),
        )
        .style(ParamStyle::DeepObject);

        let value = StyleDecoder.decode_query(&decl, &pairs("filter%5Bage%5D=3&filter%5Bname%5D=rex"));
        assert_eq!(value, Some(json!({ "age": 3, "name": "rex" })));
    }

    #[test]
    fn test_deep_object_without_property_schema_keeps_strings() {
        let decl = ParameterDeclaration::query(
            "filter",
            ParamSchema::object(),
        )
        .style(ParamStyle::DeepObject);

        let value = StyleDecoder.decode_query(&decl, &pairs("filter%5Bage%5D=3"));
        assert_eq!(value, Some(json!({ "age": "3" })));
    }

    #[test]
    fn test_deep_object_key_parsing() {
        assert_eq!(deep_object_property("filter[age]", "filter"), Some("age"));
        assert_eq!(deep_object_property("filter[]", "filter"), None);
        assert_eq!(deep_object_property("filter", "filter"), None);
        assert_eq!(deep_object_property("other[age]", "filter"), None);
    }
}
