//! The extractor proper.

use std::sync::Arc;

use pylon_core::contract::OperationDescriptor;
use pylon_core::ParamMap;
use pylon_router::PathBindings;

use crate::decode::{ParamDecoder, StyleDecoder};

/// Unpacks raw path bindings and the raw query string into typed
/// parameter values for one operation.
///
/// Only declared parameters are extracted; raw bindings for
/// undeclared placeholders and undeclared query keys are ignored.
/// Path and query values land in one shared namespace. Operations
/// declaring zero path parameters skip path decoding entirely.
#[derive(Clone)]
pub struct ParameterExtractor {
    decoder: Arc<dyn ParamDecoder>,
}

impl ParameterExtractor {
    /// Creates an extractor with the standard style-aware decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: Arc::new(StyleDecoder),
        }
    }

    /// Creates an extractor with a custom decoder.
    #[must_use]
    pub fn with_decoder(decoder: Arc<dyn ParamDecoder>) -> Self {
        Self { decoder }
    }

    /// Extracts the operation's declared parameters.
    ///
    /// `query` is the raw query string without its leading `?`; pass
    /// `None` when the request has none. Extraction itself never
    /// fails: values that do not parse as their declared kind stay
    /// raw strings for the validator to flag.
    #[must_use]
    pub fn extract(
        &self,
        operation: &OperationDescriptor,
        bindings: &PathBindings,
        query: Option<&str>,
    ) -> ParamMap {
        let mut params = ParamMap::new();

        let path_declarations = operation.path_parameters();
        if !path_declarations.is_empty() {
            for declaration in path_declarations {
                if let Some(raw) = bindings.get(declaration.name()) {
                    params.insert(
                        declaration.name().to_string(),
                        self.decoder.decode_path(declaration, raw),
                    );
                }
            }
        }

        let query_declarations = operation.query_parameters();
        if !query_declarations.is_empty() {
            let pairs = query.map(parse_pairs).unwrap_or_default();
            for declaration in query_declarations {
                if let Some(value) = self.decoder.decode_query(declaration, &pairs) {
                    params.insert(declaration.name().to_string(), value);
                }
            }
        }

        tracing::trace!(
            operation_id = operation.operation_id(),
            extracted = params.len(),
            "parameters extracted"
        );
        params
    }
}

impl Default for ParameterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParameterExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterExtractor").finish_non_exhaustive()
    }
}

/// Percent-decodes the query string into ordered key/value pairs.
/// A malformed query decodes to no pairs, the same as an absent one.
fn parse_pairs(query: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str(query).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_core::contract::{ParamSchema, ParameterDeclaration};
    use serde_json::{json, Value};

    fn list_pets() -> OperationDescriptor {
        OperationDescriptor::builder("listPets")
            .path("/pets")
            .query_param(ParameterDeclaration::query("limit", ParamSchema::integer()))
            .query_param(ParameterDeclaration::query("status", ParamSchema::string()))
            .build()
    }

    fn show_pet() -> OperationDescriptor {
        OperationDescriptor::builder("showPet")
            .path("/pets/{petId}")
            .path_param(ParameterDeclaration::path("petId", ParamSchema::string()))
            .build()
    }

    #[test]
    fn test_query_extraction_coerces_types() {
        let extractor = ParameterExtractor::new();
        let params = extractor.extract(&list_pets(), &PathBindings::new(), Some("limit=2"));
        assert_eq!(params.get("limit"), Some(&json!(2)));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_path_extraction_reads_bindings() {
        let extractor = ParameterExtractor::new();
        let mut bindings = PathBindings::new();
        bindings.insert("petId", "1");
        let params = extractor.extract(&show_pet(), &bindings, None);
        assert_eq!(params.get("petId"), Some(&json!("1")));
    }

    #[test]
    fn test_undeclared_values_are_ignored() {
        let extractor = ParameterExtractor::new();
        let mut bindings = PathBindings::new();
        bindings.insert("petId", "1");
        bindings.insert("stray", "x");
        let params = extractor.extract(&show_pet(), &bindings, Some("limit=2&noise=9"));
        assert_eq!(params.len(), 1);
        assert!(params.get("stray").is_none());
        assert!(params.get("noise").is_none());
    }

    #[test]
    fn test_unparsable_value_stays_raw() {
        let extractor = ParameterExtractor::new();
        let params = extractor.extract(
            &list_pets(),
            &PathBindings::new(),
            Some("limit=abc&status="),
        );
        assert_eq!(params.get("limit"), Some(&json!("abc")));
        assert_eq!(params.get("status"), Some(&json!("")));
    }

    #[test]
    fn test_no_query_no_params() {
        let extractor = ParameterExtractor::new();
        let params = extractor.extract(&list_pets(), &PathBindings::new(), None);
        assert!(params.is_empty());
        let params = extractor.extract(&list_pets(), &PathBindings::new(), Some(""));
        assert!(params.is_empty());
    }

    /// Decoder double that refuses to decode paths.
    struct NoPathDecoder;

    impl ParamDecoder for NoPathDecoder {
        fn decode_path(&self, declaration: &ParameterDeclaration, _raw: &str) -> Value {
            panic!("path decoding invoked for '{}'", declaration.name());
        }

        fn decode_query(
            &self,
            declaration: &ParameterDeclaration,
            pairs: &[(String, String)],
        ) -> Option<Value> {
            crate::StyleDecoder.decode_query(declaration, pairs)
        }
    }

    #[test]
    fn test_zero_path_params_skip_path_decoding() {
        let extractor = ParameterExtractor::with_decoder(Arc::new(NoPathDecoder));
        // Raw bindings may still be present (e.g. from an outer mount);
        // with nothing declared they must never reach the decoder.
        let mut bindings = PathBindings::new();
        bindings.insert("stray", "x");
        let params = extractor.extract(&list_pets(), &bindings, Some("limit=2"));
        assert_eq!(params.get("limit"), Some(&json!(2)));
    }

    #[test]
    fn test_declared_path_params_do_reach_decoder() {
        let extractor = ParameterExtractor::with_decoder(Arc::new(NoPathDecoder));
        let mut bindings = PathBindings::new();
        bindings.insert("petId", "1");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            extractor.extract(&show_pet(), &bindings, None)
        }));
        assert!(result.is_err());
    }
}
