//! The per-operation validation pass.

use std::sync::Arc;

use pylon_core::contract::{OperationDescriptor, ParameterDeclaration};
use pylon_core::{ParamMap, ValidationError, ValidationFailure};
use serde_json::Value;

use crate::validator::{BasicValidator, SchemaValidator, Violation};

/// Runs an operation's declared checks over its normalized parameters
/// and an optional decoded body, collecting every failure before
/// reporting.
///
/// Checks run in a fixed order: query parameters, then path parameters,
/// then the request body. A later phase always runs even when an
/// earlier one found problems, so a single response carries the full
/// set of violations.
#[derive(Clone)]
pub struct ValidationPipeline {
    validator: Arc<dyn SchemaValidator>,
}

impl ValidationPipeline {
    /// Creates a pipeline backed by the structural [`BasicValidator`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_validator(Arc::new(BasicValidator))
    }

    /// Creates a pipeline backed by a custom validator.
    #[must_use]
    pub fn with_validator(validator: Arc<dyn SchemaValidator>) -> Self {
        Self { validator }
    }

    /// Validates `params` and `body` against `operation`.
    ///
    /// `params` is the normalized map produced by parameter extraction;
    /// `body` is the decoded request body, or `None` when the request
    /// carried none. A body is only checked when the operation declares
    /// a body schema. `Ok(())` means the request may proceed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] carrying one [`ValidationError`]
    /// per violation, in check order.
    pub fn validate(
        &self,
        operation: &OperationDescriptor,
        params: &ParamMap,
        body: Option<&Value>,
    ) -> Result<(), ValidationFailure> {
        let mut errors = Vec::new();

        self.check_parameters(operation.query_parameters(), params, &mut errors);
        self.check_parameters(operation.path_parameters(), params, &mut errors);
        self.check_body(operation, body, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                operation_id = operation.operation_id(),
                errors = errors.len(),
                "request validation failed"
            );
            Err(ValidationFailure::new(operation.operation_id(), errors))
        }
    }

    fn check_parameters(
        &self,
        declarations: &[ParameterDeclaration],
        params: &ParamMap,
        errors: &mut Vec<ValidationError>,
    ) {
        for declaration in declarations {
            let name = declaration.name();
            let Some(value) = params.get(name) else {
                if declaration.is_required() {
                    errors.push(ValidationError::parameter(name, "is required"));
                }
                continue;
            };
            // A present-but-empty required parameter ("?status=") is a
            // distinct failure from an absent one.
            if declaration.is_required() && value.as_str() == Some("") {
                errors.push(ValidationError::parameter(name, "must not be empty"));
                continue;
            }
            for violation in self.validator.check(declaration.schema(), value) {
                errors.push(parameter_error(name, violation));
            }
        }
    }

    fn check_body(
        &self,
        operation: &OperationDescriptor,
        body: Option<&Value>,
        errors: &mut Vec<ValidationError>,
    ) {
        let Some(schema) = operation.request_body_schema() else {
            return;
        };
        let Some(body) = body else {
            return;
        };
        for violation in self.validator.check(schema, body) {
            let mut error = ValidationError::pointer(violation.pointer, violation.title);
            if let Some(detail) = violation.detail {
                error = error.with_detail(detail);
            }
            errors.push(error);
        }
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPipeline").finish_non_exhaustive()
    }
}

/// Folds a violation found inside a parameter value into a
/// parameter-sourced error, keeping nested pointers visible in the
/// detail.
fn parameter_error(name: &str, violation: Violation) -> ValidationError {
    let error = ValidationError::parameter(name, violation.title);
    match (violation.pointer.is_empty(), violation.detail) {
        (true, None) => error,
        (true, Some(detail)) => error.with_detail(detail),
        (false, None) => error.with_detail(format!("at '{}'", violation.pointer)),
        (false, Some(detail)) => {
            error.with_detail(format!("at '{}': {detail}", violation.pointer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_core::contract::ParamSchema;
    use pylon_core::ErrorSource;
    use serde_json::json;

    fn list_pets() -> OperationDescriptor {
        OperationDescriptor::builder("listPets")
            .path("/pets")
            .query_param(
                ParameterDeclaration::query("limit", ParamSchema::integer().minimum(1))
                    .required(),
            )
            .query_param(
                ParameterDeclaration::query("status", ParamSchema::string()).required(),
            )
            .build()
    }

    fn params(entries: &[(&str, Value)]) -> ParamMap {
        entries
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn test_conforming_request_passes() {
        let operation = list_pets();
        let params = params(&[("limit", json!(5)), ("status", json!("available"))]);
        assert!(ValidationPipeline::new()
            .validate(&operation, &params, None)
            .is_ok());
    }

    #[test]
    fn test_all_failures_are_aggregated_into_one_report() {
        // limit survives coercion as the raw string and status is
        // present but empty: both must be reported together.
        let operation = list_pets();
        let params = params(&[("limit", json!("abc")), ("status", json!(""))]);

        let failure = ValidationPipeline::new()
            .validate(&operation, &params, None)
            .expect_err("both parameters are invalid");

        assert_eq!(failure.operation_id(), "listPets");
        assert_eq!(failure.errors().len(), 2);
        assert_eq!(
            failure.errors()[0].source,
            ErrorSource::Parameter("limit".into()),
        );
        assert_eq!(failure.errors()[0].title, "must be an integer");
        assert_eq!(
            failure.errors()[1].source,
            ErrorSource::Parameter("status".into()),
        );
        assert_eq!(failure.errors()[1].title, "must not be empty");
    }

    #[test]
    fn test_missing_required_parameter_is_reported() {
        let operation = list_pets();
        let params = params(&[("limit", json!(5))]);

        let failure = ValidationPipeline::new()
            .validate(&operation, &params, None)
            .expect_err("status is required");
        assert_eq!(failure.errors().len(), 1);
        assert_eq!(failure.errors()[0].title, "is required");
    }

    #[test]
    fn test_missing_optional_parameter_is_fine() {
        let operation = OperationDescriptor::builder("listPets")
            .query_param(ParameterDeclaration::query("limit", ParamSchema::integer()))
            .build();
        assert!(ValidationPipeline::new()
            .validate(&operation, &ParamMap::new(), None)
            .is_ok());
    }

    #[test]
    fn test_query_errors_precede_path_errors() {
        let operation = OperationDescriptor::builder("showPet")
            .path("/pets/{petId}")
            .path_param(ParameterDeclaration::path("petId", ParamSchema::integer()))
            .query_param(
                ParameterDeclaration::query("limit", ParamSchema::integer()).required(),
            )
            .build();
        let params = params(&[("petId", json!("rex")), ("limit", json!("abc"))]);

        let failure = ValidationPipeline::new()
            .validate(&operation, &params, None)
            .expect_err("both locations are invalid");
        assert_eq!(failure.errors().len(), 2);
        assert_eq!(
            failure.errors()[0].source,
            ErrorSource::Parameter("limit".into()),
        );
        assert_eq!(
            failure.errors()[1].source,
            ErrorSource::Parameter("petId".into()),
        );
    }

    #[test]
    fn test_body_violations_carry_json_pointers() {
        let operation = OperationDescriptor::builder("createPet")
            .path("/pets")
            .request_body(
                ParamSchema::object()
                    .property("name", ParamSchema::string())
                    .property("age", ParamSchema::integer())
                    .require("name"),
            )
            .build();

        let failure = ValidationPipeline::new()
            .validate(&operation, &ParamMap::new(), Some(&json!({"age": "old"})))
            .expect_err("name missing and age mistyped");
        assert_eq!(failure.errors().len(), 2);
        assert_eq!(failure.errors()[0].source, ErrorSource::Pointer("/name".into()));
        assert_eq!(failure.errors()[0].title, "is required");
        assert_eq!(failure.errors()[1].source, ErrorSource::Pointer("/age".into()));
    }

    #[test]
    fn test_body_is_not_checked_without_a_declared_schema() {
        let operation = list_pets();
        let params = params(&[("limit", json!(5)), ("status", json!("ok"))]);
        assert!(ValidationPipeline::new()
            .validate(&operation, &params, Some(&json!("anything")))
            .is_ok());
    }

    #[test]
    fn test_absent_body_skips_body_checks() {
        let operation = OperationDescriptor::builder("createPet")
            .request_body(ParamSchema::object().require("name"))
            .build();
        assert!(ValidationPipeline::new()
            .validate(&operation, &ParamMap::new(), None)
            .is_ok());
    }

    #[test]
    fn test_body_errors_come_after_parameter_errors() {
        let operation = OperationDescriptor::builder("createPet")
            .query_param(
                ParameterDeclaration::query("dryRun", ParamSchema::boolean()).required(),
            )
            .request_body(ParamSchema::object().require("name"))
            .build();

        let failure = ValidationPipeline::new()
            .validate(&operation, &ParamMap::new(), Some(&json!({})))
            .expect_err("parameter and body both invalid");
        assert!(matches!(failure.errors()[0].source, ErrorSource::Parameter(_)));
        assert!(matches!(failure.errors()[1].source, ErrorSource::Pointer(_)));
    }

    #[test]
    fn test_nested_parameter_violation_keeps_its_pointer_in_the_detail() {
        let operation = OperationDescriptor::builder("listPets")
            .query_param(ParameterDeclaration::query(
                "tags",
                ParamSchema::array(ParamSchema::string().min_length(1)),
            ))
            .build();
        let params = params(&[("tags", json!(["ok", ""]))]);

        let failure = ValidationPipeline::new()
            .validate(&operation, &params, None)
            .expect_err("second tag is empty");
        assert_eq!(failure.errors()[0].detail.as_deref(), Some("at '/1'"));
    }
}
