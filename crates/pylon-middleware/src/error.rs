//! Pipeline error types.

use pylon_core::ValidationFailure;

use crate::types::Response;

/// Error a stage surfaces to the gate's caller instead of rendering a
/// response itself.
///
/// Most failures inside the pipeline become HTTP responses. This type
/// exists for the configurations that choose to receive the failure
/// directly, such as raise-on-validation-error mode.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Request validation failed while the gate is configured to raise
    /// rather than render the error response.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

/// Outcome of running a request through the pipeline.
pub type PipelineResult = Result<Response, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_core::ValidationError;

    #[test]
    fn test_validation_error_is_transparent() {
        let failure = ValidationFailure::new(
            "listPets",
            vec![ValidationError::parameter("limit", "must be an integer")],
        );
        let message = failure.to_string();
        let error = PipelineError::from(failure);
        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn test_failure_is_recoverable_from_the_error() {
        let failure = ValidationFailure::new(
            "listPets",
            vec![ValidationError::parameter("limit", "must be an integer")],
        );
        let PipelineError::Validation(recovered) = PipelineError::from(failure);
        assert_eq!(recovered.errors().len(), 1);
    }
}
