//! Request-level error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Why a prediction request failed.
///
/// Everything except [`PredictionFailure`](Self::PredictionFailure) is the
/// caller's fault: `400`, or the rejection status for an unreadable body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("No input data provided")]
    EmptyPayload,

    /// The body was rejected before it could be read, e.g. over the size limit.
    #[error("Invalid request body: {message}")]
    UnreadableBody { status: StatusCode, message: String },

    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingField(Vec<String>),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: &'static str },

    #[error("Invalid category value for {field}: '{value}'")]
    UnknownCategory { field: String, value: String },

    #[error("Prediction failed: {0}")]
    PredictionFailure(String),
}

impl PredictionError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictionError::UnreadableBody { status, .. } => *status,
            PredictionError::PredictionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "prediction failed");
        } else {
            tracing::debug!(error = %self, "rejected prediction request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PredictionError::EmptyPayload, "No input data provided")]
    #[case(
        PredictionError::MissingField(vec!["Age".into(), "Job_Title".into()]),
        "Missing required field(s): Age, Job_Title"
    )]
    #[case(
        PredictionError::UnknownCategory { field: "Gender".into(), value: "Unknown".into() },
        "Invalid category value for Gender: 'Unknown'"
    )]
    #[case(
        PredictionError::InvalidField { field: "Age".into(), reason: "expected a number" },
        "Invalid value for Age: expected a number"
    )]
    fn messages(#[case] err: PredictionError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unreadable_body_keeps_its_status() {
        let err = PredictionError::UnreadableBody {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        assert_eq!(err.to_string(), "Invalid request body: length limit exceeded");
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn predictor_failures_are_server_errors() {
        let err = PredictionError::PredictionFailure("boom".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
