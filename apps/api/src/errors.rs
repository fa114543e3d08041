use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Every failure is terminal for the current request; nothing here is retried.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing credentials for the hosted model.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unreadable or image-only PDF.
    #[error("Error extracting PDF text: {0}")]
    Extraction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport/service failure or an empty model answer.
    #[error("Model Error: {0}")]
    Model(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The model client is not configured".to_string(),
                )
            }
            AppError::Extraction(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                self.to_string(),
            ),
            AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            AppError::Model(msg) => {
                tracing::error!("Model error: {msg}");
                (StatusCode::BAD_GATEWAY, "MODEL_ERROR", self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_origin_prefix() {
        let err = AppError::Extraction("broken xref".to_string());
        assert_eq!(err.to_string(), "Error extracting PDF text: broken xref");

        let err = AppError::Model("connection refused".to_string());
        assert_eq!(err.to_string(), "Model Error: connection refused");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Extraction("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Model("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Internal(anyhow::anyhow!("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
