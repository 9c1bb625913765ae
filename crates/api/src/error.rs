//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use composer::{ComposeError, RegistryError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The composer could not run the pair at all.
    Compose(ComposeError),
    /// Participators were wired incorrectly at startup.
    Registry(RegistryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Compose(err) => tracing::error!(error = %err, "composition aborted"),
            ApiError::Registry(err) => {
                tracing::error!(error = %err, "invalid participator registry")
            }
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Compose(err) => write!(f, "{err}"),
            ApiError::Registry(err) => write!(f, "{err}"),
        }
    }
}

impl From<ComposeError> for ApiError {
    fn from(err: ComposeError) -> Self {
        ApiError::Compose(err)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_compose_error_is_500_with_message() {
        let err = ApiError::from(ComposeError::NoParticipators {
            request: "Ping",
            response: "Pong",
        });
        let expected = err.to_string();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], expected);
        assert!(expected.contains("Ping"));
    }
}
