use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::admissions::router::error_response;
use crate::workflows::admissions::AdmissionsServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Record(serde_json::Error),
    Admissions(AdmissionsServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Record(err) => write!(f, "malformed application record: {}", err),
            AppError::Admissions(err) => write!(f, "admissions error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Record(err) => Some(err),
            AppError::Admissions(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Admissions(err) => return error_response(err),
            AppError::Record(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Record(value)
    }
}

impl From<AdmissionsServiceError> for AppError {
    fn from(value: AdmissionsServiceError) -> Self {
        Self::Admissions(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::admissions::{ApplicationId, RepositoryError, ValidationError};

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[test]
    fn admissions_errors_map_to_distinct_statuses() {
        let invalid = AppError::from(AdmissionsServiceError::from(
            ValidationError::UnknownDecision("archive".to_string()),
        ));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(AdmissionsServiceError::NotFound(
            ApplicationId::new(9).expect("positive id"),
        ));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admissions_errors_render_like_the_router() {
        let unavailable = || {
            AdmissionsServiceError::Repository(RepositoryError::Unavailable(
                "pool exhausted".to_string(),
            ))
        };

        let via_app = AppError::from(unavailable()).into_response();
        let via_router = error_response(unavailable());
        assert_eq!(via_app.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(via_app.status(), via_router.status());
        assert_eq!(json_body(via_app).await, json_body(via_router).await);
    }

    #[tokio::test]
    async fn record_errors_stay_bad_requests() {
        let malformed = serde_json::from_str::<serde_json::Value>("{")
            .expect_err("truncated json");
        let response = AppError::from(malformed).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .is_some_and(|message| message.starts_with("malformed application record")));
    }
}
