use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::export::CsvExport;
use super::listing::{ApplicationFilter, ListQuery};
use super::repository::ApplicationRepository;
use super::service::{AdmissionsService, AdmissionsServiceError};
use super::validation::{parse_application_id, ValidationError};

/// Body accepted by the decision endpoint.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Router exposing listing, risk assessment, decision, and export endpoints.
pub fn admissions_router<R>(service: Arc<AdmissionsService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/admissions/applications", get(list_handler::<R>))
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(record_handler::<R>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/risk",
            get(risk_handler::<R>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/decision",
            post(decision_handler::<R>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/export.csv",
            get(export_handler::<R>),
        )
        .with_state(service)
}

/// 400 for validation, 404 for unknown ids, 503 for retryable storage failures.
pub(crate) fn error_response(error: AdmissionsServiceError) -> Response {
    let status = match &error {
        AdmissionsServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        AdmissionsServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        other if other.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
        "retryable": error.is_retryable(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<AdmissionsService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let listing = ApplicationFilter::from_query(&query)
        .map_err(AdmissionsServiceError::from)
        .and_then(|filter| service.list(&filter));

    match listing {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<R>(
    State(service): State<Arc<AdmissionsService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let record = parse_application_id(&application_id)
        .map_err(AdmissionsServiceError::from)
        .and_then(|id| service.get(id));

    match record {
        Ok(record) => {
            let payload = json!({
                "application": record,
                "status_view": record.status_view(),
                "documents": record.document_summary(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn risk_handler<R>(
    State(service): State<Arc<AdmissionsService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let assessment = parse_application_id(&application_id)
        .map_err(AdmissionsServiceError::from)
        .and_then(|id| service.assess(id));

    match assessment {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R>(
    State(service): State<Arc<AdmissionsService<R>>>,
    Path(application_id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = ValidationError::MalformedBody(rejection.body_text());
            return error_response(error.into());
        }
    };

    match service.submit_decision(
        &application_id,
        &request.decision,
        request.notes.as_deref(),
    ) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<AdmissionsService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let export = parse_application_id(&application_id)
        .map_err(AdmissionsServiceError::from)
        .and_then(|id| service.export_csv(id));

    match export {
        Ok(CsvExport { file_name, body }) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file_name}\""),
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}
