use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::{CheckinError, CheckinId, CheckinRequest};
use super::repository::{CheckinRepository, CodeSource, PopupDirectory};
use super::service::CheckinService;

/// Router builder exposing HTTP endpoints for visit verification.
pub fn checkin_router<D, C, R>(service: Arc<CheckinService<D, C, R>>) -> Router
where
    D: PopupDirectory + 'static,
    C: CodeSource + 'static,
    R: CheckinRepository + 'static,
{
    Router::new()
        .route("/api/v1/checkins", post(submit_handler::<D, C, R>))
        .route("/api/v1/checkins/:checkin_id", get(record_handler::<D, C, R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<D, C, R>(
    State(service): State<Arc<CheckinService<D, C, R>>>,
    axum::Json(request): axum::Json<CheckinRequest>,
) -> Response
where
    D: PopupDirectory + 'static,
    C: CodeSource + 'static,
    R: CheckinRepository + 'static,
{
    match service.submit(request, Utc::now()) {
        Ok(result) => (StatusCode::CREATED, axum::Json(result)).into_response(),
        Err(error @ CheckinError::PopupNotFound(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(
            error @ (CheckinError::InvalidCoordinates { .. } | CheckinError::InvalidAccuracy(_)),
        ) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn record_handler<D, C, R>(
    State(service): State<Arc<CheckinService<D, C, R>>>,
    Path(checkin_id): Path<String>,
) -> Response
where
    D: PopupDirectory + 'static,
    C: CodeSource + 'static,
    R: CheckinRepository + 'static,
{
    let id = CheckinId(checkin_id);
    match service.get(&id) {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": format!("check-in '{}' not found", id.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
