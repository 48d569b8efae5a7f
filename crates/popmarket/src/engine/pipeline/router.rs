use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ActorRole, PipelineId};
use super::machine::{PipelineAction, TransitionError};
use super::repository::{PipelineRepository, PipelineStoreError};
use super::service::{DealPipelineService, PipelineServiceError, ProposalSubmission};

/// Router builder exposing HTTP endpoints for the deal lifecycle.
pub fn pipeline_router<R>(service: Arc<DealPipelineService<R>>) -> Router
where
    R: PipelineRepository + 'static,
{
    Router::new()
        .route("/api/v1/pipelines", post(create_handler::<R>))
        .route("/api/v1/pipelines/metrics", get(metrics_handler::<R>))
        .route("/api/v1/pipelines/:pipeline_id", get(get_handler::<R>))
        .route(
            "/api/v1/pipelines/:pipeline_id/actions",
            post(action_handler::<R>),
        )
        .with_state(service)
}

/// One action submission: who is acting, and what they attempt.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub actor: ActorRole,
    #[serde(flatten)]
    pub action: PipelineAction,
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<DealPipelineService<R>>>,
    axum::Json(submission): axum::Json<ProposalSubmission>,
) -> Response
where
    R: PipelineRepository + 'static,
{
    match service.propose(submission, Utc::now()) {
        Ok(pipeline) => (StatusCode::CREATED, axum::Json(pipeline)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<DealPipelineService<R>>>,
    Path(pipeline_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
{
    match service.get(&PipelineId(pipeline_id)) {
        Ok(pipeline) => (StatusCode::OK, axum::Json(pipeline)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn action_handler<R>(
    State(service): State<Arc<DealPipelineService<R>>>,
    Path(pipeline_id): Path<String>,
    axum::Json(request): axum::Json<ActionRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
{
    match service.apply(
        &PipelineId(pipeline_id),
        request.actor,
        request.action,
        Utc::now(),
    ) {
        Ok(pipeline) => (StatusCode::OK, axum::Json(pipeline)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn metrics_handler<R>(
    State(service): State<Arc<DealPipelineService<R>>>,
) -> Response
where
    R: PipelineRepository + 'static,
{
    match service.metrics() {
        Ok(metrics) => (StatusCode::OK, axum::Json(metrics)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PipelineServiceError) -> Response {
    let status = match &error {
        PipelineServiceError::Proposal(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineServiceError::Transition(transition) => match transition {
            TransitionError::Pricing(_) | TransitionError::SettlementInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::CONFLICT,
        },
        PipelineServiceError::Store(store) => match store {
            PipelineStoreError::NotFound => StatusCode::NOT_FOUND,
            PipelineStoreError::AlreadyExists | PipelineStoreError::VersionConflict { .. } => {
                StatusCode::CONFLICT
            }
            PipelineStoreError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    };

    let body = json!({ "error": error.to_string() });
    (status, axum::Json(body)).into_response()
}
