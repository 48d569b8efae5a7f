use std::io::Cursor;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::infra::AppState;
use popmarket::engine::cache::TtlCache;
use popmarket::engine::checkin::{
    checkin_router, CheckinRepository, CheckinService, CodeSource, PopupDirectory,
};
use popmarket::engine::fraud::{
    parse_comparables, FairnessReview, MarketComparable, NoShowProfile, NoShowRiskPredictor,
    PriceFairnessEvaluator, TrustEvent, TrustMetrics, TrustScoreEngine,
};
use popmarket::engine::pipeline::{pipeline_router, DealPipelineService, PipelineRepository};

pub(crate) fn with_engine_routes<D, C, R, P>(
    checkin_service: Arc<CheckinService<D, C, R>>,
    pipeline_service: Arc<DealPipelineService<P>>,
) -> axum::Router
where
    D: PopupDirectory + 'static,
    C: CodeSource + 'static,
    R: CheckinRepository + 'static,
    P: PipelineRepository + 'static,
{
    checkin_router(checkin_service)
        .merge(pipeline_router(pipeline_service))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/pricing/review",
            axum::routing::post(pricing_review_endpoint),
        )
        .route(
            "/api/v1/risk/no-show",
            axum::routing::post(no_show_risk_endpoint),
        )
        .route(
            "/api/v1/trust/score",
            axum::routing::post(trust_score_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct PricingReviewRequest {
    pub(crate) offered_price: i64,
    /// Cache key for the comparable set, e.g. a district or category slug.
    #[serde(default)]
    pub(crate) market: Option<String>,
    #[serde(default)]
    pub(crate) comparables: Vec<MarketComparable>,
    /// Raw CSV export (`price,source,quoted_on`) as an alternative to inline rows.
    #[serde(default)]
    pub(crate) comparables_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PricingReviewResponse {
    pub(crate) review: FairnessReview,
    pub(crate) comparables_used: usize,
    pub(crate) from_cache: bool,
}

pub(crate) async fn pricing_review_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<PricingReviewRequest>,
) -> Response {
    let now = Utc::now();

    let (comparables, from_cache) = if let Some(csv) = payload.comparables_csv {
        match parse_comparables(Cursor::new(csv.into_bytes())) {
            Ok(parsed) => (parsed, false),
            Err(error) => {
                let body = json!({ "error": error.to_string() });
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
        }
    } else if !payload.comparables.is_empty() {
        (payload.comparables, false)
    } else if let Some(market) = payload.market.as_deref() {
        match state.comparables_cache.get(market, now) {
            Some(cached) => (cached, true),
            None => (Vec::new(), false),
        }
    } else {
        (Vec::new(), false)
    };

    if let Some(market) = payload.market.as_deref() {
        if !from_cache && !comparables.is_empty() {
            state
                .comparables_cache
                .put(market, comparables.clone(), now);
        }
    }

    match PriceFairnessEvaluator::default().evaluate(payload.offered_price, &comparables) {
        Ok(review) => {
            let response = PricingReviewResponse {
                comparables_used: comparables.len(),
                from_cache,
                review,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(error) => {
            let body = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}

/// Advisory no-show risk used by the platform when reviewing a funding round.
pub(crate) async fn no_show_risk_endpoint(Json(profile): Json<NoShowProfile>) -> Response {
    match NoShowRiskPredictor::default().assess(&profile) {
        Ok(risk) => (StatusCode::OK, Json(risk)).into_response(),
        Err(error) => {
            let body = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrustScoreRequest {
    pub(crate) metrics: TrustMetrics,
    #[serde(default)]
    pub(crate) events: Vec<TrustEvent>,
}

/// Recomputes a trust score on demand; nothing is persisted, so the tier can never
/// drift from its inputs.
pub(crate) async fn trust_score_endpoint(Json(payload): Json<TrustScoreRequest>) -> Response {
    match TrustScoreEngine::default().evaluate(&payload.metrics, &payload.events, Utc::now()) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(error) => {
            let body = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}
