use crate::cli::ServeArgs;
use crate::infra::{
    comparables_cache, AppState, InMemoryCheckinRepository, InMemoryPipelineRepository,
    RotatingCodeStore, SeededPopupDirectory,
};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use popmarket::config::AppConfig;
use popmarket::engine::checkin::{CheckinEvaluator, CheckinService};
use popmarket::engine::pipeline::{DealPipelineService, PipelineStateMachine};
use popmarket::error::AppError;
use popmarket::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        comparables_cache: comparables_cache(),
    };

    let directory = Arc::new(SeededPopupDirectory::with_demo_sites());
    let codes = Arc::new(RotatingCodeStore::default());
    codes.seed_demo_code();
    let checkin_service = Arc::new(CheckinService::new(
        directory,
        codes,
        Arc::new(InMemoryCheckinRepository::default()),
        CheckinEvaluator::default(),
    ));

    let pipeline_service = Arc::new(DealPipelineService::new(
        Arc::new(InMemoryPipelineRepository::default()),
        PipelineStateMachine::default(),
    ));

    let app = with_engine_routes(checkin_service, pipeline_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "popup deal engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
