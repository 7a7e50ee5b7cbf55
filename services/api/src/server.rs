use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository};
use crate::routes::with_application_routes;
use admissions_ai::config::AppConfig;
use admissions_ai::error::AppError;
use admissions_ai::telemetry;
use admissions_ai::workflows::admissions::{AdmissionsService, AdmissionsServiceError};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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
    };

    let repository = if args.empty {
        InMemoryApplicationRepository::default()
    } else {
        InMemoryApplicationRepository::seeded().map_err(AdmissionsServiceError::from)?
    };
    let admissions_service = Arc::new(AdmissionsService::new(
        Arc::new(repository),
        config.decisions,
    ));

    let app = with_application_routes(admissions_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        decision_retries = config.decisions.mutation_retries,
        "admissions screening service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
