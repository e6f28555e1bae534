use crate::cli::ServeArgs;
use crate::infra::{open_csv_service, AppState};
use crate::routes::with_allocation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use shelter_alloc::config::AppConfig;
use shelter_alloc::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let allocation_service = Arc::new(open_csv_service(&config.storage.data_dir)?);

    let app = with_allocation_routes(allocation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.storage.data_dir.display(),
        "shelter allocation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
