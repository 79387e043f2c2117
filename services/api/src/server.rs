use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDealPipeline};
use crate::routes::with_deal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use deal_engine::config::AppConfig;
use deal_engine::error::AppError;
use deal_engine::telemetry;
use deal_engine::valuation::DealDeskService;
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

    let pipeline = Arc::new(InMemoryDealPipeline::default());
    let desk = Arc::new(DealDeskService::new(pipeline, config.thresholds.clone()));

    let app = with_deal_routes(desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        solid_spread = config.thresholds.solid_spread,
        "deal engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
