use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use deal_engine::error::AppError;
use deal_engine::valuation::{
    deal_router, CompCsvImporter, CompRecord, DealDeskService, DealPipeline, IngestStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct CompImportRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompImportResponse {
    pub(crate) status: IngestStatus,
    pub(crate) imported: usize,
    pub(crate) comps: Vec<CompRecord>,
}

pub(crate) fn with_deal_routes<P>(service: Arc<DealDeskService<P>>) -> axum::Router
where
    P: DealPipeline + 'static,
{
    deal_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/comps/import",
            axum::routing::post(comp_import_endpoint),
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

/// Parses a comp export into records accepted as `comps` by `/api/v1/deals/analyze`.
pub(crate) async fn comp_import_endpoint(
    Json(payload): Json<CompImportRequest>,
) -> Result<Json<CompImportResponse>, AppError> {
    let reader = Cursor::new(payload.csv.into_bytes());
    let comps = CompCsvImporter::from_reader(reader)?;
    let status = if comps.iter().any(|comp| comp.price > 0.0) {
        IngestStatus::CompsFound
    } else {
        IngestStatus::NoCompsFound
    };

    Ok(Json(CompImportResponse {
        status,
        imported: comps.len(),
        comps,
    }))
}
