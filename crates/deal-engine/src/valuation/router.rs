use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::analysis::AnalysisRequest;
use super::domain::PropertyDescriptor;
use super::offer::OfferInputs;
use super::pipeline::{DealId, DealPipeline, DealRecord, DealSummary, PipelineError};
use super::regional::{self, DEFAULT_REGIONAL_MULTIPLIER};
use super::repairs::RepairStrategy;
use super::service::{DealDeskError, DealDeskService};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairEstimateRequest {
    pub property: PropertyDescriptor,
    #[serde(default)]
    pub strategy: RepairStrategy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionView {
    pub code: &'static str,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentDeals {
    pub deals: Vec<DealRecord>,
}

/// Number of saved deals returned by the pipeline listing.
pub const RECENT_DEALS_LIMIT: usize = 20;

/// Router builder exposing the valuation, offer and pipeline endpoints.
pub fn deal_router<P>(service: Arc<DealDeskService<P>>) -> Router
where
    P: DealPipeline + 'static,
{
    Router::new()
        .route("/api/v1/regions", get(regions_handler))
        .route("/api/v1/deals/analyze", post(analyze_handler::<P>))
        .route("/api/v1/deals/offer", post(offer_handler::<P>))
        .route("/api/v1/repairs/estimate", post(repairs_handler::<P>))
        .route(
            "/api/v1/deals",
            post(save_handler::<P>).get(recent_handler::<P>),
        )
        .route("/api/v1/deals/:deal_id", get(deal_handler::<P>))
        .with_state(service)
}

pub(crate) async fn regions_handler() -> Json<serde_json::Value> {
    let regions: Vec<RegionView> = regional::regions()
        .map(|(code, multiplier)| RegionView { code, multiplier })
        .collect();
    Json(json!({
        "defaultMultiplier": DEFAULT_REGIONAL_MULTIPLIER,
        "regions": regions,
    }))
}

pub(crate) async fn analyze_handler<P>(
    State(service): State<Arc<DealDeskService<P>>>,
    Json(request): Json<AnalysisRequest>,
) -> Response
where
    P: DealPipeline + 'static,
{
    let report = service.analyze(&request);
    (StatusCode::OK, Json(report)).into_response()
}

pub(crate) async fn offer_handler<P>(
    State(service): State<Arc<DealDeskService<P>>>,
    Json(inputs): Json<OfferInputs>,
) -> Response
where
    P: DealPipeline + 'static,
{
    let result = service.quote(&inputs);
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn repairs_handler<P>(
    State(service): State<Arc<DealDeskService<P>>>,
    Json(request): Json<RepairEstimateRequest>,
) -> Response
where
    P: DealPipeline + 'static,
{
    let estimate = service.estimate_repairs(&request.property, &request.strategy);
    (StatusCode::OK, Json(estimate)).into_response()
}

pub(crate) async fn save_handler<P>(
    State(service): State<Arc<DealDeskService<P>>>,
    Json(summary): Json<DealSummary>,
) -> Response
where
    P: DealPipeline + 'static,
{
    match service.save(summary) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recent_handler<P>(State(service): State<Arc<DealDeskService<P>>>) -> Response
where
    P: DealPipeline + 'static,
{
    match service.recent(RECENT_DEALS_LIMIT) {
        Ok(deals) => (StatusCode::OK, Json(RecentDeals { deals })).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deal_handler<P>(
    State(service): State<Arc<DealDeskService<P>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    P: DealPipeline + 'static,
{
    match service.get(&DealId(deal_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: DealDeskError) -> Response {
    let status = match &error {
        error if error.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        DealDeskError::Pipeline(PipelineError::NotFound) => StatusCode::NOT_FOUND,
        DealDeskError::Pipeline(PipelineError::Conflict) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
