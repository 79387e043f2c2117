use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived record handed to the deal pipeline / CRM store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSummary {
    pub address: String,
    pub value: f64,
    pub mao: f64,
    pub repair_cost: f64,
    pub assignment_fee: f64,
    #[serde(default)]
    pub asking_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    pub id: DealId,
    pub summary: DealSummary,
    pub saved_at: DateTime<Utc>,
}

/// Storage seam for saved deals so the desk can run against any backend.
pub trait DealPipeline: Send + Sync {
    fn save(&self, record: DealRecord) -> Result<DealRecord, PipelineError>;
    fn fetch(&self, id: &DealId) -> Result<Option<DealRecord>, PipelineError>;
    fn list(&self, limit: usize) -> Result<Vec<DealRecord>, PipelineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("deal already exists")]
    Conflict,
    #[error("deal not found")]
    NotFound,
    #[error("pipeline unavailable: {0}")]
    Unavailable(String),
}
