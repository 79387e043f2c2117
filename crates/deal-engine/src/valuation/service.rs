use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::analysis::{AnalysisReport, AnalysisRequest, DealAnalyzer};
use super::domain::{DealResult, PropertyDescriptor, RepairEstimate};
use super::offer::OfferInputs;
use super::pipeline::{DealId, DealPipeline, DealRecord, DealSummary, PipelineError};
use super::repairs::RepairStrategy;
use crate::config::EngineThresholds;

/// Service composing the analyzer with the deal pipeline.
pub struct DealDeskService<P> {
    analyzer: Arc<DealAnalyzer>,
    pipeline: Arc<P>,
}

static DEAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_deal_id() -> DealId {
    let id = DEAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DealId(format!("deal-{id:06}"))
}

impl<P> DealDeskService<P>
where
    P: DealPipeline + 'static,
{
    pub fn new(pipeline: Arc<P>, thresholds: EngineThresholds) -> Self {
        Self {
            analyzer: Arc::new(DealAnalyzer::new(thresholds)),
            pipeline,
        }
    }

    pub fn analyzer(&self) -> &DealAnalyzer {
        &self.analyzer
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        self.analyzer.analyze(request)
    }

    pub fn quote(&self, inputs: &OfferInputs) -> DealResult {
        self.analyzer.offers().calculate(inputs)
    }

    pub fn estimate_repairs(
        &self,
        property: &PropertyDescriptor,
        strategy: &RepairStrategy,
    ) -> RepairEstimate {
        self.analyzer.repairs().estimate(property, strategy)
    }

    /// Saves a summary. Unvalued deals are refused rather than stored with a
    /// placeholder zero.
    pub fn save(&self, summary: DealSummary) -> Result<DealRecord, DealDeskError> {
        if summary.address.trim().is_empty() {
            return Err(DealDeskError::MissingAddress);
        }
        if !summary.value.is_finite() || summary.value <= 0.0 {
            return Err(DealDeskError::MissingValuation);
        }
        if !summary.asking_price.is_finite() || summary.asking_price < 0.0 {
            return Err(DealDeskError::InvalidAskingPrice);
        }

        let record = DealRecord {
            id: next_deal_id(),
            summary,
            saved_at: Utc::now(),
        };
        let stored = self.pipeline.save(record)?;
        info!(deal_id = %stored.id.0, address = %stored.summary.address, "deal saved to pipeline");
        Ok(stored)
    }

    pub fn get(&self, id: &DealId) -> Result<DealRecord, DealDeskError> {
        let record = self.pipeline.fetch(id)?.ok_or(PipelineError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<DealRecord>, DealDeskError> {
        Ok(self.pipeline.list(limit)?)
    }
}

/// Error raised by the deal desk.
#[derive(Debug, thiserror::Error)]
pub enum DealDeskError {
    #[error("deal address is required")]
    MissingAddress,
    #[error("deal has no valuation; enter a value before saving")]
    MissingValuation,
    #[error("asking price must be zero or positive")]
    InvalidAskingPrice,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl DealDeskError {
    /// True for input problems the caller can fix.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DealDeskError::MissingAddress
                | DealDeskError::MissingValuation
                | DealDeskError::InvalidAskingPrice
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MemoryPipeline {
        records: Mutex<BTreeMap<DealId, DealRecord>>,
    }

    impl DealPipeline for MemoryPipeline {
        fn save(&self, record: DealRecord) -> Result<DealRecord, PipelineError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&record.id) {
                return Err(PipelineError::Conflict);
            }
            guard.insert(record.id.clone(), record.clone());
            Ok(record)
        }

        fn fetch(&self, id: &DealId) -> Result<Option<DealRecord>, PipelineError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn list(&self, limit: usize) -> Result<Vec<DealRecord>, PipelineError> {
            Ok(self
                .records
                .lock()
                .expect("lock")
                .values()
                .take(limit)
                .cloned()
                .collect())
        }
    }

    pub(crate) fn desk() -> DealDeskService<MemoryPipeline> {
        DealDeskService::new(
            Arc::new(MemoryPipeline::default()),
            EngineThresholds::default(),
        )
    }

    fn summary(value: f64) -> DealSummary {
        DealSummary {
            address: "410 Walnut St, Columbus, OH".to_string(),
            value,
            mao: 175_000.0,
            repair_cost: 20_000.0,
            assignment_fee: 15_000.0,
            asking_price: 160_000.0,
        }
    }

    #[test]
    fn saves_and_fetches_summaries() {
        let service = desk();

        let saved = service.save(summary(300_000.0)).expect("saved");
        assert!(saved.id.0.starts_with("deal-"));

        let fetched = service.get(&saved.id).expect("fetched");
        assert_eq!(fetched.summary, summary(300_000.0));
        assert_eq!(service.recent(10).expect("listed").len(), 1);
    }

    #[test]
    fn refuses_unvalued_deals() {
        let err = desk().save(summary(0.0)).expect_err("zero value refused");
        assert!(matches!(err, DealDeskError::MissingValuation));
        assert!(err.is_validation());
    }

    #[test]
    fn unknown_deal_is_not_found() {
        let err = desk()
            .get(&DealId("deal-999999".to_string()))
            .expect_err("missing deal");
        assert!(matches!(
            err,
            DealDeskError::Pipeline(PipelineError::NotFound)
        ));
    }

    #[test]
    fn quotes_through_the_configured_calculator() {
        let result = desk().quote(&OfferInputs {
            value: 300_000.0,
            repair_cost: 20_000.0,
            assignment_fee: 15_000.0,
            asking_price: 400_000.0,
            property_type: Default::default(),
            financing: Default::default(),
        });

        assert_eq!(result.mao, 175_000.0);
    }
}
