use deal_engine::valuation::{
    DealId, DealPipeline, DealRecord, FinancingType, PipelineError, PropertyType, RehabLevel,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDealPipeline {
    records: Arc<Mutex<HashMap<DealId, DealRecord>>>,
}

impl InMemoryDealPipeline {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<DealId, DealRecord>>, PipelineError> {
        self.records
            .lock()
            .map_err(|_| PipelineError::Unavailable("pipeline mutex poisoned".to_string()))
    }
}

impl DealPipeline for InMemoryDealPipeline {
    fn save(&self, record: DealRecord) -> Result<DealRecord, PipelineError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id) {
            return Err(PipelineError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &DealId) -> Result<Option<DealRecord>, PipelineError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    /// Most recently saved first.
    fn list(&self, limit: usize) -> Result<Vec<DealRecord>, PipelineError> {
        let guard = self.lock()?;
        let mut records: Vec<DealRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.id.cmp(&a.id)));
        records.truncate(limit);
        Ok(records)
    }
}

pub(crate) fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    PropertyType::parse(raw)
        .ok_or_else(|| format!("unknown property type '{raw}' (expected residential, land, or commercial)"))
}

pub(crate) fn parse_financing(raw: &str) -> Result<FinancingType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "cash" => Ok(FinancingType::Cash),
        "creative" | "seller" | "subject_to" => Ok(FinancingType::Creative),
        _ => Err(format!("unknown financing type '{raw}' (expected cash or creative)")),
    }
}

pub(crate) fn parse_rehab_level(raw: &str) -> Result<RehabLevel, String> {
    RehabLevel::parse(raw)
        .ok_or_else(|| format!("unknown rehab level '{raw}' (expected cosmetic, moderate, or heavy)"))
}
