//! Deal valuation and offer engine.
//!
//! Everything below `router` and `service` is a pure transform of its input
//! snapshot: comps in, a valuation, repair estimate and offer out, with every
//! judgement call carried as a warning string rather than an error.

pub mod analysis;
pub mod comps;
pub mod domain;
mod money;
pub mod offer;
pub mod pipeline;
pub mod quality;
pub mod regional;
pub mod repairs;
pub mod resolver;
pub mod router;
pub mod service;

pub use analysis::{AnalysisReport, AnalysisRequest, DealAnalyzer};
pub use comps::{CompCsvImporter, CompImportError, CompIngestion, IngestStatus, NO_COMPS_FOUND};
pub use domain::{
    CompRecord, ConfidenceTier, CostRange, DealGrade, DealResult, FinancingType,
    PropertyDescriptor, PropertyType, RepairEstimate, RepairMethod, ResolutionBranch,
    ValuationResult, ValuationSource,
};
pub use money::format_currency;
pub use offer::{grade, OfferCalculator, OfferInputs};
pub use pipeline::{DealId, DealPipeline, DealRecord, DealSummary, PipelineError};
pub use quality::{CompMetrics, HardFailure, QualityVerdict};
pub use regional::{FallbackEstimate, FallbackOutcome, DEFAULT_REGIONAL_MULTIPLIER};
pub use repairs::{RehabLevel, RepairEstimator, RepairItem, RepairStrategy};
pub use resolver::ValuationResolver;
pub use router::deal_router;
pub use service::{DealDeskError, DealDeskService};
