use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::comps::{self, IngestStatus};
use super::domain::{
    DealResult, FinancingType, PropertyDescriptor, RepairEstimate, ValuationResult,
};
use super::offer::{OfferCalculator, OfferInputs};
use super::pipeline::DealSummary;
use super::repairs::{RepairEstimator, RepairStrategy};
use super::resolver::ValuationResolver;
use crate::config::EngineThresholds;

/// Immutable input snapshot for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub property: PropertyDescriptor,
    /// Raw entries from the comparable-sale search, in search order.
    #[serde(default)]
    pub comps: Vec<Value>,
    /// Operator-entered comps; when present they replace the search comps.
    #[serde(default)]
    pub manual_comps: Option<Vec<Value>>,
    #[serde(default)]
    pub manual_value: Option<f64>,
    #[serde(default)]
    pub repairs: RepairStrategy,
    /// Defaults to the configured assignment fee.
    #[serde(default)]
    pub assignment_fee: Option<f64>,
    #[serde(default)]
    pub asking_price: f64,
    #[serde(default)]
    pub financing: FinancingType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub comp_status: IngestStatus,
    pub valuation: ValuationResult,
    pub repairs: RepairEstimate,
    pub deal: DealResult,
    /// Value the offer was priced from (manual override or resolved value).
    pub effective_value: f64,
    pub summary: DealSummary,
}

/// Runs ingestion, valuation, repairs and the offer rule as one pure call.
#[derive(Debug, Clone, Default)]
pub struct DealAnalyzer {
    thresholds: EngineThresholds,
    resolver: ValuationResolver,
    repairs: RepairEstimator,
    offers: OfferCalculator,
}

impl DealAnalyzer {
    pub fn new(thresholds: EngineThresholds) -> Self {
        Self {
            resolver: ValuationResolver::new(thresholds.clone()),
            repairs: RepairEstimator::new(thresholds.clone()),
            offers: OfferCalculator::new(thresholds.clone()),
            thresholds,
        }
    }

    pub fn resolver(&self) -> &ValuationResolver {
        &self.resolver
    }

    pub fn repairs(&self) -> &RepairEstimator {
        &self.repairs
    }

    pub fn offers(&self) -> &OfferCalculator {
        &self.offers
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        let property = &request.property;

        let (comp_status, valuation) = match &request.manual_comps {
            Some(manual) => {
                let ingestion = comps::normalize_comps(manual, manual.len());
                (ingestion.status, self.resolver.resolve_manual(&ingestion.comps))
            }
            None => {
                let ingestion = comps::normalize_comps(&request.comps, self.thresholds.max_comps);
                (
                    ingestion.status,
                    self.resolver.resolve(property, &ingestion.comps),
                )
            }
        };

        let repairs = self.repairs.estimate(property, &request.repairs);
        let assignment_fee = request
            .assignment_fee
            .filter(|fee| fee.is_finite() && *fee >= 0.0)
            .unwrap_or(self.thresholds.default_assignment_fee);

        let mut deal = self.offers.calculate_for_valuation(
            &valuation,
            request.manual_value,
            OfferInputs {
                value: valuation.value,
                repair_cost: repairs.total_cost,
                assignment_fee,
                asking_price: request.asking_price,
                property_type: property.property_type,
                financing: request.financing,
            },
        );
        if !repairs.confirmed {
            deal.warnings.push(
                "Repair cost not confirmed; offer assumes $0 repairs until repairs are confirmed"
                    .to_string(),
            );
        }

        let effective_value = if deal.valuation_unset {
            0.0
        } else {
            request
                .manual_value
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(valuation.value)
        };

        info!(
            address = %property.display_address(),
            source = valuation.source.label(),
            value = effective_value,
            mao = deal.mao,
            grade = deal.grade_at_asking.label(),
            "deal analyzed"
        );

        let summary = DealSummary {
            address: property.display_address(),
            value: effective_value,
            mao: deal.mao,
            repair_cost: repairs.total_cost,
            assignment_fee,
            asking_price: request.asking_price.max(0.0),
        };

        AnalysisReport {
            comp_status,
            valuation,
            repairs,
            deal,
            effective_value,
            summary,
        }
    }
}
