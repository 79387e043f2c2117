use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{DealGrade, DealResult, FinancingType, PropertyType, ValuationResult};
use super::money::{finite_or_zero, format_currency, whole};
use crate::config::EngineThresholds;

/// Everything the offer rule needs; no valuation context beyond the number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInputs {
    pub value: f64,
    #[serde(default)]
    pub repair_cost: f64,
    #[serde(default)]
    pub assignment_fee: f64,
    #[serde(default)]
    pub asking_price: f64,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub financing: FinancingType,
}

/// Grades a spread; the SOLID boundary is inclusive.
pub fn grade(spread: f64, solid_spread: f64) -> DealGrade {
    if spread <= 0.0 {
        DealGrade::Risky
    } else if spread < solid_spread {
        DealGrade::Thin
    } else {
        DealGrade::Solid
    }
}

/// Pure MAO, spread and deal-grade calculator.
#[derive(Debug, Clone, Default)]
pub struct OfferCalculator {
    thresholds: EngineThresholds,
}

impl OfferCalculator {
    pub fn new(thresholds: EngineThresholds) -> Self {
        Self { thresholds }
    }

    pub fn mao_multiplier(&self, property_type: PropertyType) -> f64 {
        match property_type {
            PropertyType::Land | PropertyType::Commercial => {
                self.thresholds.conservative_mao_multiplier
            }
            PropertyType::Residential => self.thresholds.residential_mao_multiplier,
        }
    }

    pub fn calculate(&self, inputs: &OfferInputs) -> DealResult {
        let mut warnings = Vec::new();

        let value = finite_or_zero(inputs.value);
        let value = if value < 0.0 {
            warnings.push("Negative valuation clamped to $0".to_string());
            0.0
        } else {
            value
        };
        let repair_cost = finite_or_zero(inputs.repair_cost);
        let assignment_fee = finite_or_zero(inputs.assignment_fee);
        let asking_price = finite_or_zero(inputs.asking_price);

        let raw_mao =
            whole(value * self.mao_multiplier(inputs.property_type) - repair_cost - assignment_fee);
        let mao = raw_mao.max(0.0);
        if raw_mao <= 0.0 {
            warnings.push(format!(
                "Formula MAO is {} (value x {:.2} minus repairs and fee); offer clamped to $0, this deal does not work at this value",
                format_currency(raw_mao),
                self.mao_multiplier(inputs.property_type),
            ));
        }

        let spread_at_asking = whole(value - (asking_price + repair_cost + assignment_fee));
        let spread_at_mao = whole(value - (mao + assignment_fee + repair_cost));
        let negotiation_room = whole(mao - asking_price);

        let priced = mao > 0.0 && asking_price > 0.0;
        let unrealistic_mao = priced && mao > asking_price * self.thresholds.unrealistic_mao_ratio;
        let suspiciously_good =
            priced && mao > asking_price * self.thresholds.suspicious_mao_ratio;

        if unrealistic_mao {
            warnings.push(format!(
                "MAO {} is more than {:.1}x the asking price {}; the valuation is likely wrong, verify comps",
                format_currency(mao),
                self.thresholds.unrealistic_mao_ratio,
                format_currency(asking_price),
            ));
        } else if suspiciously_good {
            warnings.push(format!(
                "MAO {} is more than {:.1}x the asking price {}; deal looks too good, double-check the valuation",
                format_currency(mao),
                self.thresholds.suspicious_mao_ratio,
                format_currency(asking_price),
            ));
        }

        if asking_price <= 0.0 {
            warnings.push(
                "No asking price entered; spread at asking and negotiation room assume $0".to_string(),
            );
        }

        if inputs.financing == FinancingType::Creative {
            warnings.push(
                "Creative financing selected; MAO reflects a cash offer, structure terms separately"
                    .to_string(),
            );
        }

        let result = DealResult {
            mao,
            raw_mao,
            spread_at_asking,
            spread_at_mao,
            negotiation_room,
            grade_at_asking: grade(spread_at_asking, self.thresholds.solid_spread),
            grade_at_mao: grade(spread_at_mao, self.thresholds.solid_spread),
            suspiciously_good,
            unrealistic_mao,
            valuation_unset: false,
            warnings,
        };

        debug!(
            mao = result.mao,
            spread_at_asking = result.spread_at_asking,
            grade = result.grade_at_asking.label(),
            "offer calculated"
        );
        result
    }

    /// Runs the offer rule against a resolved valuation.
    ///
    /// A manual-required placeholder is never priced as if it were real: the
    /// result is marked `valuation_unset` unless `manual_value` supplies one.
    pub fn calculate_for_valuation(
        &self,
        valuation: &ValuationResult,
        manual_value: Option<f64>,
        inputs: OfferInputs,
    ) -> DealResult {
        let manual_value = manual_value.filter(|value| value.is_finite() && *value > 0.0);

        match manual_value {
            Some(value) => {
                let mut result = self.calculate(&OfferInputs { value, ..inputs });
                result
                    .warnings
                    .insert(0, format!("Using manually entered value {}", format_currency(value)));
                result
            }
            None if valuation.requires_manual_value() => {
                let mut result = self.calculate(&OfferInputs { value: 0.0, ..inputs });
                result.valuation_unset = true;
                result.warnings.insert(
                    0,
                    "Valuation requires manual entry; offer figures are placeholders until a value is supplied"
                        .to_string(),
                );
                result
            }
            None => self.calculate(&OfferInputs {
                value: valuation.value,
                ..inputs
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(value: f64, repairs: f64, fee: f64, asking: f64) -> OfferInputs {
        OfferInputs {
            value,
            repair_cost: repairs,
            assignment_fee: fee,
            asking_price: asking,
            property_type: PropertyType::Residential,
            financing: FinancingType::Cash,
        }
    }

    #[test]
    fn residential_mao_uses_seventy_percent_rule() {
        let result = OfferCalculator::default().calculate(&inputs(300_000.0, 20_000.0, 15_000.0, 400_000.0));

        assert_eq!(result.mao, 175_000.0);
        assert_eq!(result.spread_at_asking, -135_000.0);
        assert_eq!(result.grade_at_asking, DealGrade::Risky);
        assert_eq!(result.spread_at_mao, 90_000.0);
        assert_eq!(result.grade_at_mao, DealGrade::Solid);
        assert_eq!(result.negotiation_room, -225_000.0);
        assert!(!result.unrealistic_mao);
        assert!(!result.suspiciously_good);
    }

    #[test]
    fn land_and_commercial_use_conservative_multiplier() {
        let calculator = OfferCalculator::default();
        for property_type in [PropertyType::Land, PropertyType::Commercial] {
            let result = calculator.calculate(&OfferInputs {
                property_type,
                ..inputs(100_000.0, 0.0, 10_000.0, 50_000.0)
            });
            assert_eq!(result.mao, 55_000.0);
        }
    }

    #[test]
    fn negative_formula_is_clamped_and_warned() {
        let result = OfferCalculator::default().calculate(&inputs(50_000.0, 40_000.0, 20_000.0, 30_000.0));

        assert_eq!(result.mao, 0.0);
        assert_eq!(result.raw_mao, -25_000.0);
        assert!(result.warnings[0].contains("clamped to $0"));
    }

    #[test]
    fn flags_suspicious_and_unrealistic_offers() {
        let calculator = OfferCalculator::default();

        let suspicious = calculator.calculate(&inputs(300_000.0, 0.0, 0.0, 150_000.0));
        assert_eq!(suspicious.mao, 210_000.0);
        assert!(suspicious.suspiciously_good);
        assert!(!suspicious.unrealistic_mao);

        let unrealistic = calculator.calculate(&inputs(300_000.0, 0.0, 0.0, 100_000.0));
        assert!(unrealistic.suspiciously_good);
        assert!(unrealistic.unrealistic_mao);
    }

    #[test]
    fn flags_need_an_asking_price() {
        let result = OfferCalculator::default().calculate(&inputs(300_000.0, 0.0, 0.0, 0.0));

        assert!(!result.suspiciously_good);
        assert!(!result.unrealistic_mao);
        assert!(result
            .warnings
            .iter()
            .any(|warning| warning.contains("No asking price")));
    }

    #[test]
    fn grade_boundaries_are_inclusive_on_solid() {
        assert_eq!(grade(-1.0, 25_000.0), DealGrade::Risky);
        assert_eq!(grade(0.0, 25_000.0), DealGrade::Risky);
        assert_eq!(grade(1.0, 25_000.0), DealGrade::Thin);
        assert_eq!(grade(24_999.0, 25_000.0), DealGrade::Thin);
        assert_eq!(grade(25_000.0, 25_000.0), DealGrade::Solid);
    }

    #[test]
    fn non_finite_inputs_never_leak() {
        let result = OfferCalculator::default().calculate(&inputs(f64::NAN, f64::INFINITY, 0.0, 0.0));

        assert_eq!(result.mao, 0.0);
        assert!(result.spread_at_asking.is_finite());
        assert!(result.spread_at_mao.is_finite());
    }

    #[test]
    fn creative_financing_adds_warning_only() {
        let calculator = OfferCalculator::default();
        let cash = calculator.calculate(&inputs(300_000.0, 20_000.0, 15_000.0, 150_000.0));
        let creative = calculator.calculate(&OfferInputs {
            financing: FinancingType::Creative,
            ..inputs(300_000.0, 20_000.0, 15_000.0, 150_000.0)
        });

        assert_eq!(cash.mao, creative.mao);
        assert_eq!(creative.warnings.len(), cash.warnings.len() + 1);
    }
}
