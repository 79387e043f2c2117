//! Repair and site-prep cost estimation.
//!
//! Every strategy returns the same [`RepairEstimate`] contract; none of them
//! consult the valuation.

mod catalog;
mod checklist;
mod heuristic;

pub use catalog::{baseline_for, catalog_for, Baseline, CostBand, RepairItem};

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{PropertyDescriptor, RepairEstimate, RepairMethod};
use super::money::{format_currency, whole};
use super::regional::{self, DEFAULT_YEAR_BUILT};
use crate::config::EngineThresholds;

/// Whole-house rehab scope, priced per square foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RehabLevel {
    Cosmetic,
    Moderate,
    Heavy,
}

impl RehabLevel {
    pub fn rate_per_area(self) -> f64 {
        match self {
            RehabLevel::Cosmetic => 8.0,
            RehabLevel::Moderate => 15.0,
            RehabLevel::Heavy => 25.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RehabLevel::Cosmetic => "cosmetic",
            RehabLevel::Moderate => "moderate",
            RehabLevel::Heavy => "heavy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cosmetic" | "light" => Some(Self::Cosmetic),
            "moderate" | "medium" => Some(Self::Moderate),
            "heavy" | "full" => Some(Self::Heavy),
            _ => None,
        }
    }
}

/// Caller-selected repair estimation method and its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RepairStrategy {
    Checklist {
        #[serde(default)]
        items: Vec<String>,
        #[serde(default)]
        confirmed: bool,
    },
    Heuristic {
        #[serde(default)]
        description: String,
    },
    Manual {
        amount: f64,
    },
    RehabLevel {
        level: RehabLevel,
    },
    AgeBand {
        /// Year the property age is measured against; defaults to the current year.
        #[serde(default, rename = "asOfYear")]
        as_of_year: Option<i32>,
    },
}

impl Default for RepairStrategy {
    fn default() -> Self {
        RepairStrategy::Checklist {
            items: Vec::new(),
            confirmed: false,
        }
    }
}

/// Stateless estimator dispatching to the selected strategy.
#[derive(Debug, Clone, Default)]
pub struct RepairEstimator {
    thresholds: EngineThresholds,
}

impl RepairEstimator {
    pub fn new(thresholds: EngineThresholds) -> Self {
        Self { thresholds }
    }

    pub fn estimate(
        &self,
        property: &PropertyDescriptor,
        strategy: &RepairStrategy,
    ) -> RepairEstimate {
        let estimate = match strategy {
            RepairStrategy::Checklist { items, confirmed } => {
                checklist::estimate_checklist(items, *confirmed, property.property_type)
            }
            RepairStrategy::Heuristic { description } => heuristic::estimate_from_description(
                description,
                property.property_type,
                self.thresholds.heuristic_uncertainty,
            ),
            RepairStrategy::Manual { amount } => manual_amount(*amount),
            RepairStrategy::RehabLevel { level } => rehab_level(property, *level),
            RepairStrategy::AgeBand { as_of_year } => {
                age_band(property, as_of_year.unwrap_or_else(|| Utc::now().year()))
            }
        };

        debug!(
            method = ?estimate.method,
            total = estimate.total_cost,
            confirmed = estimate.confirmed,
            "repair estimate computed"
        );
        estimate
    }
}

fn manual_amount(amount: f64) -> RepairEstimate {
    let mut notes = Vec::new();
    let total = if !amount.is_finite() {
        notes.push("Manual repair amount was not a number; using $0".to_string());
        0.0
    } else if amount < 0.0 {
        notes.push(format!(
            "Manual repair amount {} is negative; clamped to $0",
            format_currency(amount)
        ));
        0.0
    } else {
        whole(amount)
    };

    let mut line_items = BTreeMap::new();
    line_items.insert("Manual Estimate".to_string(), total);

    RepairEstimate {
        total_cost: total,
        method: RepairMethod::Manual,
        line_items,
        confirmed: true,
        range: None,
        breakdown: Vec::new(),
        notes,
    }
}

fn rehab_level(property: &PropertyDescriptor, level: RehabLevel) -> RepairEstimate {
    let Some(area) = property.usable_area() else {
        return RepairEstimate::unconfirmed(
            RepairMethod::RehabLevel,
            "Subject area is missing; rehab-level estimate needs square footage",
        );
    };

    let total = whole(area * level.rate_per_area());
    let label = format!("Rehab ({})", level.label());
    let mut line_items = BTreeMap::new();
    line_items.insert(label.clone(), total);

    RepairEstimate {
        total_cost: total,
        method: RepairMethod::RehabLevel,
        line_items,
        confirmed: true,
        range: None,
        breakdown: vec![format!(
            "{label}: {area:.0} sqft x ${:.0}/sqft",
            level.rate_per_area()
        )],
        notes: Vec::new(),
    }
}

fn age_band(property: &PropertyDescriptor, as_of_year: i32) -> RepairEstimate {
    let Some(area) = property.usable_area() else {
        return RepairEstimate::unconfirmed(
            RepairMethod::AgeBand,
            "Subject area is missing; age-band estimate needs square footage",
        );
    };

    let mut notes = Vec::new();
    match property.year_built {
        None => notes.push(format!("Year built unknown; assumed {DEFAULT_YEAR_BUILT}")),
        Some(year) if regional::plausible_year_built(Some(year), as_of_year).is_none() => {
            notes.push(format!(
                "Year built {year} is not plausible for {as_of_year}; assumed {DEFAULT_YEAR_BUILT}"
            ))
        }
        Some(_) => {}
    }

    let age = regional::property_age(property.year_built, as_of_year);
    let rate = regional::age_band_rate(age);
    let total = regional::age_band_repair_cost(area, property.year_built, as_of_year);
    let label = format!("Age-based repairs ({} years)", age.max(0));
    let mut line_items = BTreeMap::new();
    line_items.insert(label.clone(), total);

    RepairEstimate {
        total_cost: total,
        method: RepairMethod::AgeBand,
        line_items,
        confirmed: true,
        range: None,
        breakdown: vec![format!("{label}: {area:.0} sqft x ${rate:.0}/sqft")],
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn house(area: f64, year_built: Option<i32>) -> PropertyDescriptor {
        PropertyDescriptor {
            address: "18 Birch Ln".to_string(),
            state: "OH".to_string(),
            area,
            year_built,
            ..PropertyDescriptor::default()
        }
    }

    #[test]
    fn strategy_deserializes_from_tagged_json() {
        let strategy: RepairStrategy = serde_json::from_value(json!({
            "method": "checklist",
            "items": ["roof", "hvac"],
            "confirmed": true
        }))
        .expect("strategy parses");
        assert!(matches!(strategy, RepairStrategy::Checklist { ref items, confirmed: true } if items.len() == 2));

        let strategy: RepairStrategy =
            serde_json::from_value(json!({"method": "age_band", "asOfYear": 2024}))
                .expect("strategy parses");
        assert_eq!(strategy, RepairStrategy::AgeBand { as_of_year: Some(2024) });
    }

    #[test]
    fn rehab_level_prices_per_square_foot() {
        let estimate = RepairEstimator::default().estimate(
            &house(1500.0, None),
            &RepairStrategy::RehabLevel {
                level: RehabLevel::Moderate,
            },
        );

        assert_eq!(estimate.total_cost, 22_500.0);
        assert_eq!(estimate.method, RepairMethod::RehabLevel);
        assert!(estimate.confirmed);
    }

    #[test]
    fn age_band_uses_default_year_when_missing() {
        let estimate = RepairEstimator::default().estimate(
            &house(1000.0, None),
            &RepairStrategy::AgeBand {
                as_of_year: Some(2025),
            },
        );

        assert_eq!(estimate.total_cost, 15_000.0);
        assert!(estimate.notes[0].contains("1980"));
    }

    #[test]
    fn age_band_treats_extreme_years_as_unknown() {
        for year_built in [i32::MIN, i32::MAX, 2031] {
            let estimate = RepairEstimator::default().estimate(
                &house(1000.0, Some(year_built)),
                &RepairStrategy::AgeBand {
                    as_of_year: Some(2025),
                },
            );

            assert_eq!(estimate.total_cost, 15_000.0, "year_built={year_built}");
            assert!(estimate.notes[0].contains("not plausible"));
        }
    }

    #[test]
    fn age_band_survives_extreme_as_of_year() {
        for as_of_year in [i32::MIN, i32::MAX] {
            let estimate = RepairEstimator::default().estimate(
                &house(1000.0, Some(1956)),
                &RepairStrategy::AgeBand {
                    as_of_year: Some(as_of_year),
                },
            );

            assert!(estimate.total_cost.is_finite());
            assert!(estimate.confirmed);
        }
    }

    #[test]
    fn area_based_strategies_need_area() {
        let estimate = RepairEstimator::default().estimate(
            &house(0.0, Some(1950)),
            &RepairStrategy::RehabLevel {
                level: RehabLevel::Heavy,
            },
        );

        assert_eq!(estimate.total_cost, 0.0);
        assert!(!estimate.confirmed);
    }

    #[test]
    fn manual_amount_clamps_negative() {
        let estimator = RepairEstimator::default();
        let property = house(1200.0, None);

        let negative = estimator.estimate(&property, &RepairStrategy::Manual { amount: -500.0 });
        assert_eq!(negative.total_cost, 0.0);
        assert_eq!(negative.notes.len(), 1);

        let exact = estimator.estimate(&property, &RepairStrategy::Manual { amount: 17_250.4 });
        assert_eq!(exact.total_cost, 17_250.0);
        assert_eq!(exact.method, RepairMethod::Manual);
    }

    #[test]
    fn default_strategy_is_an_unconfirmed_empty_checklist() {
        let estimate =
            RepairEstimator::default().estimate(&house(1200.0, None), &RepairStrategy::default());

        assert!(!estimate.confirmed);
        assert_eq!(estimate.total_cost, 0.0);
    }
}
