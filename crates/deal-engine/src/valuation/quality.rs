use serde::{Deserialize, Serialize};

use super::domain::CompRecord;
use super::money::{finite_or_zero, format_currency, mean};
use crate::config::EngineThresholds;

/// Sanity bound that disqualifies a comp-derived average outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HardFailure {
    PricePerAreaTooHigh {
        price_per_area: f64,
        max: f64,
    },
    PricePerAreaTooLow {
        price_per_area: f64,
        min: f64,
    },
    ListingRatioTooHigh {
        ratio: f64,
        max: f64,
        mean_price: f64,
        listing_price: f64,
    },
    ListingRatioTooLow {
        ratio: f64,
        min: f64,
        mean_price: f64,
        listing_price: f64,
    },
}

impl HardFailure {
    pub fn summary(&self) -> String {
        match self {
            HardFailure::PricePerAreaTooHigh {
                price_per_area,
                max,
            } => format!(
                "Price/sqft too high: ${:.0}/sqft (max ${:.0}/sqft); comps may include luxury properties",
                price_per_area, max
            ),
            HardFailure::PricePerAreaTooLow {
                price_per_area,
                min,
            } => format!(
                "Price/sqft too low: ${:.0}/sqft (min ${:.0}/sqft); comps may include distressed or land-like sales",
                price_per_area, min
            ),
            HardFailure::ListingRatioTooHigh {
                ratio,
                max,
                mean_price,
                listing_price,
            } => format!(
                "Comp average {} is {:.1}x listing {} (max {:.1}x); comps may be pulling luxury sales",
                format_currency(*mean_price),
                ratio,
                format_currency(*listing_price),
                max
            ),
            HardFailure::ListingRatioTooLow {
                ratio,
                min,
                mean_price,
                listing_price,
            } => format!(
                "Comp average {} is {:.2}x listing {} (min {:.2}x); comps may be pulling distressed sales",
                format_currency(*mean_price),
                ratio,
                format_currency(*listing_price),
                min
            ),
        }
    }

    pub fn is_listing_ratio(&self) -> bool {
        matches!(
            self,
            HardFailure::ListingRatioTooHigh { .. } | HardFailure::ListingRatioTooLow { .. }
        )
    }
}

/// Aggregates behind the verdict, kept for operator review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompMetrics {
    pub comp_count: usize,
    pub mean_price: f64,
    pub price_per_area: Option<f64>,
    pub listing_ratio: Option<f64>,
    pub price_variance_pct: Option<f64>,
    pub mean_days_since_sale: f64,
    pub mean_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityVerdict {
    pub accepted: bool,
    /// Summary of the first bound that tripped.
    pub hard_failure_reason: Option<String>,
    pub hard_failures: Vec<HardFailure>,
    pub soft_warnings: Vec<String>,
    pub metrics: CompMetrics,
}

impl QualityVerdict {
    pub fn listing_ratio_too_low(&self) -> bool {
        self.hard_failures
            .iter()
            .any(|failure| matches!(failure, HardFailure::ListingRatioTooLow { .. }))
    }

    pub fn listing_ratio_too_high(&self) -> bool {
        self.hard_failures
            .iter()
            .any(|failure| matches!(failure, HardFailure::ListingRatioTooHigh { .. }))
    }

    pub fn price_per_area_too_high(&self) -> bool {
        self.hard_failures
            .iter()
            .any(|failure| matches!(failure, HardFailure::PricePerAreaTooHigh { .. }))
    }
}

/// Arithmetic mean of comp prices; `None` for an empty set.
pub fn mean_comp_price(comps: &[CompRecord]) -> Option<f64> {
    mean(comps.iter().map(|comp| finite_or_zero(comp.price)))
}

/// Applies the hard sanity bounds and the non-blocking soft checks.
///
/// Every tripped hard bound is recorded; `hard_failure_reason` names the
/// first in evaluation order (per-area, then listing ratio).
pub fn validate(
    mean_price: f64,
    subject_area: f64,
    listing_price: Option<f64>,
    comps: &[CompRecord],
    thresholds: &EngineThresholds,
) -> QualityVerdict {
    let mean_price = finite_or_zero(mean_price);
    let mut hard_failures = Vec::new();
    let mut soft_warnings = Vec::new();

    let price_per_area = if subject_area.is_finite() && subject_area > 0.0 {
        Some(mean_price / subject_area)
    } else {
        soft_warnings.push(
            "Subject area is missing; price-per-sqft bounds were not checked, verify ARV manually"
                .to_string(),
        );
        None
    };

    if let Some(price_per_area) = price_per_area {
        if price_per_area > thresholds.max_price_per_area {
            hard_failures.push(HardFailure::PricePerAreaTooHigh {
                price_per_area,
                max: thresholds.max_price_per_area,
            });
        } else if price_per_area < thresholds.min_price_per_area {
            hard_failures.push(HardFailure::PricePerAreaTooLow {
                price_per_area,
                min: thresholds.min_price_per_area,
            });
        }
    }

    let listing_price = listing_price.filter(|price| price.is_finite() && *price > 0.0);
    let listing_ratio = listing_price.map(|listing| mean_price / listing);
    if let (Some(ratio), Some(listing_price)) = (listing_ratio, listing_price) {
        if ratio > thresholds.max_listing_ratio {
            hard_failures.push(HardFailure::ListingRatioTooHigh {
                ratio,
                max: thresholds.max_listing_ratio,
                mean_price,
                listing_price,
            });
        } else if ratio < thresholds.min_listing_ratio {
            hard_failures.push(HardFailure::ListingRatioTooLow {
                ratio,
                min: thresholds.min_listing_ratio,
                mean_price,
                listing_price,
            });
        }
    }

    let price_variance_pct = price_variance_pct(comps, mean_price);
    if let Some(variance) = price_variance_pct {
        if variance > thresholds.max_price_variance_pct {
            soft_warnings.push(format!(
                "High price variance across comps ({variance:.0}%); verify ARV manually"
            ));
        }
    }

    let mean_days_since_sale =
        mean(comps.iter().map(|comp| finite_or_zero(comp.days_since_sale))).unwrap_or(0.0);
    if mean_days_since_sale > thresholds.max_mean_days_since_sale {
        soft_warnings.push(format!(
            "Comps are {mean_days_since_sale:.0} days old on average; verify ARV manually"
        ));
    }

    let mean_distance =
        mean(comps.iter().map(|comp| finite_or_zero(comp.distance))).unwrap_or(0.0);
    if mean_distance > thresholds.max_mean_distance_miles {
        soft_warnings.push(format!(
            "Comps are {mean_distance:.2} miles away on average; verify ARV manually"
        ));
    }

    QualityVerdict {
        accepted: hard_failures.is_empty(),
        hard_failure_reason: hard_failures.first().map(HardFailure::summary),
        hard_failures,
        soft_warnings,
        metrics: CompMetrics {
            comp_count: comps.len(),
            mean_price,
            price_per_area,
            listing_ratio,
            price_variance_pct,
            mean_days_since_sale,
            mean_distance,
        },
    }
}

fn price_variance_pct(comps: &[CompRecord], mean_price: f64) -> Option<f64> {
    if mean_price <= 0.0 {
        return None;
    }

    let prices = comps.iter().map(|comp| finite_or_zero(comp.price));
    let min = prices.clone().fold(f64::INFINITY, f64::min);
    let max = prices.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    Some((max - min) / mean_price * 100.0)
}
