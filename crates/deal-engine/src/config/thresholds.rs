use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use super::ConfigError;

/// Heuristic constants used by the valuation and offer rules.
///
/// None of these are derived from market data; they are operator-tunable and
/// should be reviewed by whoever owns deal policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineThresholds {
    /// Comp mean price per square foot above this is treated as luxury contamination.
    pub max_price_per_area: f64,
    /// Comp mean price per square foot below this is treated as distressed or land-like.
    pub min_price_per_area: f64,
    pub max_listing_ratio: f64,
    pub min_listing_ratio: f64,
    /// Percent spread between the cheapest and dearest comp, relative to the mean.
    pub max_price_variance_pct: f64,
    pub max_mean_days_since_sale: f64,
    pub max_mean_distance_miles: f64,
    pub max_comps: usize,
    pub commercial_fallback_adjustment: f64,
    pub fallback_range_low: f64,
    pub fallback_range_high: f64,
    pub residential_mao_multiplier: f64,
    pub conservative_mao_multiplier: f64,
    /// Inclusive lower bound of a SOLID spread.
    pub solid_spread: f64,
    pub suspicious_mao_ratio: f64,
    pub unrealistic_mao_ratio: f64,
    pub heuristic_uncertainty: f64,
    pub default_assignment_fee: f64,
}

impl Default for EngineThresholds {
    fn default() -> Self {
        Self {
            max_price_per_area: 450.0,
            min_price_per_area: 50.0,
            max_listing_ratio: 3.0,
            min_listing_ratio: 0.8,
            max_price_variance_pct: 20.0,
            max_mean_days_since_sale: 120.0,
            max_mean_distance_miles: 0.75,
            max_comps: 3,
            commercial_fallback_adjustment: 0.65,
            fallback_range_low: 0.8,
            fallback_range_high: 1.2,
            residential_mao_multiplier: 0.70,
            conservative_mao_multiplier: 0.65,
            solid_spread: 25_000.0,
            suspicious_mao_ratio: 1.3,
            unrealistic_mao_ratio: 1.5,
            heuristic_uncertainty: 0.15,
            default_assignment_fee: 20_000.0,
        }
    }
}

impl EngineThresholds {
    /// Applies `DEAL_*` environment overrides on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut thresholds = Self::default();

        override_from_env("DEAL_MAX_PRICE_PER_AREA", &mut thresholds.max_price_per_area)?;
        override_from_env("DEAL_MIN_PRICE_PER_AREA", &mut thresholds.min_price_per_area)?;
        override_from_env("DEAL_MAX_LISTING_RATIO", &mut thresholds.max_listing_ratio)?;
        override_from_env("DEAL_MIN_LISTING_RATIO", &mut thresholds.min_listing_ratio)?;
        override_from_env(
            "DEAL_MAX_PRICE_VARIANCE_PCT",
            &mut thresholds.max_price_variance_pct,
        )?;
        override_from_env(
            "DEAL_MAX_MEAN_DAYS_SINCE_SALE",
            &mut thresholds.max_mean_days_since_sale,
        )?;
        override_from_env(
            "DEAL_MAX_MEAN_DISTANCE_MILES",
            &mut thresholds.max_mean_distance_miles,
        )?;
        override_from_env("DEAL_MAX_COMPS", &mut thresholds.max_comps)?;
        override_from_env(
            "DEAL_COMMERCIAL_FALLBACK_ADJUSTMENT",
            &mut thresholds.commercial_fallback_adjustment,
        )?;
        override_from_env("DEAL_FALLBACK_RANGE_LOW", &mut thresholds.fallback_range_low)?;
        override_from_env("DEAL_FALLBACK_RANGE_HIGH", &mut thresholds.fallback_range_high)?;
        override_from_env(
            "DEAL_RESIDENTIAL_MAO_MULTIPLIER",
            &mut thresholds.residential_mao_multiplier,
        )?;
        override_from_env(
            "DEAL_CONSERVATIVE_MAO_MULTIPLIER",
            &mut thresholds.conservative_mao_multiplier,
        )?;
        override_from_env("DEAL_SOLID_SPREAD", &mut thresholds.solid_spread)?;
        override_from_env("DEAL_SUSPICIOUS_MAO_RATIO", &mut thresholds.suspicious_mao_ratio)?;
        override_from_env(
            "DEAL_UNREALISTIC_MAO_RATIO",
            &mut thresholds.unrealistic_mao_ratio,
        )?;
        override_from_env(
            "DEAL_HEURISTIC_UNCERTAINTY",
            &mut thresholds.heuristic_uncertainty,
        )?;
        override_from_env(
            "DEAL_DEFAULT_ASSIGNMENT_FEE",
            &mut thresholds.default_assignment_fee,
        )?;

        Ok(thresholds)
    }
}

fn override_from_env<T: FromStr>(name: &'static str, target: &mut T) -> Result<(), ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            *target = raw
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidThreshold { name })?;
            Ok(())
        }
        _ => Ok(()),
    }
}
