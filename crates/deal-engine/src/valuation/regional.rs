//! Regional price-density table and the area-based fallback estimates built on it.
//!
//! The table is the single source of regional multipliers for every fallback
//! path. Values are median dollars per square foot by state and are curated,
//! not fetched.

use serde::Serialize;

use super::domain::PropertyType;
use super::money::{finite_or_zero, whole};
use crate::config::EngineThresholds;

/// Multiplier applied when a region is missing from the table.
pub const DEFAULT_REGIONAL_MULTIPLIER: f64 = 160.0;

/// Year assumed for repair banding when the subject has no construction year.
pub const DEFAULT_YEAR_BUILT: i32 = 1980;

static REGIONAL_MULTIPLIERS: &[(&str, f64)] = &[
    ("AK", 200.0),
    ("AL", 130.0),
    ("AR", 120.0),
    ("AZ", 200.0),
    ("CA", 350.0),
    ("CO", 250.0),
    ("CT", 230.0),
    ("DE", 210.0),
    ("FL", 220.0),
    ("GA", 170.0),
    ("HI", 380.0),
    ("IA", 130.0),
    ("ID", 180.0),
    ("IL", 180.0),
    ("IN", 125.0),
    ("KS", 130.0),
    ("KY", 130.0),
    ("LA", 140.0),
    ("MA", 280.0),
    ("MD", 210.0),
    ("ME", 180.0),
    ("MI", 130.0),
    ("MN", 170.0),
    ("MO", 135.0),
    ("MS", 110.0),
    ("MT", 180.0),
    ("NC", 180.0),
    ("ND", 130.0),
    ("NE", 140.0),
    ("NH", 220.0),
    ("NJ", 250.0),
    ("NM", 150.0),
    ("NV", 200.0),
    ("NY", 280.0),
    ("OH", 140.0),
    ("OK", 130.0),
    ("OR", 240.0),
    ("PA", 150.0),
    ("RI", 240.0),
    ("SC", 150.0),
    ("SD", 120.0),
    ("TN", 160.0),
    ("TX", 180.0),
    ("UT", 200.0),
    ("VA", 190.0),
    ("VT", 200.0),
    ("WA", 260.0),
    ("WI", 160.0),
    ("WV", 100.0),
    ("WY", 160.0),
];

/// Looks up a region code (case-insensitive). `None` means the default applies.
pub fn regional_multiplier(region: &str) -> Option<f64> {
    let key = region.trim().to_ascii_uppercase();
    REGIONAL_MULTIPLIERS
        .binary_search_by(|(code, _)| (*code).cmp(key.as_str()))
        .ok()
        .map(|idx| REGIONAL_MULTIPLIERS[idx].1)
}

/// Every known region with its multiplier, sorted by code.
pub fn regions() -> impl Iterator<Item = (&'static str, f64)> {
    REGIONAL_MULTIPLIERS.iter().copied()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEstimate {
    pub estimate: f64,
    pub range_low: f64,
    pub range_high: f64,
    /// Dollars per square foot after the property-type adjustment.
    pub effective_multiplier: f64,
    pub region_recognized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    Estimate(FallbackEstimate),
    ManualRequired { reason: String },
}

/// Area-based estimate for non-land property.
///
/// Land never gets an area heuristic: zoning, utilities and access dominate
/// its price, so a per-foot number would mislead rather than approximate.
pub fn estimate(
    area: f64,
    region: &str,
    property_type: PropertyType,
    thresholds: &EngineThresholds,
) -> FallbackOutcome {
    if property_type == PropertyType::Land {
        return FallbackOutcome::ManualRequired {
            reason: "Land cannot be valued from an area multiplier; enter land value manually"
                .to_string(),
        };
    }

    let area = finite_or_zero(area);
    if area <= 0.0 {
        return FallbackOutcome::ManualRequired {
            reason: "Subject area is missing or zero; regional estimate unavailable, enter value manually"
                .to_string(),
        };
    }

    let known = regional_multiplier(region);
    let mut multiplier = known.unwrap_or(DEFAULT_REGIONAL_MULTIPLIER);
    if property_type == PropertyType::Commercial {
        multiplier *= thresholds.commercial_fallback_adjustment;
    }

    let estimate = whole(area * multiplier);
    FallbackOutcome::Estimate(FallbackEstimate {
        estimate,
        range_low: whole(estimate * thresholds.fallback_range_low),
        range_high: whole(estimate * thresholds.fallback_range_high),
        effective_multiplier: multiplier,
        region_recognized: known.is_some(),
    })
}

/// Repair dollars per square foot by property age.
pub fn age_band_rate(age_years: i32) -> f64 {
    match age_years {
        i32::MIN..=9 => 8.0,
        10..=19 => 12.0,
        20..=50 => 15.0,
        51..=70 => 25.0,
        _ => 30.0,
    }
}

/// Oldest construction year taken at face value.
pub const EARLIEST_YEAR_BUILT: i32 = 1700;

/// Keeps a year built only when it lies between [`EARLIEST_YEAR_BUILT`] and `as_of_year`.
pub fn plausible_year_built(year_built: Option<i32>, as_of_year: i32) -> Option<i32> {
    year_built.filter(|year| (EARLIEST_YEAR_BUILT..=as_of_year).contains(year))
}

/// Property age in years; implausible or missing years fall back to [`DEFAULT_YEAR_BUILT`].
pub fn property_age(year_built: Option<i32>, as_of_year: i32) -> i32 {
    let year_built = plausible_year_built(year_built, as_of_year).unwrap_or(DEFAULT_YEAR_BUILT);
    as_of_year.saturating_sub(year_built)
}

/// Age-band repair bucket multiplied by subject area.
pub fn age_band_repair_cost(area: f64, year_built: Option<i32>, as_of_year: i32) -> f64 {
    let area = finite_or_zero(area).max(0.0);
    whole(area * age_band_rate(property_age(year_built, as_of_year)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> EngineThresholds {
        EngineThresholds::default()
    }

    #[test]
    fn table_is_sorted_for_lookup() {
        let codes: Vec<&str> = regions().map(|(code, _)| code).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(regional_multiplier("oh"), Some(140.0));
        assert_eq!(regional_multiplier(" CA "), Some(350.0));
        assert_eq!(regional_multiplier("ZZ"), None);
    }

    #[test]
    fn residential_estimate_uses_region_multiplier_and_range() {
        let FallbackOutcome::Estimate(estimate) =
            estimate(1500.0, "OH", PropertyType::Residential, &thresholds())
        else {
            panic!("residential should produce an estimate");
        };

        assert_eq!(estimate.estimate, 210_000.0);
        assert_eq!(estimate.range_low, 168_000.0);
        assert_eq!(estimate.range_high, 252_000.0);
        assert!(estimate.region_recognized);
    }

    #[test]
    fn commercial_estimate_applies_adjustment() {
        let FallbackOutcome::Estimate(estimate) =
            estimate(2000.0, "OH", PropertyType::Commercial, &thresholds())
        else {
            panic!("commercial should produce an estimate");
        };

        assert_eq!(estimate.estimate, 182_000.0);
        assert!((estimate.effective_multiplier - 91.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_region_uses_default_multiplier() {
        let FallbackOutcome::Estimate(estimate) =
            estimate(1000.0, "", PropertyType::Residential, &thresholds())
        else {
            panic!("default multiplier should apply");
        };

        assert_eq!(estimate.estimate, 160_000.0);
        assert!(!estimate.region_recognized);
    }

    #[test]
    fn land_never_gets_an_area_estimate() {
        let outcome = estimate(43_560.0, "TX", PropertyType::Land, &thresholds());
        assert!(matches!(outcome, FallbackOutcome::ManualRequired { .. }));
    }

    #[test]
    fn zero_area_requires_manual_value() {
        let outcome = estimate(0.0, "TX", PropertyType::Residential, &thresholds());
        assert!(matches!(outcome, FallbackOutcome::ManualRequired { .. }));

        let outcome = estimate(f64::NAN, "TX", PropertyType::Residential, &thresholds());
        assert!(matches!(outcome, FallbackOutcome::ManualRequired { .. }));
    }

    #[test]
    fn age_bands_follow_bucket_edges() {
        assert_eq!(age_band_rate(0), 8.0);
        assert_eq!(age_band_rate(9), 8.0);
        assert_eq!(age_band_rate(10), 12.0);
        assert_eq!(age_band_rate(20), 15.0);
        assert_eq!(age_band_rate(50), 15.0);
        assert_eq!(age_band_rate(51), 25.0);
        assert_eq!(age_band_rate(70), 25.0);
        assert_eq!(age_band_rate(71), 30.0);
    }

    #[test]
    fn age_band_cost_defaults_missing_year() {
        assert_eq!(age_band_repair_cost(1000.0, None, 2025), 15_000.0);
        assert_eq!(age_band_repair_cost(1000.0, Some(2020), 2025), 8_000.0);
    }

    #[test]
    fn implausible_years_use_default_age() {
        assert_eq!(property_age(Some(i32::MIN), 2025), 45);
        assert_eq!(property_age(Some(2031), 2025), 45);
        assert_eq!(property_age(Some(1956), i32::MIN), i32::MIN.saturating_sub(DEFAULT_YEAR_BUILT));
        assert_eq!(age_band_repair_cost(1000.0, Some(i32::MAX), 2025), 15_000.0);
    }
}
