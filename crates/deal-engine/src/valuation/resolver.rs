use tracing::{debug, info, warn};

use super::domain::{
    CompRecord, ConfidenceTier, PropertyDescriptor, PropertyType, ResolutionBranch,
    ValuationResult, ValuationSource,
};
use super::money::{finite_or_zero, format_currency, whole};
use super::quality::{self, QualityVerdict};
use super::regional::{self, FallbackEstimate, FallbackOutcome, DEFAULT_REGIONAL_MULTIPLIER};
use crate::config::EngineThresholds;

/// Turns comps, their quality verdict, and the regional fallback into one valuation.
///
/// Each outcome is a named [`ResolutionBranch`] so the choice is auditable.
#[derive(Debug, Clone, Default)]
pub struct ValuationResolver {
    thresholds: EngineThresholds,
}

impl ValuationResolver {
    pub fn new(thresholds: EngineThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &EngineThresholds {
        &self.thresholds
    }

    /// Resolves a valuation from (already normalized) search comps.
    pub fn resolve(&self, property: &PropertyDescriptor, comps: &[CompRecord]) -> ValuationResult {
        let Some(mean_price) = quality::mean_comp_price(comps) else {
            return self.resolve_without_comps(property);
        };

        let verdict = quality::validate(
            mean_price,
            property.area,
            property.usable_listing_price(),
            comps,
            &self.thresholds,
        );

        if verdict.accepted {
            return accepted_comps(mean_price, comps, verdict);
        }

        warn!(
            reason = verdict.hard_failure_reason.as_deref().unwrap_or_default(),
            address = %property.display_address(),
            "comps failed sanity bounds"
        );

        if property.property_type == PropertyType::Land {
            return land_comps_rejected(comps, verdict);
        }

        let fallback = regional::estimate(
            property.area,
            &property.region_code(),
            property.property_type,
            &self.thresholds,
        );
        let fallback = match fallback {
            FallbackOutcome::Estimate(estimate) => estimate,
            FallbackOutcome::ManualRequired { reason } => {
                return rejected_without_fallback(comps, verdict, reason);
            }
        };

        if verdict.listing_ratio_too_low() {
            self.distressed_comps(property, mean_price, comps, verdict, &fallback)
        } else if verdict.listing_ratio_too_high()
            || (verdict.price_per_area_too_high() && property.usable_listing_price().is_some())
        {
            self.inflated_comps(property, mean_price, verdict, &fallback)
        } else {
            self.per_area_outlier(property, verdict, &fallback)
        }
    }

    /// Resolves from operator-entered comps. No sanity veto is applied; the
    /// operator has vouched for them.
    pub fn resolve_manual(&self, manual_comps: &[CompRecord]) -> ValuationResult {
        let priced: Vec<CompRecord> = manual_comps
            .iter()
            .filter(|comp| finite_or_zero(comp.price) > 0.0)
            .cloned()
            .collect();
        let ignored = manual_comps.len() - priced.len();

        let mut warnings = Vec::new();
        if ignored > 0 {
            warnings.push(format!(
                "Ignored {ignored} manual comp(s) without a positive price"
            ));
        }

        let Some(mean_price) = quality::mean_comp_price(&priced) else {
            warnings.push("No priced manual comps entered; value must be entered manually".to_string());
            return ValuationResult {
                value: 0.0,
                source: ValuationSource::ManualRequired,
                branch: ResolutionBranch::ManualCompsEmpty,
                confidence: ConfidenceTier::Unverified,
                range_low: None,
                range_high: None,
                warnings,
                comps_used: Vec::new(),
                verdict: None,
            };
        };

        debug!(comps = priced.len(), mean_price, "valuing from manual comps");
        ValuationResult {
            value: whole(mean_price),
            source: ValuationSource::ManualComps,
            branch: ResolutionBranch::ManualComps,
            confidence: ConfidenceTier::Medium,
            range_low: None,
            range_high: None,
            warnings,
            comps_used: priced,
            verdict: None,
        }
    }

    fn resolve_without_comps(&self, property: &PropertyDescriptor) -> ValuationResult {
        if property.property_type == PropertyType::Land {
            info!(address = %property.display_address(), "no land comps; manual value required");
            return ValuationResult {
                value: 0.0,
                source: ValuationSource::ManualRequired,
                branch: ResolutionBranch::LandWithoutComps,
                confidence: ConfidenceTier::Unverified,
                range_low: None,
                range_high: None,
                warnings: vec![
                    "No land comps found; land value must be entered manually (zoning, utilities, and access drive land pricing)"
                        .to_string(),
                ],
                comps_used: Vec::new(),
                verdict: None,
            };
        }

        let region = property.region_code();
        match regional::estimate(
            property.area,
            &region,
            property.property_type,
            &self.thresholds,
        ) {
            FallbackOutcome::Estimate(fallback) => {
                info!(
                    address = %property.display_address(),
                    estimate = fallback.estimate,
                    "no comps found; using regional estimate"
                );
                let mut warnings = vec![format!(
                    "No comps found; using regional estimate {} (range {}-{}); verify manually before making offers",
                    format_currency(fallback.estimate),
                    format_currency(fallback.range_low),
                    format_currency(fallback.range_high),
                )];
                let confidence = region_confidence(&region, &fallback, &mut warnings, false);

                ValuationResult {
                    value: fallback.estimate,
                    source: ValuationSource::RegionalFallback,
                    branch: ResolutionBranch::NoComps,
                    confidence,
                    range_low: Some(fallback.range_low),
                    range_high: Some(fallback.range_high),
                    warnings,
                    comps_used: Vec::new(),
                    verdict: None,
                }
            }
            FallbackOutcome::ManualRequired { reason } => ValuationResult {
                value: 0.0,
                source: ValuationSource::ManualRequired,
                branch: ResolutionBranch::NoComps,
                confidence: ConfidenceTier::Unverified,
                range_low: None,
                range_high: None,
                warnings: vec!["No comps found".to_string(), reason],
                comps_used: Vec::new(),
                verdict: None,
            },
        }
    }

    fn distressed_comps(
        &self,
        property: &PropertyDescriptor,
        mean_price: f64,
        comps: &[CompRecord],
        verdict: QualityVerdict,
        fallback: &FallbackEstimate,
    ) -> ValuationResult {
        let value = whole(mean_price.max(fallback.estimate));
        let mut warnings = failure_warnings(&verdict);
        warnings.push(format!(
            "Comps may reflect distressed sales; using the higher of comp average {} and regional estimate {}: {}. Comps kept for review, verify manually",
            format_currency(mean_price),
            format_currency(fallback.estimate),
            format_currency(value),
        ));
        let confidence =
            region_confidence(&property.region_code(), fallback, &mut warnings, true);
        warnings.extend(verdict.soft_warnings.iter().cloned());

        ValuationResult {
            value,
            source: ValuationSource::RegionalFallback,
            branch: ResolutionBranch::DistressedComps,
            confidence,
            range_low: Some(whole(value * self.thresholds.fallback_range_low)),
            range_high: Some(whole(value * self.thresholds.fallback_range_high)),
            warnings,
            comps_used: comps.to_vec(),
            verdict: Some(verdict),
        }
    }

    fn inflated_comps(
        &self,
        property: &PropertyDescriptor,
        mean_price: f64,
        verdict: QualityVerdict,
        fallback: &FallbackEstimate,
    ) -> ValuationResult {
        let mut warnings = failure_warnings(&verdict);
        warnings.push(format!(
            "Comps appear inflated (average {}); comps discarded, using regional estimate {}",
            format_currency(mean_price),
            format_currency(fallback.estimate),
        ));
        let confidence =
            region_confidence(&property.region_code(), fallback, &mut warnings, true);
        warnings.extend(verdict.soft_warnings.iter().cloned());

        discarded_comps(ResolutionBranch::InflatedComps, confidence, warnings, verdict, fallback)
    }

    fn per_area_outlier(
        &self,
        property: &PropertyDescriptor,
        verdict: QualityVerdict,
        fallback: &FallbackEstimate,
    ) -> ValuationResult {
        let mut warnings = failure_warnings(&verdict);
        warnings.push(format!(
            "Comps discarded; using regional estimate {} ({:.0}/sqft), verify with your own comps",
            format_currency(fallback.estimate),
            fallback.effective_multiplier,
        ));
        let confidence =
            region_confidence(&property.region_code(), fallback, &mut warnings, true);
        warnings.extend(verdict.soft_warnings.iter().cloned());

        discarded_comps(ResolutionBranch::PerAreaOutlier, confidence, warnings, verdict, fallback)
    }
}

fn accepted_comps(mean_price: f64, comps: &[CompRecord], verdict: QualityVerdict) -> ValuationResult {
    let confidence = if verdict.soft_warnings.is_empty() {
        ConfidenceTier::High
    } else {
        ConfidenceTier::Medium
    };

    ValuationResult {
        value: whole(mean_price),
        source: ValuationSource::LiveComps,
        branch: ResolutionBranch::AcceptedComps,
        confidence,
        range_low: None,
        range_high: None,
        warnings: verdict.soft_warnings.clone(),
        comps_used: comps.to_vec(),
        verdict: Some(verdict),
    }
}

fn land_comps_rejected(comps: &[CompRecord], verdict: QualityVerdict) -> ValuationResult {
    let mut warnings = failure_warnings(&verdict);
    warnings.push(
        "Land comps failed sanity checks and land has no regional estimate; value must be entered manually"
            .to_string(),
    );
    warnings.extend(verdict.soft_warnings.iter().cloned());

    ValuationResult {
        value: 0.0,
        source: ValuationSource::ManualRequired,
        branch: ResolutionBranch::LandCompsRejected,
        confidence: ConfidenceTier::Unverified,
        range_low: None,
        range_high: None,
        warnings,
        comps_used: comps.to_vec(),
        verdict: Some(verdict),
    }
}

fn rejected_without_fallback(
    comps: &[CompRecord],
    verdict: QualityVerdict,
    reason: String,
) -> ValuationResult {
    let mut warnings = failure_warnings(&verdict);
    warnings.push(reason);
    warnings.extend(verdict.soft_warnings.iter().cloned());

    let branch = if verdict.listing_ratio_too_low() {
        ResolutionBranch::DistressedComps
    } else if verdict.listing_ratio_too_high() {
        ResolutionBranch::InflatedComps
    } else {
        ResolutionBranch::PerAreaOutlier
    };

    ValuationResult {
        value: 0.0,
        source: ValuationSource::ManualRequired,
        branch,
        confidence: ConfidenceTier::Unverified,
        range_low: None,
        range_high: None,
        warnings,
        comps_used: comps.to_vec(),
        verdict: Some(verdict),
    }
}

fn discarded_comps(
    branch: ResolutionBranch,
    confidence: ConfidenceTier,
    warnings: Vec<String>,
    verdict: QualityVerdict,
    fallback: &FallbackEstimate,
) -> ValuationResult {
    ValuationResult {
        value: fallback.estimate,
        source: ValuationSource::RegionalFallback,
        branch,
        confidence,
        range_low: Some(fallback.range_low),
        range_high: Some(fallback.range_high),
        warnings,
        comps_used: Vec::new(),
        verdict: Some(verdict),
    }
}

fn failure_warnings(verdict: &QualityVerdict) -> Vec<String> {
    verdict
        .hard_failures
        .iter()
        .map(|failure| format!("Comp quality check failed: {}", failure.summary()))
        .collect()
}

/// Fallback estimates are low confidence; an unrecognized region on top of
/// rejected comps compounds two guesses and drops to unverified.
fn region_confidence(
    region: &str,
    fallback: &FallbackEstimate,
    warnings: &mut Vec<String>,
    comps_rejected: bool,
) -> ConfidenceTier {
    if fallback.region_recognized {
        return ConfidenceTier::Low;
    }

    let label = if region.is_empty() { "(none)" } else { region };
    warnings.push(format!(
        "Region {label} not recognized; default ${DEFAULT_REGIONAL_MULTIPLIER:.0}/sqft multiplier applied"
    ));

    if comps_rejected {
        warnings.push(
            "Very low confidence: comps were rejected and the regional estimate uses a default multiplier"
                .to_string(),
        );
        ConfidenceTier::Unverified
    } else {
        ConfidenceTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(property_type: PropertyType, state: &str, listing: Option<f64>) -> PropertyDescriptor {
        PropertyDescriptor {
            address: "220 Poplar St".to_string(),
            city: "Dayton".to_string(),
            state: state.to_string(),
            area: 1500.0,
            property_type,
            listing_price: listing,
            ..PropertyDescriptor::default()
        }
    }

    fn comps(prices: &[f64]) -> Vec<CompRecord> {
        prices
            .iter()
            .enumerate()
            .map(|(idx, price)| CompRecord {
                address: format!("{} Comp Rd", idx + 1),
                price: *price,
                beds: 3.0,
                baths: 2.0,
                area: 1500.0,
                distance: 0.3,
                days_since_sale: 30.0,
            })
            .collect()
    }

    fn resolver() -> ValuationResolver {
        ValuationResolver::default()
    }

    #[test]
    fn land_without_comps_requires_manual_value() {
        let result = resolver().resolve(&property(PropertyType::Land, "TX", None), &[]);

        assert_eq!(result.branch, ResolutionBranch::LandWithoutComps);
        assert_eq!(result.source, ValuationSource::ManualRequired);
        assert_eq!(result.value, 0.0);
        assert!(result.warnings[0].contains("entered manually"));
    }

    #[test]
    fn accepted_comps_use_mean_price() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "OH", Some(200_000.0)),
            &comps(&[480_000.0, 500_000.0, 520_000.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::AcceptedComps);
        assert_eq!(result.source, ValuationSource::LiveComps);
        assert_eq!(result.value, 500_000.0);
        assert_eq!(result.confidence, ConfidenceTier::High);
        assert!(result.warnings.is_empty());
        assert_eq!(result.comps_used.len(), 3);
    }

    #[test]
    fn accepted_comps_with_soft_warnings_drop_to_medium() {
        let mut stale = comps(&[200_000.0, 210_000.0]);
        for comp in &mut stale {
            comp.days_since_sale = 200.0;
        }

        let result = resolver().resolve(&property(PropertyType::Residential, "OH", None), &stale);

        assert_eq!(result.source, ValuationSource::LiveComps);
        assert_eq!(result.confidence, ConfidenceTier::Medium);
        assert!(result.warnings[0].contains("days old"));
    }

    #[test]
    fn distressed_comps_take_higher_of_mean_and_fallback() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "OH", Some(300_000.0)),
            &comps(&[150_000.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::DistressedComps);
        assert_eq!(result.source, ValuationSource::RegionalFallback);
        assert_eq!(result.value, 210_000.0);
        assert_eq!(result.range_low, Some(168_000.0));
        assert_eq!(result.range_high, Some(252_000.0));
        assert_eq!(result.comps_used.len(), 1);
        assert!(result
            .warnings
            .iter()
            .any(|warning| warning.contains("distressed sales")));
    }

    #[test]
    fn inflated_comps_are_discarded() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "OH", Some(100_000.0)),
            &comps(&[400_000.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::InflatedComps);
        assert_eq!(result.value, 210_000.0);
        assert!(result.comps_used.is_empty());
        assert!(result.warnings[0].contains("4.0x listing"));
    }

    #[test]
    fn luxury_per_area_with_listing_counts_as_inflated() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "OH", Some(400_000.0)),
            &comps(&[900_000.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::InflatedComps);
        assert!(result.comps_used.is_empty());
    }

    #[test]
    fn per_area_outlier_without_listing_names_the_bound() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "OH", None),
            &comps(&[900_000.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::PerAreaOutlier);
        assert_eq!(result.value, 210_000.0);
        assert!(result.comps_used.is_empty());
        assert!(result.warnings[0].contains("Price/sqft too high: $600/sqft"));
        assert_eq!(result.confidence, ConfidenceTier::Low);
    }

    #[test]
    fn zero_priced_comps_fall_back_without_nan() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "OH", None),
            &comps(&[0.0, 0.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::PerAreaOutlier);
        assert!(result.value.is_finite());
        assert_eq!(result.value, 210_000.0);
    }

    #[test]
    fn no_comps_uses_regional_estimate() {
        let result = resolver().resolve(&property(PropertyType::Residential, "OH", None), &[]);

        assert_eq!(result.branch, ResolutionBranch::NoComps);
        assert_eq!(result.source, ValuationSource::RegionalFallback);
        assert_eq!(result.value, 210_000.0);
        assert_eq!(result.confidence, ConfidenceTier::Low);
        assert!(result.warnings[0].contains("No comps found"));
    }

    #[test]
    fn unknown_region_without_comps_stays_low() {
        let result = resolver().resolve(&property(PropertyType::Residential, "ZZ", None), &[]);

        assert_eq!(result.value, 240_000.0);
        assert_eq!(result.confidence, ConfidenceTier::Low);
        assert!(result.warnings[1].contains("Region ZZ not recognized"));
    }

    #[test]
    fn rejected_comps_in_unknown_region_are_unverified() {
        let result = resolver().resolve(
            &property(PropertyType::Residential, "ZZ", None),
            &comps(&[900_000.0]),
        );

        assert_eq!(result.source, ValuationSource::RegionalFallback);
        assert_eq!(result.confidence, ConfidenceTier::Unverified);
        assert!(result
            .warnings
            .iter()
            .any(|warning| warning.starts_with("Very low confidence")));
    }

    #[test]
    fn rejected_land_comps_require_manual_value() {
        let result = resolver().resolve(
            &property(PropertyType::Land, "TX", Some(20_000.0)),
            &comps(&[150_000.0]),
        );

        assert_eq!(result.branch, ResolutionBranch::LandCompsRejected);
        assert_eq!(result.source, ValuationSource::ManualRequired);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.comps_used.len(), 1);
    }

    #[test]
    fn missing_area_without_comps_requires_manual_value() {
        let mut subject = property(PropertyType::Residential, "OH", None);
        subject.area = 0.0;

        let result = resolver().resolve(&subject, &[]);

        assert_eq!(result.source, ValuationSource::ManualRequired);
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn manual_comps_skip_the_veto() {
        let result = resolver().resolve_manual(&comps(&[2_000_000.0, 0.0, 2_200_000.0]));

        assert_eq!(result.source, ValuationSource::ManualComps);
        assert_eq!(result.value, 2_100_000.0);
        assert_eq!(result.comps_used.len(), 2);
        assert!(result.warnings[0].contains("Ignored 1 manual comp"));
    }

    #[test]
    fn empty_manual_comps_require_manual_value() {
        let result = resolver().resolve_manual(&[]);

        assert_eq!(result.branch, ResolutionBranch::ManualCompsEmpty);
        assert_eq!(result.source, ValuationSource::ManualRequired);
        assert_eq!(result.value, 0.0);
    }
}
