use std::collections::BTreeMap;

use super::super::domain::{CostRange, PropertyType, RepairEstimate, RepairMethod};
use super::super::money::{format_currency, whole};
use super::catalog::{baseline_for, catalog_for};

/// Matches keyword groups from the property's catalog against free text.
pub(crate) fn estimate_from_description(
    description: &str,
    property_type: PropertyType,
    uncertainty: f64,
) -> RepairEstimate {
    let text = description.trim().to_lowercase();
    if text.is_empty() {
        return RepairEstimate::unconfirmed(
            RepairMethod::Heuristic,
            "Repair description is empty; describe the needed work to estimate repairs",
        );
    }

    let mut line_items = BTreeMap::new();
    let mut breakdown = Vec::new();
    let mut total = 0.0;

    for item in catalog_for(property_type)
        .iter()
        .filter(|item| item.matches(&text))
    {
        let band = item.band();
        total += band.midpoint();
        line_items.insert(item.label().to_string(), band.midpoint());
        breakdown.push(format!("{}: {}", item.label(), band.describe()));
    }

    let mut notes = Vec::new();
    if line_items.is_empty() {
        let baseline = baseline_for(property_type);
        total = baseline.cost;
        line_items.insert(baseline.label.to_string(), baseline.cost);
        breakdown.push(format!("{}: {}", baseline.label, baseline.band.describe()));
        notes.push(format!(
            "No specific repairs recognized; applied {} baseline",
            baseline.label.to_lowercase()
        ));
    }

    let uncertainty = if uncertainty.is_finite() {
        uncertainty.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let total = whole(total);
    let range = CostRange {
        low: whole(total * (1.0 - uncertainty)),
        high: whole(total * (1.0 + uncertainty)),
    };
    notes.push(format!(
        "Estimated repairs {}-{}",
        format_currency(range.low),
        format_currency(range.high)
    ));

    RepairEstimate {
        total_cost: total,
        method: RepairMethod::Heuristic,
        line_items,
        confirmed: true,
        range: Some(range),
        breakdown,
        notes,
    }
}
