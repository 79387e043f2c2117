use std::collections::{BTreeMap, BTreeSet};

use super::super::domain::{PropertyType, RepairEstimate, RepairMethod};
use super::super::money::whole;
use super::catalog::{catalog_for, RepairItem};

/// Sums band midpoints over the selected catalog keys.
///
/// Selection order and duplicates do not matter. An empty selection is only
/// a final zero when the caller has confirmed it.
pub(crate) fn estimate_checklist(
    selected: &[String],
    confirmed: bool,
    property_type: PropertyType,
) -> RepairEstimate {
    let catalog = catalog_for(property_type);
    let mut notes = Vec::new();
    let mut items = BTreeSet::new();

    for key in selected {
        match RepairItem::parse(key) {
            Some(item) if catalog.contains(&item) => {
                items.insert(item);
            }
            Some(item) => notes.push(format!(
                "Ignored '{}': not in the {} repair catalog",
                item.key(),
                property_type.label()
            )),
            None => notes.push(format!("Ignored unknown repair item '{}'", key.trim())),
        }
    }

    if items.is_empty() {
        return if confirmed {
            RepairEstimate {
                total_cost: 0.0,
                method: RepairMethod::NoneConfirmed,
                line_items: BTreeMap::new(),
                confirmed: true,
                range: None,
                breakdown: Vec::new(),
                notes,
            }
        } else {
            let mut estimate = RepairEstimate::unconfirmed(
                RepairMethod::Checklist,
                "No repairs selected and none confirmed; repair cost is not final",
            );
            estimate.notes.extend(notes);
            estimate
        };
    }

    let mut line_items = BTreeMap::new();
    let mut breakdown = Vec::with_capacity(items.len());
    let mut total = 0.0;
    for item in &items {
        let band = item.band();
        let cost = band.midpoint();
        total += cost;
        line_items.insert(item.label().to_string(), cost);
        breakdown.push(format!("{}: {}", item.label(), band.describe()));
    }

    RepairEstimate {
        total_cost: whole(total),
        method: RepairMethod::Checklist,
        line_items,
        confirmed: true,
        range: None,
        breakdown,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn sums_midpoints_of_selected_items() {
        let estimate = estimate_checklist(
            &keys(&["roof", "kitchen", "hvac"]),
            false,
            PropertyType::Residential,
        );

        assert_eq!(estimate.total_cost, 11_500.0 + 22_500.0 + 6_500.0);
        assert_eq!(estimate.method, RepairMethod::Checklist);
        assert!(estimate.confirmed);
        assert_eq!(estimate.line_items.get("Roof Replacement"), Some(&11_500.0));
    }

    #[test]
    fn duplicate_and_reordered_keys_do_not_change_total() {
        let forward = estimate_checklist(
            &keys(&["plumbing", "roof", "flooring"]),
            false,
            PropertyType::Residential,
        );
        let shuffled = estimate_checklist(
            &keys(&["flooring", "roof", "plumbing", "roof"]),
            false,
            PropertyType::Residential,
        );

        assert_eq!(forward, shuffled);
    }

    #[test]
    fn unconfirmed_empty_selection_is_not_final() {
        let estimate = estimate_checklist(&[], false, PropertyType::Residential);

        assert_eq!(estimate.total_cost, 0.0);
        assert_eq!(estimate.method, RepairMethod::Checklist);
        assert!(!estimate.confirmed);
        assert!(!estimate.notes.is_empty());
    }

    #[test]
    fn confirmed_empty_selection_is_none_confirmed() {
        let estimate = estimate_checklist(&[], true, PropertyType::Land);

        assert_eq!(estimate.total_cost, 0.0);
        assert_eq!(estimate.method, RepairMethod::NoneConfirmed);
        assert!(estimate.confirmed);
    }

    #[test]
    fn keys_outside_property_catalog_are_noted() {
        let estimate = estimate_checklist(
            &keys(&["roof", "survey", "jacuzzi"]),
            false,
            PropertyType::Land,
        );

        assert_eq!(estimate.total_cost, 1_250.0);
        assert_eq!(estimate.notes.len(), 2);
        assert!(estimate.notes[0].contains("land repair catalog"));
        assert!(estimate.notes[1].contains("jacuzzi"));
    }
}
