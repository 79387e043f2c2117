use serde::{Deserialize, Serialize};

use super::super::domain::PropertyType;
use super::super::money::format_currency;

/// Catalog entry a checklist can select or a description can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairItem {
    Roof,
    Hvac,
    Kitchen,
    Bathrooms,
    Flooring,
    PaintInterior,
    PaintExterior,
    Foundation,
    Electrical,
    Plumbing,
    Clearing,
    Grading,
    Survey,
    Utilities,
    Access,
    Environmental,
    Permits,
    Holding,
}

/// Dollar band for one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBand {
    pub min: f64,
    pub max: f64,
}

impl CostBand {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn describe(&self) -> String {
        format!("{}-{}", format_currency(self.min), format_currency(self.max))
    }
}

const RESIDENTIAL_CATALOG: &[RepairItem] = &[
    RepairItem::Roof,
    RepairItem::Hvac,
    RepairItem::Kitchen,
    RepairItem::Bathrooms,
    RepairItem::Flooring,
    RepairItem::PaintInterior,
    RepairItem::PaintExterior,
    RepairItem::Foundation,
    RepairItem::Electrical,
    RepairItem::Plumbing,
];

const LAND_CATALOG: &[RepairItem] = &[
    RepairItem::Clearing,
    RepairItem::Grading,
    RepairItem::Survey,
    RepairItem::Utilities,
    RepairItem::Access,
    RepairItem::Environmental,
    RepairItem::Permits,
    RepairItem::Holding,
];

/// Items offered for a property type. Commercial shares the building catalog.
pub fn catalog_for(property_type: PropertyType) -> &'static [RepairItem] {
    match property_type {
        PropertyType::Land => LAND_CATALOG,
        PropertyType::Residential | PropertyType::Commercial => RESIDENTIAL_CATALOG,
    }
}

impl RepairItem {
    pub fn key(self) -> &'static str {
        match self {
            RepairItem::Roof => "roof",
            RepairItem::Hvac => "hvac",
            RepairItem::Kitchen => "kitchen",
            RepairItem::Bathrooms => "bathrooms",
            RepairItem::Flooring => "flooring",
            RepairItem::PaintInterior => "paintInterior",
            RepairItem::PaintExterior => "paintExterior",
            RepairItem::Foundation => "foundation",
            RepairItem::Electrical => "electrical",
            RepairItem::Plumbing => "plumbing",
            RepairItem::Clearing => "clearing",
            RepairItem::Grading => "grading",
            RepairItem::Survey => "survey",
            RepairItem::Utilities => "utilities",
            RepairItem::Access => "access",
            RepairItem::Environmental => "environmental",
            RepairItem::Permits => "permits",
            RepairItem::Holding => "holding",
        }
    }

    /// Parses a catalog key, tolerating case and `snake_case` spellings.
    pub fn parse(key: &str) -> Option<Self> {
        let normalized: String = key
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-' && !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        [RESIDENTIAL_CATALOG, LAND_CATALOG]
            .into_iter()
            .flatten()
            .copied()
            .find(|item| item.key().to_ascii_lowercase() == normalized)
    }

    pub fn label(self) -> &'static str {
        match self {
            RepairItem::Roof => "Roof Replacement",
            RepairItem::Hvac => "HVAC System",
            RepairItem::Kitchen => "Kitchen Remodel",
            RepairItem::Bathrooms => "Bathroom(s)",
            RepairItem::Flooring => "Flooring",
            RepairItem::PaintInterior => "Paint Interior",
            RepairItem::PaintExterior => "Paint Exterior",
            RepairItem::Foundation => "Foundation Issues",
            RepairItem::Electrical => "Electrical Updates",
            RepairItem::Plumbing => "Plumbing Repairs",
            RepairItem::Clearing => "Land Clearing / Debris Removal",
            RepairItem::Grading => "Grading / Leveling",
            RepairItem::Survey => "Survey / Boundary Markers",
            RepairItem::Utilities => "Utility Connection",
            RepairItem::Access => "Road / Driveway Access",
            RepairItem::Environmental => "Environmental Testing",
            RepairItem::Permits => "Permits / Zoning",
            RepairItem::Holding => "Holding Costs (Taxes/Insurance)",
        }
    }

    pub fn band(self) -> CostBand {
        match self {
            RepairItem::Roof => CostBand::new(8_000.0, 15_000.0),
            RepairItem::Hvac => CostBand::new(5_000.0, 8_000.0),
            RepairItem::Kitchen => CostBand::new(15_000.0, 30_000.0),
            RepairItem::Bathrooms => CostBand::new(8_000.0, 12_000.0),
            RepairItem::Flooring => CostBand::new(3_000.0, 8_000.0),
            RepairItem::PaintInterior => CostBand::new(2_000.0, 4_000.0),
            RepairItem::PaintExterior => CostBand::new(3_000.0, 6_000.0),
            RepairItem::Foundation => CostBand::new(10_000.0, 25_000.0),
            RepairItem::Electrical => CostBand::new(3_000.0, 8_000.0),
            RepairItem::Plumbing => CostBand::new(2_000.0, 6_000.0),
            RepairItem::Clearing => CostBand::new(2_000.0, 8_000.0),
            RepairItem::Grading => CostBand::new(3_000.0, 10_000.0),
            RepairItem::Survey => CostBand::new(500.0, 2_000.0),
            RepairItem::Utilities => CostBand::new(5_000.0, 20_000.0),
            RepairItem::Access => CostBand::new(3_000.0, 15_000.0),
            RepairItem::Environmental => CostBand::new(2_000.0, 10_000.0),
            RepairItem::Permits => CostBand::new(500.0, 3_000.0),
            RepairItem::Holding => CostBand::new(1_000.0, 5_000.0),
        }
    }

    /// Word stems that select this item from free text. Each stem must start a
    /// word; multi-word stems must start consecutive words.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            RepairItem::Roof => &["roof"],
            RepairItem::Hvac => &["hvac", "heating", "cooling", "furnace", "air condition"],
            RepairItem::Kitchen => &["kitchen"],
            RepairItem::Bathrooms => &["bath"],
            RepairItem::Flooring => &["floor"],
            RepairItem::PaintInterior | RepairItem::PaintExterior => &["paint"],
            RepairItem::Foundation => &["foundation"],
            RepairItem::Electrical => &["electrical", "wiring"],
            RepairItem::Plumbing => &["plumb"],
            RepairItem::Clearing => &["clearing", "clear out", "debris", "brush", "tree", "stump"],
            RepairItem::Grading => &["grading", "level"],
            RepairItem::Survey => &["survey", "boundar"],
            RepairItem::Utilities => &[
                "utilit",
                "water line",
                "water hookup",
                "well water",
                "sewer",
                "septic",
                "power line",
                "electric service",
                "electric hookup",
            ],
            RepairItem::Access => &["road", "driveway", "access"],
            RepairItem::Environmental => &["environmental", "wetland", "soil", "perc test"],
            RepairItem::Permits => &["permit", "zoning"],
            RepairItem::Holding => &["holding", "property tax", "back tax", "taxes", "insurance"],
        }
    }

    /// True when `lowercase_text` asks for this item.
    ///
    /// Paint is one keyword group: exterior wording selects the exterior line,
    /// anything else the interior line, and both are charged only when the text
    /// names both sides.
    pub fn matches(self, lowercase_text: &str) -> bool {
        let words: Vec<&str> = lowercase_text
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        let has = |stems: &[&str]| stems.iter().any(|stem| starts_words(&words, stem));

        match self {
            RepairItem::PaintInterior => {
                has(self.keywords()) && (has(INTERIOR_HINTS) || !has(EXTERIOR_HINTS))
            }
            RepairItem::PaintExterior => has(self.keywords()) && has(EXTERIOR_HINTS),
            _ => has(self.keywords()),
        }
    }
}

const INTERIOR_HINTS: &[&str] = &["interior", "inside"];
const EXTERIOR_HINTS: &[&str] = &["exterior", "outside", "siding"];

fn starts_words(words: &[&str], stem: &str) -> bool {
    let parts: Vec<&str> = stem.split_whitespace().collect();
    if parts.is_empty() || parts.len() > words.len() {
        return false;
    }
    words.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .all(|(word, part)| word.starts_with(part))
    })
}

/// Line applied by the free-text strategy when nothing in the catalog matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub label: &'static str,
    pub band: CostBand,
    pub cost: f64,
}

pub fn baseline_for(property_type: PropertyType) -> Baseline {
    match property_type {
        PropertyType::Land => Baseline {
            label: "Basic Site Prep",
            band: CostBand::new(3_000.0, 8_000.0),
            cost: 5_500.0,
        },
        PropertyType::Residential | PropertyType::Commercial => Baseline {
            label: "Cosmetic Updates",
            band: CostBand::new(5_000.0, 10_000.0),
            cost: 8_000.0,
        },
    }
}
