use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::quality::QualityVerdict;

/// Broad property class; drives catalogs, multipliers, and the land carve-outs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    #[serde(alias = "Residential")]
    Residential,
    #[serde(alias = "Land")]
    Land,
    #[serde(alias = "Commercial")]
    Commercial,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "residential" | "house" | "single_family" => Some(Self::Residential),
            "land" | "lot" | "vacant_land" => Some(Self::Land),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }
}

/// How the buyer intends to pay; the MAO rule only models cash offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    #[default]
    Cash,
    Creative,
}

/// Subject property snapshot supplied by the caller for a single analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDescriptor {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Living area (or lot area for land) in square feet.
    pub area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub year_built: Option<i32>,
    pub property_type: PropertyType,
    pub listing_price: Option<f64>,
}

impl PropertyDescriptor {
    /// Two-letter region code used against the regional multiplier table.
    pub fn region_code(&self) -> String {
        self.state.trim().to_ascii_uppercase()
    }

    /// Subject area when it is usable as a divisor.
    pub fn usable_area(&self) -> Option<f64> {
        Some(self.area).filter(|area| area.is_finite() && *area > 0.0)
    }

    /// Listing price when present and positive; zero listings carry no ratio context.
    pub fn usable_listing_price(&self) -> Option<f64> {
        self.listing_price
            .filter(|price| price.is_finite() && *price > 0.0)
    }

    pub fn display_address(&self) -> String {
        let parts: Vec<&str> = [
            self.address.trim(),
            self.city.trim(),
            self.state.trim(),
            self.zip.trim(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
        parts.join(", ")
    }
}

/// Canonical comparable sale; every numeric field defaults to zero when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompRecord {
    pub address: String,
    pub price: f64,
    pub beds: f64,
    pub baths: f64,
    pub area: f64,
    /// Miles from the subject.
    pub distance: f64,
    pub days_since_sale: f64,
}

impl CompRecord {
    /// Raw search-entry form, accepted back by comp normalization.
    pub fn to_json(&self) -> Value {
        json!({
            "address": self.address,
            "price": self.price,
            "beds": self.beds,
            "baths": self.baths,
            "area": self.area,
            "distance": self.distance,
            "daysSinceSale": self.days_since_sale,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationSource {
    LiveComps,
    ManualComps,
    RegionalFallback,
    ManualRequired,
}

impl ValuationSource {
    pub const fn label(self) -> &'static str {
        match self {
            ValuationSource::LiveComps => "live comps",
            ValuationSource::ManualComps => "manual comps",
            ValuationSource::RegionalFallback => "regional fallback",
            ValuationSource::ManualRequired => "manual entry required",
        }
    }
}

/// How much an operator should trust the valuation before making an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Unverified,
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceTier::Unverified => "unverified",
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

/// Named decision-tree branch that produced a valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionBranch {
    LandWithoutComps,
    AcceptedComps,
    DistressedComps,
    InflatedComps,
    PerAreaOutlier,
    LandCompsRejected,
    NoComps,
    ManualComps,
    ManualCompsEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub value: f64,
    pub source: ValuationSource,
    pub branch: ResolutionBranch,
    pub confidence: ConfidenceTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_high: Option<f64>,
    pub warnings: Vec<String>,
    pub comps_used: Vec<CompRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<QualityVerdict>,
}

impl ValuationResult {
    /// True when the value is a placeholder and the operator must supply one.
    pub fn requires_manual_value(&self) -> bool {
        self.source == ValuationSource::ManualRequired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairMethod {
    Checklist,
    Heuristic,
    Manual,
    NoneConfirmed,
    RehabLevel,
    AgeBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairEstimate {
    pub total_cost: f64,
    pub method: RepairMethod,
    /// Catalog label to the cost chosen for it.
    pub line_items: BTreeMap<String, f64>,
    /// Distinguishes a deliberate zero from a zero nobody signed off on.
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<CostRange>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub breakdown: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

impl RepairEstimate {
    pub(crate) fn unconfirmed(method: RepairMethod, note: impl Into<String>) -> Self {
        Self {
            total_cost: 0.0,
            method,
            line_items: BTreeMap::new(),
            confirmed: false,
            range: None,
            breakdown: Vec::new(),
            notes: vec![note.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealGrade {
    Risky,
    Thin,
    Solid,
}

impl DealGrade {
    pub const fn label(self) -> &'static str {
        match self {
            DealGrade::Risky => "RISKY",
            DealGrade::Thin => "THIN",
            DealGrade::Solid => "SOLID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealResult {
    pub mao: f64,
    /// Formula value before the zero clamp, kept so a clamp is never hidden.
    pub raw_mao: f64,
    pub spread_at_asking: f64,
    pub spread_at_mao: f64,
    pub negotiation_room: f64,
    pub grade_at_asking: DealGrade,
    pub grade_at_mao: DealGrade,
    pub suspiciously_good: bool,
    #[serde(rename = "unrealisticMAO")]
    pub unrealistic_mao: bool,
    /// Set when the valuation was a manual-entry placeholder with no override.
    pub valuation_unset: bool,
    pub warnings: Vec<String>,
}
