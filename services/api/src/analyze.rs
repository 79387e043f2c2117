use crate::infra::{parse_financing, parse_property_type, parse_rehab_level};
use chrono::Local;
use clap::Args;
use deal_engine::config::EngineThresholds;
use deal_engine::error::AppError;
use deal_engine::valuation::regional::{self, DEFAULT_REGIONAL_MULTIPLIER};
use deal_engine::valuation::{
    format_currency, AnalysisReport, AnalysisRequest, CompCsvImporter, CompRecord, DealAnalyzer,
    FinancingType, PropertyDescriptor, PropertyType, RehabLevel, RepairStrategy,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyzeArgs {
    /// Street address of the subject property
    #[arg(long)]
    pub(crate) address: String,
    #[arg(long, default_value = "")]
    pub(crate) city: String,
    /// Two-letter state code used for the regional fallback table
    #[arg(long)]
    pub(crate) state: String,
    #[arg(long, default_value = "")]
    pub(crate) zip: String,
    /// Living area (lot area for land) in square feet
    #[arg(long, default_value_t = 0.0)]
    pub(crate) area: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) beds: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) baths: f64,
    #[arg(long)]
    pub(crate) year_built: Option<i32>,
    /// residential, land, or commercial
    #[arg(long, value_parser = parse_property_type, default_value = "residential")]
    pub(crate) property_type: PropertyType,
    /// Current listing price, used to sanity-check comps
    #[arg(long)]
    pub(crate) listing_price: Option<f64>,
    /// Comparable sales export (address,price,beds,baths,sqft,distance,days_ago)
    #[arg(long)]
    pub(crate) comps_csv: Option<PathBuf>,
    /// Operator-entered comps in the same CSV layout; bypasses comp sanity checks
    #[arg(long)]
    pub(crate) manual_comps_csv: Option<PathBuf>,
    /// Manually entered after-repair value
    #[arg(long)]
    pub(crate) manual_value: Option<f64>,
    /// Seller asking price
    #[arg(long, default_value_t = 0.0)]
    pub(crate) asking: f64,
    /// Assignment fee (defaults to the configured fee)
    #[arg(long)]
    pub(crate) fee: Option<f64>,
    /// Checklist repair items, comma separated (e.g. roof,hvac,kitchen)
    #[arg(long, value_delimiter = ',')]
    pub(crate) repairs: Vec<String>,
    /// Confirm that the property needs no repairs
    #[arg(long)]
    pub(crate) no_repairs: bool,
    /// Free-text description of needed repairs
    #[arg(long)]
    pub(crate) repair_notes: Option<String>,
    /// Known repair amount
    #[arg(long)]
    pub(crate) repair_amount: Option<f64>,
    /// cosmetic, moderate, or heavy
    #[arg(long, value_parser = parse_rehab_level)]
    pub(crate) rehab_level: Option<RehabLevel>,
    /// Estimate repairs from the property's age
    #[arg(long)]
    pub(crate) age_band: bool,
    /// cash or creative
    #[arg(long, value_parser = parse_financing, default_value = "cash")]
    pub(crate) financing: FinancingType,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl AnalyzeArgs {
    fn repair_strategy(&self) -> RepairStrategy {
        if let Some(amount) = self.repair_amount {
            RepairStrategy::Manual { amount }
        } else if let Some(level) = self.rehab_level {
            RepairStrategy::RehabLevel { level }
        } else if self.age_band {
            RepairStrategy::AgeBand { as_of_year: None }
        } else if let Some(description) = &self.repair_notes {
            RepairStrategy::Heuristic {
                description: description.clone(),
            }
        } else {
            RepairStrategy::Checklist {
                items: self.repairs.clone(),
                confirmed: self.no_repairs,
            }
        }
    }

    fn property(&self) -> PropertyDescriptor {
        PropertyDescriptor {
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip.clone(),
            area: self.area,
            bedrooms: self.beds,
            bathrooms: self.baths,
            year_built: self.year_built,
            property_type: self.property_type,
            listing_price: self.listing_price,
        }
    }
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let thresholds = EngineThresholds::from_env()?;
    let analyzer = DealAnalyzer::new(thresholds);

    let comps = match &args.comps_csv {
        Some(path) => load_comps(path)?,
        None => Vec::new(),
    };
    let manual_comps = args
        .manual_comps_csv
        .as_deref()
        .map(load_comps)
        .transpose()?;

    let request = AnalysisRequest {
        property: args.property(),
        comps,
        manual_comps,
        manual_value: args.manual_value,
        repairs: args.repair_strategy(),
        assignment_fee: args.fee,
        asking_price: args.asking,
        financing: args.financing,
    };

    let report = analyzer.analyze(&request);
    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => eprintln!("failed to render report as JSON: {err}"),
        }
    } else {
        render_report(&report);
    }

    Ok(())
}

fn load_comps(path: &Path) -> Result<Vec<Value>, AppError> {
    let records = CompCsvImporter::from_path(path)?;
    Ok(records.iter().map(CompRecord::to_json).collect())
}

fn render_report(report: &AnalysisReport) {
    let valuation = &report.valuation;
    let deal = &report.deal;

    println!("Deal analysis for {}", report.summary.address);
    println!("Report date: {}", Local::now().date_naive());

    println!("\nValuation ({})", valuation.source.label());
    println!(
        "- ARV {} | confidence {}",
        format_currency(report.effective_value),
        valuation.confidence.label()
    );
    if let (Some(low), Some(high)) = (valuation.range_low, valuation.range_high) {
        println!(
            "- Range {} - {}",
            format_currency(low),
            format_currency(high)
        );
    }
    if !valuation.comps_used.is_empty() {
        println!("- Comps used:");
        for comp in &valuation.comps_used {
            println!(
                "    - {} | {} | {:.0} sqft | {:.2} mi | {:.0} days",
                comp.address,
                format_currency(comp.price),
                comp.area,
                comp.distance,
                comp.days_since_sale
            );
        }
    }
    for warning in &valuation.warnings {
        println!("  ! {warning}");
    }

    let repairs = &report.repairs;
    println!(
        "\nRepairs ({:?}{})",
        repairs.method,
        if repairs.confirmed { "" } else { ", unconfirmed" }
    );
    println!("- Total {}", format_currency(repairs.total_cost));
    for line in &repairs.breakdown {
        println!("    - {line}");
    }
    for note in &repairs.notes {
        println!("  * {note}");
    }

    println!("\nOffer");
    println!(
        "- MAO {} | assignment fee {}",
        format_currency(deal.mao),
        format_currency(report.summary.assignment_fee)
    );
    println!(
        "- Spread at asking {} ({}) | spread at MAO {} ({})",
        format_currency(deal.spread_at_asking),
        deal.grade_at_asking.label(),
        format_currency(deal.spread_at_mao),
        deal.grade_at_mao.label()
    );
    println!(
        "- Negotiation room {}",
        format_currency(deal.negotiation_room)
    );
    for warning in &deal.warnings {
        println!("  ! {warning}");
    }
}

pub(crate) fn run_regions() {
    println!("Regional price-per-sqft multipliers");
    for (code, multiplier) in regional::regions() {
        println!("- {code}: ${multiplier:.0}/sqft");
    }
    println!("Unrecognized regions use ${DEFAULT_REGIONAL_MULTIPLIER:.0}/sqft");
}
