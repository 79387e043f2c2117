use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::domain::CompRecord;
use super::normalizer::{clean_text, coerce_str, UNKNOWN_ADDRESS};

/// Reads comps from a CSV export; header names are matched loosely.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<CompRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<CompRow>() {
        let row = record?;
        records.push(row.into_record());
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CompRow {
    #[serde(
        alias = "Address",
        alias = "formattedAddress",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    address: Option<String>,
    #[serde(
        alias = "Price",
        alias = "sale_price",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    price: Option<String>,
    #[serde(
        alias = "Beds",
        alias = "bedrooms",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    beds: Option<String>,
    #[serde(
        alias = "Baths",
        alias = "bathrooms",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    baths: Option<String>,
    #[serde(
        alias = "Sqft",
        alias = "area",
        alias = "square_footage",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    sqft: Option<String>,
    #[serde(
        alias = "Distance",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    distance: Option<String>,
    #[serde(
        alias = "Days Ago",
        alias = "days_since_sale",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    days_ago: Option<String>,
}

impl CompRow {
    fn into_record(self) -> CompRecord {
        let number = |value: Option<String>| value.as_deref().map(coerce_str).unwrap_or(0.0);

        CompRecord {
            address: self
                .address
                .as_deref()
                .map(clean_text)
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            price: number(self.price),
            beds: number(self.beds),
            baths: number(self.baths),
            area: number(self.sqft),
            distance: number(self.distance),
            days_since_sale: number(self.days_ago),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
