use serde_json::{Map, Value};

use super::super::domain::CompRecord;

const ADDRESS_KEYS: &[&str] = &["formattedAddress", "address", "addressLine1"];
const PRICE_KEYS: &[&str] = &["price", "salePrice", "lastSalePrice"];
const BEDS_KEYS: &[&str] = &["bedrooms", "beds"];
const BATHS_KEYS: &[&str] = &["bathrooms", "baths"];
const AREA_KEYS: &[&str] = &["squareFootage", "sqft", "area"];
const DISTANCE_KEYS: &[&str] = &["distance"];
const DAYS_KEYS: &[&str] = &["daysAgo", "daysSinceSale", "daysOld", "daysOnMarket"];

pub(crate) const UNKNOWN_ADDRESS: &str = "Address not available";

/// Coerces one heterogeneous search entry into the canonical record.
pub(crate) fn normalize_entry(entry: &Map<String, Value>) -> CompRecord {
    let address = first_present(entry, ADDRESS_KEYS)
        .and_then(Value::as_str)
        .map(clean_text)
        .filter(|address| !address.is_empty())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());

    CompRecord {
        address,
        price: number_at(entry, PRICE_KEYS),
        beds: number_at(entry, BEDS_KEYS),
        baths: number_at(entry, BATHS_KEYS),
        area: number_at(entry, AREA_KEYS),
        distance: number_at(entry, DISTANCE_KEYS),
        days_since_sale: number_at(entry, DAYS_KEYS),
    }
}

fn first_present<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| entry.get(*key))
        .find(|value| !value.is_null())
}

fn number_at(entry: &Map<String, Value>, keys: &[&str]) -> f64 {
    first_present(entry, keys).map(coerce_number).unwrap_or(0.0)
}

/// Numbers pass through, numeric strings parse, everything else is zero.
pub(crate) fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(raw) => coerce_str(raw),
        _ => 0.0,
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

pub(crate) fn coerce_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

pub(crate) fn clean_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn maps_search_provider_field_names() {
        let record = normalize_entry(&object(json!({
            "formattedAddress": "12  Oak Ave,\u{200b} Dayton, OH",
            "price": 185000,
            "bedrooms": 3,
            "bathrooms": 1.5,
            "squareFootage": 1400,
            "distance": 0.42,
            "daysAgo": 38
        })));

        assert_eq!(record.address, "12 Oak Ave, Dayton, OH");
        assert_eq!(record.price, 185_000.0);
        assert_eq!(record.baths, 1.5);
        assert_eq!(record.area, 1400.0);
        assert_eq!(record.days_since_sale, 38.0);
    }

    #[test]
    fn missing_and_garbage_fields_default_to_zero() {
        let record = normalize_entry(&object(json!({
            "price": null,
            "sqft": "n/a",
            "distance": true
        })));

        assert_eq!(record.address, UNKNOWN_ADDRESS);
        assert_eq!(record.price, 0.0);
        assert_eq!(record.area, 0.0);
        assert_eq!(record.distance, 0.0);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(coerce_str("$350,000"), 350_000.0);
        assert_eq!(coerce_str(" 0.6 "), 0.6);
        assert_eq!(coerce_str("NaN"), 0.0);
        assert_eq!(coerce_number(&json!("1,250")), 1250.0);
    }
}
