use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use super::price::MarketComparable;

/// Parses a market-comparables CSV export (`price,source,quoted_on`).
///
/// Prices may carry currency symbols and thousands separators; sources default to
/// "unknown" when blank. Row numbers in errors are 1-based and count the header.
pub fn parse_comparables<R: Read>(
    reader: R,
) -> Result<Vec<MarketComparable>, ComparablesImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut comparables = Vec::new();

    for (index, record) in csv_reader.deserialize::<ComparableRow>().enumerate() {
        let row_number = index + 2;
        let row = record?;

        let price = parse_amount(&row.price).ok_or_else(|| ComparablesImportError::InvalidPrice {
            row: row_number,
            value: row.price.clone(),
        })?;

        let quoted_on = NaiveDate::parse_from_str(&row.quoted_on, "%Y-%m-%d").map_err(|_| {
            ComparablesImportError::InvalidDate {
                row: row_number,
                value: row.quoted_on.clone(),
            }
        })?;

        let source = if row.source.is_empty() {
            "unknown".to_string()
        } else {
            row.source
        };

        comparables.push(MarketComparable {
            price,
            source,
            quoted_on,
        });
    }

    Ok(comparables)
}

#[derive(Debug, Deserialize)]
struct ComparableRow {
    #[serde(rename = "price")]
    price: String,
    #[serde(rename = "source", default)]
    source: String,
    #[serde(rename = "quoted_on", default)]
    quoted_on: String,
}

fn parse_amount(value: &str) -> Option<i64> {
    let digits: String = value
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }

    let amount = digits.parse::<i64>().ok()?;
    if amount > 0 {
        Some(amount)
    } else {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComparablesImportError {
    #[error("csv parse failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: price '{value}' is not a positive amount")]
    InvalidPrice { row: usize, value: String },
    #[error("row {row}: quoted_on '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { row: usize, value: String },
}
