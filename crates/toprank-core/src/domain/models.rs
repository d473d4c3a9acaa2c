use serde::{Deserialize, Serialize};

use crate::{ListingDate, Ticker, ValidationError};

/// A listed security as published in the exchange's registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub ticker: Ticker,
    pub name: String,
    pub listed_at: ListingDate,
    /// Display name of the category, already carrying the domain suffix.
    #[serde(rename = "industry")]
    pub category: String,
}

impl Listing {
    pub fn new(
        ticker: &str,
        name: impl Into<String>,
        listed_at: &str,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            ticker: Ticker::parse(ticker)?,
            name: name.into(),
            listed_at: ListingDate::parse(listed_at)?,
            category: category.into(),
        })
    }
}

/// A category option offered by the report endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub name: String,
}

impl Category {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ValidationError::EmptyCategoryCode);
        }
        Ok(Self {
            code,
            name: name.into(),
        })
    }
}

/// One trading row from a daily category report.
///
/// Prices are kept as the upstream text (`1,050.00` style) and parsed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub ticker: Ticker,
    pub price: String,
    pub goes_up: bool,
    pub price_change: String,
}

impl ReportRow {
    pub fn new(
        ticker: &str,
        price: impl Into<String>,
        goes_up: bool,
        price_change: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            ticker: Ticker::parse(ticker)?,
            price: price.into(),
            goes_up,
            price_change: price_change.into(),
        })
    }

    pub fn last_price(&self) -> Result<f64, ValidationError> {
        parse_decimal("price", &self.price)
    }

    pub fn absolute_change(&self) -> Result<f64, ValidationError> {
        parse_decimal("price_change", &self.price_change)
    }
}

/// A category's report for one trading day. Empty when the upstream had no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub category: Category,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(category: Category, rows: Vec<ReportRow>) -> Self {
        Self { category, rows }
    }

    pub fn empty(category: Category) -> Self {
        Self::new(category, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A ticker with its formatted percentage gain, e.g. `1.78%`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub ticker: Ticker,
    #[serde(rename = "diff")]
    pub percentage: String,
}

/// Ranked entries for one category, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNResult {
    #[serde(rename = "industry")]
    pub category: String,
    #[serde(rename = "data")]
    pub entries: Vec<RankedEntry>,
}

/// Parses upstream decimal text, ignoring `,` thousands separators.
pub fn parse_decimal(field: &'static str, text: &str) -> Result<f64, ValidationError> {
    let cleaned: String = text.trim().chars().filter(|ch| *ch != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::InvalidDecimal {
            field,
            value: text.to_owned(),
        })
}
