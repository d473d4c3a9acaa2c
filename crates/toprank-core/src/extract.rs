//! Turning fetched payloads into domain records.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CategoryRules;
use crate::{Category, ExtractError, Listing, ReportRow};

/// Capability that converts raw payloads into typed records.
pub trait Extractor: Send + Sync {
    fn extract_listings(&self, payload: &str) -> Result<Vec<Listing>, ExtractError>;

    fn extract_categories(&self, payload: &str) -> Result<Vec<Category>, ExtractError>;

    /// `None` means the payload could not be decoded; that is "no data", not an error.
    fn extract_report_rows(&self, payload: Option<&Value>) -> Vec<ReportRow>;
}

/// Registry rows for common stock carry this CFI code.
const COMMON_STOCK_CFI: &str = "ESVUFR";
const TICKER_NAME_SEPARATOR: char = '\u{3000}';

mod listing_column {
    pub const TICKER_NAME: usize = 0;
    pub const LISTED_AT: usize = 2;
    pub const CATEGORY: usize = 4;
}

mod report_column {
    pub const TICKER: usize = 0;
    pub const PRICE: usize = 8;
    pub const DIRECTION: usize = 9;
    pub const PRICE_CHANGE: usize = 10;
}

/// The direction cell renders an up move as `<p style=...>+</p>`.
const UP_MARKER: &str = ">+<";

/// Extractor for the Taiwan Stock Exchange registry and daily report pages.
#[derive(Debug, Clone, Default)]
pub struct TwseExtractor {
    rules: CategoryRules,
}

impl TwseExtractor {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }

    fn listing_from_cells(&self, cells: &[String]) -> Option<Listing> {
        let ticker_name = cells.get(listing_column::TICKER_NAME)?;
        let listed_at = cells.get(listing_column::LISTED_AT)?;
        let category = cells.get(listing_column::CATEGORY)?;

        let Some((ticker, name)) = ticker_name.trim().split_once(TICKER_NAME_SEPARATOR) else {
            warn!(cell = %ticker_name, "listing row has no ticker/name separator, skipping");
            return None;
        };

        match Listing::new(
            ticker,
            name.trim(),
            listed_at,
            self.rules.normalize_name(category),
        ) {
            Ok(listing) => Some(listing),
            Err(error) => {
                warn!(%ticker, %error, "invalid listing row, skipping");
                None
            }
        }
    }
}

impl Extractor for TwseExtractor {
    fn extract_listings(&self, payload: &str) -> Result<Vec<Listing>, ExtractError> {
        let document = Html::parse_document(payload);
        let row_selector = selector("tr")?;
        let cell_selector = selector("td")?;

        let listings = document
            .select(&row_selector)
            .filter_map(|row| {
                let cells: Vec<String> = row.select(&cell_selector).map(element_text).collect();
                if !cells.iter().any(|cell| cell.trim() == COMMON_STOCK_CFI) {
                    return None;
                }
                self.listing_from_cells(&cells)
            })
            .collect::<Vec<_>>();

        debug!(count = listings.len(), "extracted listings");
        Ok(listings)
    }

    fn extract_categories(&self, payload: &str) -> Result<Vec<Category>, ExtractError> {
        let document = Html::parse_document(payload);
        let option_selector = selector("option")?;

        let categories = document
            .select(&option_selector)
            .filter_map(|option| {
                let code = option.value().attr("value")?.trim();
                if !self.rules.accepts_code(code) {
                    return None;
                }
                let name = self.rules.normalize_name(&element_text(option));
                Category::new(code, name).ok()
            })
            .collect::<Vec<_>>();

        debug!(count = categories.len(), "extracted categories");
        Ok(categories)
    }

    fn extract_report_rows(&self, payload: Option<&Value>) -> Vec<ReportRow> {
        let Some(rows) = payload
            .and_then(|value| value.get("data1"))
            .and_then(Value::as_array)
        else {
            debug!("report payload carries no data table");
            return Vec::new();
        };

        rows.iter().filter_map(report_row_from_value).collect()
    }
}

fn report_row_from_value(value: &Value) -> Option<ReportRow> {
    let cell = |index: usize| value.get(index).and_then(Value::as_str);

    let (Some(ticker), Some(price), Some(direction), Some(price_change)) = (
        cell(report_column::TICKER),
        cell(report_column::PRICE),
        cell(report_column::DIRECTION),
        cell(report_column::PRICE_CHANGE),
    ) else {
        warn!(row = %value, "report row is missing columns, skipping");
        return None;
    };

    match ReportRow::new(ticker, price, direction.contains(UP_MARKER), price_change) {
        Ok(row) => Some(row),
        Err(error) => {
            warn!(%ticker, %error, "invalid report row, skipping");
            None
        }
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector {
        selector: css.to_owned(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
