//! # Domain Models
//!
//! Typed records produced by extraction and consumed by ranking.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Listing`] | Registered security with its listing date and category |
//! | [`Category`] | Report category option (code + display name) |
//! | [`Report`] / [`ReportRow`] | One category's trading rows for a day |
//! | [`RankedEntry`] / [`TopNResult`] | Ranking output |
//! | [`Ticker`] | Validated exchange ticker |
//! | [`ListingDate`] | Validated `YYYY/MM/DD` listing date |
//!
//! Validating types reject bad input at construction time and through serde.

mod listing_date;
mod models;
mod ticker;

pub use listing_date::ListingDate;
pub use models::{
    parse_decimal, Category, Listing, RankedEntry, Report, ReportRow, TopNResult,
};
pub use ticker::Ticker;
