//! Extraction tasks, one per admin panel screen.
//!
//! Each task pairs a synchronous `parse_*` function over a markup fragment
//! with an async `fetch_*` wrapper that issues the module call. Parsers are
//! what the unit tests exercise; the aggregator only sees the fetchers.

pub mod appearance;
pub mod bans;
pub mod categories;
pub mod forum;
pub mod icons;
pub mod members;
pub mod policy;
pub mod site;

use scraper::ElementRef;

use crate::decode::{decode_timestamp, decode_user_reference, UserRef};
use crate::markup::{element_text, selector};
use crate::types::{BackupError, BackupResult};

/// Cells of a listing row.
pub(crate) fn cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.select(&selector("td")).collect()
}

/// Text of cell `index`, `None` when the cell is missing or blank.
pub(crate) fn cell_text(row: &ElementRef<'_>, index: usize) -> Option<String> {
    cells(row)
        .get(index)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// The user a listing row is about.
pub(crate) fn row_user(row: &ElementRef<'_>) -> BackupResult<UserRef> {
    let el = row
        .select(&selector("span.printuser"))
        .next()
        .ok_or_else(|| BackupError::MalformedUserRef(row.html()))?;
    decode_user_reference(&el)
}

/// The date a listing row carries.
pub(crate) fn row_timestamp(row: &ElementRef<'_>) -> BackupResult<i64> {
    let el = row
        .select(&selector("span.odate"))
        .next()
        .ok_or_else(|| BackupError::MissingTimestamp(row.html()))?;
    decode_timestamp(&el)
}
