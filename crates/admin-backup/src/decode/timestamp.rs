//! Epoch timestamps encoded in an element's class list (`span.odate`).

use scraper::ElementRef;

use crate::types::{BackupError, BackupResult};

/// Class prefix carrying the epoch seconds, e.g. `time_1611337846`.
pub const TIMESTAMP_PREFIX: &str = "time_";

/// Recover the epoch time from the single `time_` class of `el`.
pub fn decode_timestamp(el: &ElementRef<'_>) -> BackupResult<i64> {
    let mut matches = el
        .value()
        .classes()
        .filter_map(|class| class.strip_prefix(TIMESTAMP_PREFIX));

    match (matches.next(), matches.next()) {
        (Some(raw), None) => raw
            .parse()
            .map_err(|_| BackupError::MissingTimestamp(el.html())),
        _ => Err(BackupError::MissingTimestamp(el.html())),
    }
}
