//! User references rendered by the panel's `printuser` widget.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use crate::markup::{element_text, selector, USER_INFO};
use crate::types::{BackupError, BackupResult};

/// Identity of a user mentioned in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserRef {
    /// A live account with a profile link.
    Active { id: u64, name: String },
    /// A deleted account; only the numeric id survives.
    Deleted { id: u64 },
}

impl UserRef {
    pub fn id(&self) -> u64 {
        match self {
            UserRef::Active { id, .. } | UserRef::Deleted { id } => *id,
        }
    }
}

/// Decode a `span.printuser` element.
///
/// Deleted users are flagged with the `deleted` class and carry their id in
/// `data-id`. Everyone else has one or more profile links (avatar and name)
/// whose `onclick` matches [`USER_INFO`]; all of them must agree on the id.
/// The name comes from the last link with visible text.
pub fn decode_user_reference(el: &ElementRef<'_>) -> BackupResult<UserRef> {
    if el.value().classes().any(|c| c == "deleted") {
        return el
            .value()
            .attr("data-id")
            .and_then(|id| id.trim().parse().ok())
            .map(|id| UserRef::Deleted { id })
            .ok_or_else(|| BackupError::MalformedUserRef(el.html()));
    }

    let mut id = None;
    let mut name = None;
    for link in el.select(&selector("a")) {
        let Some(link_id) = link
            .value()
            .attr("onclick")
            .and_then(|handler| USER_INFO.capture_u64(handler))
        else {
            continue;
        };
        match id {
            Some(seen) if seen != link_id => return Err(BackupError::MalformedUserRef(el.html())),
            _ => id = Some(link_id),
        }
        let text = element_text(&link);
        if !text.is_empty() {
            name = Some(text);
        }
    }

    match (id, name) {
        (Some(id), Some(name)) => Ok(UserRef::Active { id, name }),
        _ => Err(BackupError::MalformedUserRef(el.html())),
    }
}
