//! Paginated listing walker.
//!
//! Listings never state how many pages they have. The count is read off the
//! pager widget on page 1: the widget always ends with a "next" control, so
//! the button just before it carries the last page number.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::gateway::ModuleGateway;
use crate::markup::{element_text, selector};
use crate::progress::{ProgressEventKind, ProgressReporter};
use crate::types::{BackupError, BackupResult, ModuleParams};

/// Marker the panel renders instead of a table when a listing is empty.
pub const NO_ENTRIES_SELECTOR: &str = ".no-entries";
/// Data rows; the first one is the header.
pub const ROW_SELECTOR: &str = "table tr";
/// Clickable page buttons inside the pager widget.
pub const PAGE_BUTTON_SELECTOR: &str = "div.pager span.target";
/// Request parameter selecting the page.
pub const PAGE_PARAM: &str = "page";

struct ListingPage<T> {
    rows: Vec<T>,
    /// Last page number, when a pager widget is present.
    last_page: Option<u32>,
}

/// Fetch every page of `module` and extract each data row with `extract`.
///
/// Pages are requested one after another starting at 1, and rows come back
/// in page-then-row order.
pub async fn walk<T, F>(
    gateway: &ModuleGateway,
    progress: &ProgressReporter,
    module: &str,
    params: &ModuleParams,
    extract: F,
) -> BackupResult<Vec<T>>
where
    F: Fn(&ElementRef<'_>) -> BackupResult<T>,
{
    let first = read_page(
        gateway.call_markup(module, &page_params(params, 1)).await?,
        true,
        &extract,
    )?;
    let Some(first) = first else {
        debug!("{module}: no entries");
        return Ok(Vec::new());
    };

    let last_page = first.last_page.unwrap_or(1);
    progress.emit(ProgressEventKind::PageFetched {
        module: module.to_string(),
        page: 1,
        last_page,
    });

    let mut rows = first.rows;
    for page in 2..=last_page {
        let next = read_page(
            gateway.call_markup(module, &page_params(params, page)).await?,
            false,
            &extract,
        )?;
        if let Some(next) = next {
            rows.extend(next.rows);
        }
        debug!("{module}: page {page}/{last_page}");
        progress.emit(ProgressEventKind::PageFetched {
            module: module.to_string(),
            page,
            last_page,
        });
    }

    Ok(rows)
}

fn page_params(base: &ModuleParams, page: u32) -> ModuleParams {
    base.clone().with(PAGE_PARAM, page.to_string())
}

/// Extract one page. Returns `None` for an empty listing. The pager is only
/// inspected on the first page.
fn read_page<T, F>(listing: Html, first: bool, extract: &F) -> BackupResult<Option<ListingPage<T>>>
where
    F: Fn(&ElementRef<'_>) -> BackupResult<T>,
{
    if listing.select(&selector(NO_ENTRIES_SELECTOR)).next().is_some() {
        return Ok(None);
    }

    let rows = listing
        .select(&selector(ROW_SELECTOR))
        .skip(1)
        .map(|row| extract(&row))
        .collect::<BackupResult<Vec<T>>>()?;

    let last_page = if first { last_page(&listing)? } else { None };
    Ok(Some(ListingPage { rows, last_page }))
}

/// Read the last page number off the pager widget, if there is one.
fn last_page(listing: &Html) -> BackupResult<Option<u32>> {
    let buttons: Vec<ElementRef<'_>> = listing.select(&selector(PAGE_BUTTON_SELECTOR)).collect();
    if buttons.is_empty() {
        return Ok(None);
    }

    let label = match buttons.len().checked_sub(2).map(|i| &buttons[i]) {
        Some(button) => element_text(button),
        None => return Err(BackupError::InvalidPageIndex(element_text(&buttons[0]))),
    };
    label
        .parse()
        .map(Some)
        .map_err(|_| BackupError::InvalidPageIndex(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    const MODULE: &str = "managesite/members/ManageSiteMembersListModule";

    fn listing(rows: &[&str], pager: Option<&str>) -> String {
        let mut html = String::from("<table><tr><th>Name</th></tr>");
        for row in rows {
            html.push_str(&format!("<tr><td>{row}</td></tr>"));
        }
        html.push_str("</table>");
        if let Some(pager) = pager {
            html.push_str(pager);
        }
        html
    }

    fn pager(current: u32, last: u32) -> String {
        let mut html = format!(r#"<div class="pager"><span class="pager-no">page {current} of {last}</span>"#);
        for page in 1..=last {
            if page == current {
                html.push_str(&format!(r#"<span class="current">{page}</span>"#));
            } else {
                html.push_str(&format!(r#"<span class="target"><a href="javascript:;">{page}</a></span>"#));
            }
        }
        html.push_str(r#"<span class="target"><a href="javascript:;">next »</a></span></div>"#);
        html
    }

    fn text(row: &ElementRef<'_>) -> BackupResult<String> {
        Ok(element_text(row))
    }

    fn page(n: u32) -> ModuleParams {
        ModuleParams::new().with(PAGE_PARAM, n.to_string())
    }

    #[tokio::test]
    async fn test_three_pages_in_order() {
        let mut transport = ScriptedTransport::new();
        for (n, rows) in [(1, ["a", "b"]), (2, ["c", "d"]), (3, ["e", "f"])] {
            transport = transport.respond_with(
                MODULE,
                &page(n),
                json!({"status": "ok", "body": listing(&rows, Some(&pager(n, 3)))}),
            );
        }

        let rows = walk(
            &transport.gateway(),
            &ProgressReporter::silent(),
            MODULE,
            &ModuleParams::new(),
            text,
        )
        .await
        .unwrap();

        assert_eq!(rows, vec!["a", "b", "c", "d", "e", "f"]);
        let pages: Vec<_> = transport
            .calls()
            .iter()
            .map(|(_, p)| p.get(PAGE_PARAM).unwrap().to_string())
            .collect();
        assert_eq!(pages, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_single_page_without_pager() {
        let transport = ScriptedTransport::new().respond_body(MODULE, &listing(&["only"], None));
        let rows = walk(
            &transport.gateway(),
            &ProgressReporter::silent(),
            MODULE,
            &ModuleParams::new(),
            text,
        )
        .await
        .unwrap();
        assert_eq!(rows, vec!["only"]);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let transport = ScriptedTransport::new()
            .respond_body(MODULE, r#"<div class="no-entries">No members found.</div>"#);
        let rows = walk(
            &transport.gateway(),
            &ProgressReporter::silent(),
            MODULE,
            &ModuleParams::new(),
            text,
        )
        .await
        .unwrap();
        assert!(rows.is_empty());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_base_params_are_kept() {
        let transport = ScriptedTransport::new().respond_with(
            MODULE,
            &ModuleParams::new().with("group", "admins").with(PAGE_PARAM, "1"),
            json!({"status": "ok", "body": listing(&["x"], None)}),
        );
        walk(
            &transport.gateway(),
            &ProgressReporter::silent(),
            MODULE,
            &ModuleParams::new().with("group", "admins"),
            text,
        )
        .await
        .unwrap();
        assert_eq!(transport.calls()[0].1.get("group"), Some("admins"));
    }

    #[test]
    fn test_unparseable_last_page() {
        let html = Html::parse_fragment(
            r#"<div class="pager"><span class="target"><a>first</a></span><span class="target"><a>next »</a></span></div>"#,
        );
        assert!(matches!(last_page(&html), Err(BackupError::InvalidPageIndex(l)) if l == "first"));
    }

    #[test]
    fn test_pager_with_single_button() {
        let html = Html::parse_fragment(r#"<div class="pager"><span class="target"><a>next »</a></span></div>"#);
        assert!(matches!(last_page(&html), Err(BackupError::InvalidPageIndex(_))));
    }

    #[test]
    fn test_two_page_pager() {
        let html = Html::parse_fragment(&pager(1, 2));
        assert_eq!(last_page(&html).unwrap(), Some(2));
    }
}
