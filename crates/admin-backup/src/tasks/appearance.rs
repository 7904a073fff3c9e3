//! Custom themes and layouts. Listings only carry names and edit links; the
//! source of each entry comes from its editor, one call per entry.

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::debug;

use crate::gateway::ModuleGateway;
use crate::markup::{
    non_empty, require, selected_option, selector, ExtractionRule, EDIT_LAYOUT, EDIT_THEME,
};
use crate::pager::walk;
use crate::progress::ProgressReporter;
use crate::tasks::cell_text;
use crate::types::{BackupError, BackupResult, ModuleParams};

pub const THEMES_MODULE: &str = "managesite/themes/ManageSiteCustomThemesModule";
pub const THEME_EDITOR_MODULE: &str = "managesite/themes/ManageSiteEditCustomThemeModule";
pub const LAYOUTS_MODULE: &str = "managesite/layouts/ManageSiteLayoutsModule";
pub const LAYOUT_EDITOR_MODULE: &str = "managesite/layouts/ManageSiteEditLayoutModule";

const CODE_SELECTOR: &str = r#"textarea[name="code"]"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: u64,
    pub name: String,
    pub parent: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub id: u64,
    pub name: String,
    pub code: String,
}

/// A listing entry before its editor has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub id: u64,
    pub name: String,
}

/// Pull id and name out of a listing row. The id is only reachable through
/// the row's edit link.
fn listing_entry(
    row: &ElementRef<'_>,
    section: &'static str,
    rule: &ExtractionRule,
) -> BackupResult<ListingEntry> {
    let id = row
        .select(&selector("a[onclick]"))
        .filter_map(|a| a.value().attr("onclick"))
        .find_map(|handler| rule.capture_u64(handler))
        .ok_or_else(|| BackupError::MissingElement {
            section,
            selector: rule.name.to_string(),
        })?;
    let name = cell_text(row, 0).ok_or_else(|| BackupError::MissingElement {
        section,
        selector: "td".to_string(),
    })?;
    Ok(ListingEntry { id, name })
}

pub fn parse_theme_row(row: &ElementRef<'_>) -> BackupResult<ListingEntry> {
    listing_entry(row, "themes", &EDIT_THEME)
}

pub fn parse_layout_row(row: &ElementRef<'_>) -> BackupResult<ListingEntry> {
    listing_entry(row, "layouts", &EDIT_LAYOUT)
}

/// Source code and parent theme from a theme editor.
pub fn parse_theme_editor(entry: ListingEntry, doc: &Html) -> BackupResult<Theme> {
    let code = require(doc, "themes", CODE_SELECTOR)?.text().collect();
    Ok(Theme {
        id: entry.id,
        name: entry.name,
        parent: non_empty(selected_option(doc, r#"select[name="parentTheme"]"#)),
        code,
    })
}

pub fn parse_layout_editor(entry: ListingEntry, doc: &Html) -> BackupResult<Layout> {
    let code = require(doc, "layouts", CODE_SELECTOR)?.text().collect();
    Ok(Layout {
        id: entry.id,
        name: entry.name,
        code,
    })
}

pub async fn fetch_themes(
    gw: &ModuleGateway,
    progress: &ProgressReporter,
) -> BackupResult<Vec<Theme>> {
    let entries = walk(gw, progress, THEMES_MODULE, &ModuleParams::new(), parse_theme_row).await?;
    let mut themes = Vec::with_capacity(entries.len());
    for entry in entries {
        debug!(id = entry.id, name = %entry.name, "reading theme");
        let params = ModuleParams::new().with("themeId", entry.id.to_string());
        let editor = gw.call_markup(THEME_EDITOR_MODULE, &params).await?;
        themes.push(parse_theme_editor(entry, &editor)?);
    }
    Ok(themes)
}

pub async fn fetch_layouts(
    gw: &ModuleGateway,
    progress: &ProgressReporter,
) -> BackupResult<Vec<Layout>> {
    let entries = walk(gw, progress, LAYOUTS_MODULE, &ModuleParams::new(), parse_layout_row).await?;
    let mut layouts = Vec::with_capacity(entries.len());
    for entry in entries {
        debug!(id = entry.id, name = %entry.name, "reading layout");
        let params = ModuleParams::new().with("layoutId", entry.id.to_string());
        let editor = gw.call_markup(LAYOUT_EDITOR_MODULE, &params).await?;
        layouts.push(parse_layout_editor(entry, &editor)?);
    }
    Ok(layouts)
}
