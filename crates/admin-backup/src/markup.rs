//! Markup helpers shared by the decoders and extraction tasks.
//!
//! All functions here are synchronous: `scraper` trees are `!Send`, so tasks
//! parse a fragment, pull owned values out of it, and drop it before their
//! next module call.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{BackupError, BackupResult};

/// Parse a selector that is known at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Normalized visible text of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element matching `css`, if any.
pub fn find<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    doc.select(&selector(css)).next()
}

/// First element matching `css`, or a `MissingElement` fault.
pub fn require<'a>(
    doc: &'a Html,
    section: &'static str,
    css: &str,
) -> BackupResult<ElementRef<'a>> {
    find(doc, css).ok_or_else(|| BackupError::MissingElement {
        section,
        selector: css.to_string(),
    })
}

/// Whether a checkbox or radio element is checked.
pub fn is_checked(el: &ElementRef<'_>) -> bool {
    el.value().attr("checked").is_some()
}

/// Checked state of a checkbox or radio, `None` when the element is absent.
pub fn checked(doc: &Html, css: &str) -> Option<bool> {
    find(doc, css).map(|el| is_checked(&el))
}

/// `value` attribute of an input, `None` when absent.
pub fn input_value(doc: &Html, css: &str) -> Option<String> {
    find(doc, css).and_then(|el| el.value().attr("value").map(|v| v.to_string()))
}

/// Text content of a textarea, `None` when absent.
pub fn textarea(doc: &Html, css: &str) -> Option<String> {
    find(doc, css).map(|el| el.text().collect::<String>())
}

/// Value of the selected option of a `<select>`, `None` when nothing is selected.
pub fn selected_option(doc: &Html, select_css: &str) -> Option<String> {
    let select = find(doc, select_css)?;
    let option = select.select(&selector("option[selected]")).next()?;
    option
        .value()
        .attr("value")
        .map(|v| v.to_string())
        .or_else(|| Some(element_text(&option)))
}

/// Value of the checked radio button in a group.
pub fn checked_radio(doc: &Html, name: &str) -> Option<String> {
    let css = format!(r#"input[type="radio"][name="{name}"]"#);
    doc.select(&selector(&css))
        .find(|el| el.value().attr("checked").is_some())
        .and_then(|el| el.value().attr("value").map(|v| v.to_string()))
}

/// Treat an empty or whitespace-only string as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ── Extraction rules ────────────────────────────────────────────────────────

/// A named pattern that pulls a numeric argument out of inline event wiring.
///
/// The panel exposes identities only through `onclick` handlers, so every
/// such coupling is listed here instead of at its call site.
pub struct ExtractionRule {
    pub name: &'static str,
    pattern: &'static str,
    compiled: OnceLock<Regex>,
}

impl ExtractionRule {
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            compiled: OnceLock::new(),
        }
    }

    fn regex(&self) -> &Regex {
        self.compiled
            .get_or_init(|| Regex::new(self.pattern).expect("extraction rule pattern is valid"))
    }

    /// Capture group 1 parsed as an integer.
    pub fn capture_u64(&self, haystack: &str) -> Option<u64> {
        self.regex()
            .captures(haystack)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// `WIKIDOT.page.listeners.userInfo(123)` on profile links.
pub static USER_INFO: ExtractionRule = ExtractionRule::new("user_info", r"userInfo\((\d+)\)");

/// Edit links in the custom theme listing.
pub static EDIT_THEME: ExtractionRule =
    ExtractionRule::new("edit_theme", r"editTheme\(\s*event\s*,\s*(\d+)\s*\)");

/// Edit links in the layout listing.
pub static EDIT_LAYOUT: ExtractionRule =
    ExtractionRule::new("edit_layout", r"editLayout\(\s*event\s*,\s*(\d+)\s*\)");

// ── Schema shapes ───────────────────────────────────────────────────────────

/// One known layout of a form whose field count varies across panel versions.
#[derive(Debug, Clone, Copy)]
pub struct SchemaShape {
    pub fields: &'static [&'static str],
}

/// Match positional values against the first shape with the same arity.
///
/// Fields whose name starts with `_` are positional placeholders and are
/// dropped from the result.
pub fn match_shape(
    section: &'static str,
    shapes: &[SchemaShape],
    values: Vec<String>,
) -> BackupResult<BTreeMap<&'static str, String>> {
    let shape = shapes
        .iter()
        .find(|s| s.fields.len() == values.len())
        .ok_or_else(|| BackupError::UnexpectedFieldCount {
            section,
            found: values.len(),
            expected: shapes.iter().map(|s| s.fields.len()).collect(),
        })?;

    Ok(shape
        .fields
        .iter()
        .zip(values)
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, value)| (*name, value))
        .collect())
}
