//! Site policies: membership access, HTTPS, API access, user icons and
//! link blocking.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::gateway::{Availability, ModuleGateway};
use crate::markup::{
    checked, checked_radio, input_value, is_checked, non_empty, require, selected_option,
};
use crate::types::{BackupError, BackupResult, ModuleParams};

pub const ACCESS_MODULE: &str = "managesite/ManageSiteAccessPolicyModule";
pub const HTTPS_MODULE: &str = "managesite/ManageSiteSecureAccessModule";
pub const API_MODULE: &str = "managesite/ManageSiteApiAccessModule";
pub const USER_ICONS_MODULE: &str = "managesite/ManageSiteUserIconsModule";
pub const LINK_BLOCK_MODULE: &str = "managesite/ManageSiteBlockLinksModule";

const BLOCK_CLONE: &str = r#"input[name="block_clone"]"#;
const BLOCK_INCLUDES: &str = r#"input[name="block_includes"]"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// `open`, `closed` or `private`.
    pub mode: String,
    pub by_application: bool,
    pub by_password: bool,
    pub password: Option<String>,
    pub block_clone: bool,
    pub block_includes: bool,
}

/// Which protocols the site is served over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpsPolicy {
    pub http: bool,
    pub https: bool,
}

impl Default for HttpsPolicy {
    /// Sites without the secure-access feature are HTTP-only.
    fn default() -> Self {
        Self {
            http: true,
            https: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAccess {
    pub enabled: bool,
    /// Lowest role allowed to use the API.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIconPolicy {
    pub show_karma: bool,
    pub show_badges: bool,
}

impl Default for UserIconPolicy {
    /// Without the feature the panel shows everything.
    fn default() -> Self {
        Self {
            show_karma: true,
            show_badges: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBlockPolicy {
    pub anonymous: bool,
    pub registered: bool,
}

/// Toggles introduced after a site was created are missing from its form
/// and read as `false`.
pub fn parse_access(doc: &Html) -> BackupResult<AccessPolicy> {
    let mode = checked_radio(doc, "access_mode").ok_or_else(|| BackupError::MissingElement {
        section: "access policy",
        selector: "access_mode".to_string(),
    })?;

    let block_clone = checked(doc, BLOCK_CLONE);
    // Older forms lack the includes toggle; the panel then reports the
    // clone toggle's state for it.
    // TODO: confirm with the site owners whether this should read `false`.
    let block_includes = checked(doc, BLOCK_INCLUDES).or(block_clone);

    Ok(AccessPolicy {
        mode,
        by_application: checked(doc, r#"input[name="by_application"]"#).unwrap_or(false),
        by_password: checked(doc, r#"input[name="by_password"]"#).unwrap_or(false),
        password: non_empty(input_value(doc, r#"input[name="membership_password"]"#)),
        block_clone: block_clone.unwrap_or(false),
        block_includes: block_includes.unwrap_or(false),
    })
}

pub fn parse_https(doc: &Html) -> BackupResult<HttpsPolicy> {
    let mode = checked_radio(doc, "secure_mode").ok_or_else(|| BackupError::MissingElement {
        section: "https policy",
        selector: "secure_mode".to_string(),
    })?;
    match mode.as_str() {
        "http" => Ok(HttpsPolicy {
            http: true,
            https: false,
        }),
        "https" => Ok(HttpsPolicy {
            http: false,
            https: true,
        }),
        "both" => Ok(HttpsPolicy {
            http: true,
            https: true,
        }),
        _ => Err(BackupError::UnexpectedValue {
            field: "secure_mode",
            value: mode,
        }),
    }
}

pub fn parse_api_access(doc: &Html) -> BackupResult<ApiAccess> {
    Ok(ApiAccess {
        enabled: is_checked(&require(doc, "api access", r#"input[name="api_enabled"]"#)?),
        role: selected_option(doc, r#"select[name="api_role"]"#),
    })
}

pub fn parse_user_icons(doc: &Html) -> BackupResult<UserIconPolicy> {
    Ok(UserIconPolicy {
        show_karma: is_checked(&require(doc, "user icons", r#"input[name="show_karma"]"#)?),
        show_badges: is_checked(&require(doc, "user icons", r#"input[name="show_badges"]"#)?),
    })
}

pub fn parse_link_blocking(doc: &Html) -> BackupResult<LinkBlockPolicy> {
    Ok(LinkBlockPolicy {
        anonymous: is_checked(&require(
            doc,
            "link blocking",
            r#"input[name="block_links_anonymous"]"#,
        )?),
        registered: is_checked(&require(
            doc,
            "link blocking",
            r#"input[name="block_links_registered"]"#,
        )?),
    })
}

pub async fn fetch_access(gw: &ModuleGateway) -> BackupResult<AccessPolicy> {
    parse_access(&gw.call_markup(ACCESS_MODULE, &ModuleParams::new()).await?)
}

pub async fn fetch_https(gw: &ModuleGateway) -> BackupResult<Availability<HttpsPolicy>> {
    gw.call_markup_optional(HTTPS_MODULE, &ModuleParams::new())
        .await?
        .try_map(|doc| parse_https(&doc))
}

pub async fn fetch_api_access(gw: &ModuleGateway) -> BackupResult<ApiAccess> {
    parse_api_access(&gw.call_markup(API_MODULE, &ModuleParams::new()).await?)
}

pub async fn fetch_user_icons(gw: &ModuleGateway) -> BackupResult<Availability<UserIconPolicy>> {
    gw.call_markup_optional(USER_ICONS_MODULE, &ModuleParams::new())
        .await?
        .try_map(|doc| parse_user_icons(&doc))
}

pub async fn fetch_link_blocking(gw: &ModuleGateway) -> BackupResult<LinkBlockPolicy> {
    parse_link_blocking(&gw.call_markup(LINK_BLOCK_MODULE, &ModuleParams::new()).await?)
}
