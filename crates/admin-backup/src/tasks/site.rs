//! General site settings: name and description, domains, toolbars, user
//! profile pages and the custom footer.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::gateway::{Availability, ModuleGateway};
use crate::markup::{
    checked, input_value, is_checked, match_shape, non_empty, require, selected_option, selector,
    textarea, SchemaShape,
};
use crate::types::{BackupResult, ModuleParams};

pub const GENERAL_MODULE: &str = "managesite/ManageSiteGeneralModule";
pub const DOMAIN_MODULE: &str = "managesite/ManageSiteDomainModule";
pub const TOOLBAR_MODULE: &str = "managesite/ManageSiteToolbarsModule";
pub const USER_PROFILE_PAGES_MODULE: &str = "managesite/ManageSiteUserProfilePagesModule";
pub const CUSTOM_FOOTER_MODULE: &str = "managesite/ManageSiteCustomFooterModule";

/// Known layouts of the general settings form. Some sites render the
/// site slug as an extra leading text input.
const GENERAL_SHAPES: &[SchemaShape] = &[
    SchemaShape {
        fields: &["name", "subtitle", "tags", "default_page"],
    },
    SchemaShape {
        fields: &["_slug", "name", "subtitle", "tags", "default_page"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    pub name: String,
    pub subtitle: String,
    pub tags: String,
    pub default_page: String,
    pub description: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domains {
    pub custom_domain: Option<String>,
    pub extra_domains: Vec<String>,
    pub redirect_to_custom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolbar {
    pub top: bool,
    pub bottom: bool,
}

/// Defaults to disabled when the plan lacks the feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfilePages {
    pub enabled: bool,
    pub category: Option<String>,
}

/// Defaults to no footer when the plan lacks the feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFooter {
    pub content: Option<String>,
    pub replace_default: bool,
}

pub fn parse_general(doc: &Html) -> BackupResult<GeneralInfo> {
    let values: Vec<String> = doc
        .select(&selector(r#"input[type="text"]"#))
        .map(|el| el.value().attr("value").unwrap_or_default().to_string())
        .collect();
    let mut fields = match_shape("general info", GENERAL_SHAPES, values)?;
    let mut take = |name: &str| fields.remove(name).unwrap_or_default();

    Ok(GeneralInfo {
        name: take("name"),
        subtitle: take("subtitle"),
        tags: take("tags"),
        default_page: take("default_page"),
        description: non_empty(textarea(doc, r#"textarea[name="description"]"#)),
        language: selected_option(doc, r#"select[name="language"]"#),
    })
}

pub fn parse_domains(doc: &Html) -> BackupResult<Domains> {
    let custom = require(doc, "domains", r#"input[name="custom_domain"]"#)?;
    let extra_domains = textarea(doc, r#"textarea[name="extra_domains"]"#)
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    Ok(Domains {
        custom_domain: non_empty(custom.value().attr("value").map(String::from)),
        extra_domains,
        redirect_to_custom: checked(doc, r#"input[name="redirect_to_custom"]"#).unwrap_or(false),
    })
}

pub fn parse_toolbar(doc: &Html) -> BackupResult<Toolbar> {
    Ok(Toolbar {
        top: is_checked(&require(doc, "toolbar", r#"input[name="top_bar"]"#)?),
        bottom: is_checked(&require(doc, "toolbar", r#"input[name="bottom_bar"]"#)?),
    })
}

pub fn parse_user_profile_pages(doc: &Html) -> BackupResult<UserProfilePages> {
    Ok(UserProfilePages {
        enabled: checked(doc, r#"input[name="profile_pages_enabled"]"#).unwrap_or(false),
        category: non_empty(input_value(doc, r#"input[name="profile_pages_category"]"#)),
    })
}

pub fn parse_custom_footer(doc: &Html) -> BackupResult<CustomFooter> {
    Ok(CustomFooter {
        content: non_empty(textarea(doc, r#"textarea[name="footer"]"#)),
        replace_default: checked(doc, r#"input[name="replace_default_footer"]"#).unwrap_or(false),
    })
}

pub async fn fetch_general(gw: &ModuleGateway) -> BackupResult<GeneralInfo> {
    parse_general(&gw.call_markup(GENERAL_MODULE, &ModuleParams::new()).await?)
}

pub async fn fetch_domains(gw: &ModuleGateway) -> BackupResult<Domains> {
    parse_domains(&gw.call_markup(DOMAIN_MODULE, &ModuleParams::new()).await?)
}

pub async fn fetch_toolbar(gw: &ModuleGateway) -> BackupResult<Toolbar> {
    parse_toolbar(&gw.call_markup(TOOLBAR_MODULE, &ModuleParams::new()).await?)
}

pub async fn fetch_user_profile_pages(
    gw: &ModuleGateway,
) -> BackupResult<Availability<UserProfilePages>> {
    gw.call_markup_optional(USER_PROFILE_PAGES_MODULE, &ModuleParams::new())
        .await?
        .try_map(|doc| parse_user_profile_pages(&doc))
}

pub async fn fetch_custom_footer(gw: &ModuleGateway) -> BackupResult<Availability<CustomFooter>> {
    gw.call_markup_optional(CUSTOM_FOOTER_MODULE, &ModuleParams::new())
        .await?
        .try_map(|doc| parse_custom_footer(&doc))
}
