//! Page categories. The permissions screen ships every category as a
//! structured `categories` side channel; this task only decodes it.

use serde::{Deserialize, Serialize};

use crate::decode::{decode_page_permissions, decode_vote_spec, PagePermissions, VoteSpec};
use crate::gateway::{ModuleGateway, ModuleResponse};
use crate::types::{BackupResult, ModuleParams};

pub const CATEGORIES_MODULE: &str = "managesite/ManageSitePermissionsModule";

/// A category record as the panel sends it.
#[derive(Debug, Clone, Deserialize)]
struct RawCategory {
    category_id: u64,
    name: String,
    #[serde(default)]
    permissions_default: bool,
    #[serde(default)]
    permissions: Option<String>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    theme_default: bool,
    #[serde(default)]
    theme_id: Option<u64>,
    #[serde(default)]
    license_default: bool,
    #[serde(default)]
    license_id: Option<u64>,
    #[serde(default)]
    license_other: Option<String>,
    #[serde(default)]
    nav_default: bool,
    #[serde(default)]
    top_bar_page_name: Option<String>,
    #[serde(default)]
    side_bar_page_name: Option<String>,
    #[serde(default)]
    template_id: Option<u64>,
    #[serde(default)]
    per_page_discussion: Option<bool>,
    #[serde(default)]
    autonumerate: bool,
    #[serde(default)]
    page_title_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    pub id: Option<u64>,
    pub other: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub top_bar: Option<String>,
    pub side_bar: Option<String>,
}

/// A decoded category. Settings that inherit the site default are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub permissions: Option<PagePermissions>,
    pub rating: VoteSpec,
    pub theme_id: Option<u64>,
    pub license: Option<License>,
    pub navigation: Option<Navigation>,
    pub template_id: Option<u64>,
    pub per_page_discussion: Option<bool>,
    pub autonumerate: bool,
    pub page_title_template: Option<String>,
}

impl RawCategory {
    fn decode(self) -> BackupResult<Category> {
        Ok(Category {
            id: self.category_id,
            permissions: decode_page_permissions(
                !self.permissions_default,
                self.permissions.as_deref(),
            )?,
            rating: decode_vote_spec(self.rating.as_deref())?,
            theme_id: if self.theme_default { None } else { self.theme_id },
            license: (!self.license_default).then(|| License {
                id: self.license_id,
                other: self.license_other,
            }),
            navigation: (!self.nav_default).then(|| Navigation {
                top_bar: self.top_bar_page_name,
                side_bar: self.side_bar_page_name,
            }),
            template_id: self.template_id,
            per_page_discussion: self.per_page_discussion,
            autonumerate: self.autonumerate,
            page_title_template: self.page_title_template,
            name: self.name,
        })
    }
}

pub fn parse_categories(response: &ModuleResponse) -> BackupResult<Vec<Category>> {
    let raw: Vec<RawCategory> = response.aux("categories")?;
    raw.into_iter().map(RawCategory::decode).collect()
}

pub async fn fetch_categories(gw: &ModuleGateway) -> BackupResult<Vec<Category>> {
    parse_categories(&gw.call(CATEGORIES_MODULE, &ModuleParams::new()).await?)
}
