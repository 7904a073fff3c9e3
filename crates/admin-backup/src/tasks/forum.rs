//! Forum settings and structure. Sites that never activated the forum get
//! no section at all.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decode::{decode_forum_permissions, ForumPermissions};
use crate::gateway::{ModuleGateway, ModuleResponse};
use crate::markup::{find, selected_option};
use crate::types::{BackupError, BackupResult, ModuleParams};

pub const FORUM_SETTINGS_MODULE: &str = "managesite/ManageSiteForumSettingsModule";
pub const FORUM_LAYOUT_MODULE: &str = "managesite/ManageSiteForumLayoutModule";

/// Rendered in place of the settings form when the forum is off.
pub const FORUM_DISABLED_SELECTOR: &str = "#forum-not-activated";

#[derive(Debug, Clone, Deserialize)]
struct RawForumCategory {
    category_id: u64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    max_nest_level: Option<u32>,
    #[serde(default)]
    permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawForumGroup {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "visible_by_default")]
    visible: bool,
    #[serde(default)]
    categories: Vec<RawForumCategory>,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumCategory {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// `None` inherits the forum-wide nesting level.
    pub max_nest_level: Option<u32>,
    /// `None` inherits the forum default permissions.
    pub permissions: Option<ForumPermissions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumGroup {
    pub name: String,
    pub description: Option<String>,
    pub visible: bool,
    pub categories: Vec<ForumCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumSettings {
    pub max_nest_level: Option<u32>,
    pub default_permissions: Option<ForumPermissions>,
    pub groups: Vec<ForumGroup>,
}

/// Forum-wide settings. `None` when the disabled marker is present.
pub fn parse_settings(
    response: &ModuleResponse,
) -> BackupResult<Option<(Option<u32>, Option<ForumPermissions>)>> {
    let doc = response.markup();
    if find(&doc, FORUM_DISABLED_SELECTOR).is_some() {
        return Ok(None);
    }

    let max_nest_level = selected_option(&doc, r#"select[name="max_nest_level"]"#)
        .map(|level| {
            level.trim().parse().map_err(|_| BackupError::UnexpectedValue {
                field: "max_nest_level",
                value: level,
            })
        })
        .transpose()?;
    let raw: Option<String> = response.aux_opt("default_permissions")?;
    let default_permissions = decode_forum_permissions(raw.as_deref())?;

    Ok(Some((max_nest_level, default_permissions)))
}

pub fn parse_layout(response: &ModuleResponse) -> BackupResult<Vec<ForumGroup>> {
    let raw: Vec<RawForumGroup> = response.aux("groups")?;
    raw.into_iter()
        .map(|group| {
            let categories = group
                .categories
                .into_iter()
                .map(|cat| {
                    Ok(ForumCategory {
                        id: cat.category_id,
                        permissions: decode_forum_permissions(cat.permissions.as_deref())?,
                        name: cat.name,
                        description: cat.description,
                        max_nest_level: cat.max_nest_level,
                    })
                })
                .collect::<BackupResult<Vec<_>>>()?;
            Ok(ForumGroup {
                name: group.name,
                description: group.description,
                visible: group.visible,
                categories,
            })
        })
        .collect()
}

pub async fn fetch_forum(gw: &ModuleGateway) -> BackupResult<Option<ForumSettings>> {
    let settings = gw.call(FORUM_SETTINGS_MODULE, &ModuleParams::new()).await?;
    let Some((max_nest_level, default_permissions)) = parse_settings(&settings)? else {
        debug!("forum not activated");
        return Ok(None);
    };

    let groups = parse_layout(&gw.call(FORUM_LAYOUT_MODULE, &ModuleParams::new()).await?)?;
    Ok(Some(ForumSettings {
        max_nest_level,
        default_permissions,
        groups,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    const SETTINGS: &str = r#"<form><select name="max_nest_level"><option value="0">0</option><option value="2" selected>2</option></select></form>"#;

    #[tokio::test]
    async fn test_disabled_forum_is_absent() {
        let transport = ScriptedTransport::new().respond_body(
            FORUM_SETTINGS_MODULE,
            r#"<div id="forum-not-activated">The forum is not activated.</div>"#,
        );
        assert_eq!(fetch_forum(&transport.gateway()).await.unwrap(), None);
        // The layout is never requested.
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_enabled_forum() {
        let transport = ScriptedTransport::new()
            .respond(
                FORUM_SETTINGS_MODULE,
                json!({"status": "ok", "body": SETTINGS, "default_permissions": "t:rm;p:rm;e:o;s:"}),
            )
            .respond(
                FORUM_LAYOUT_MODULE,
                json!({"status": "ok", "body": "", "groups": [
                    {"name": "Site", "description": "Site discussion", "visible": true, "categories": [
                        {"category_id": 10, "name": "Announcements", "permissions": "t:o;p:m;e:o;s:"},
                        {"category_id": 11, "name": "Feedback", "max_nest_level": 5, "permissions": null}
                    ]},
                    {"name": "Hidden", "visible": false, "categories": []}
                ]}),
            );

        let forum = fetch_forum(&transport.gateway()).await.unwrap().unwrap();
        assert_eq!(forum.max_nest_level, Some(2));
        let defaults = forum.default_permissions.unwrap();
        assert!(defaults.create_threads.registered);
        assert!(defaults.edit_posts.creator);

        assert_eq!(forum.groups.len(), 2);
        let site = &forum.groups[0];
        assert_eq!(site.categories[0].id, 10);
        assert!(site.categories[0].permissions.as_ref().unwrap().create_threads.creator);
        assert_eq!(site.categories[1].permissions, None);
        assert_eq!(site.categories[1].max_nest_level, Some(5));
        assert!(!forum.groups[1].visible);
    }

    #[tokio::test]
    async fn test_layout_needs_groups() {
        let transport = ScriptedTransport::new()
            .respond_body(FORUM_SETTINGS_MODULE, SETTINGS)
            .respond_body(FORUM_LAYOUT_MODULE, "");
        assert!(matches!(
            fetch_forum(&transport.gateway()).await,
            Err(BackupError::MissingAuxiliary { .. })
        ));
    }
}
