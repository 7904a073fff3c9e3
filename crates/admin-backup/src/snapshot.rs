//! The assembled site snapshot and its archive layout.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::archive::ArchiveEntry;
use crate::tasks::appearance::{Layout, Theme};
use crate::tasks::bans::Bans;
use crate::tasks::categories::Category;
use crate::tasks::forum::ForumSettings;
use crate::tasks::icons::Icons;
use crate::tasks::members::Members;
use crate::tasks::policy::{
    AccessPolicy, ApiAccess, HttpsPolicy, LinkBlockPolicy, UserIconPolicy,
};
use crate::tasks::site::{CustomFooter, Domains, GeneralInfo, Toolbar, UserProfilePages};
use crate::types::BackupResult;

/// Identifies the run that produced a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotMeta {
    pub site: String,
    pub generated_at: DateTime<Utc>,
    pub generator: String,
}

impl SnapshotMeta {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            generated_at: Utc::now(),
            generator: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Everything that ends up in `site.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub meta: SnapshotMeta,
    pub general: GeneralInfo,
    pub domains: Domains,
    pub toolbar: Toolbar,
    pub user_profile_pages: UserProfilePages,
    pub custom_footer: CustomFooter,
    pub access: AccessPolicy,
    pub https: HttpsPolicy,
    pub api_access: ApiAccess,
    pub user_icons: UserIconPolicy,
    pub link_blocking: LinkBlockPolicy,
}

/// A complete snapshot. Built once by the aggregator and consumed by
/// [`SiteSnapshot::into_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSnapshot {
    pub site: SiteInfo,
    pub categories: Vec<Category>,
    pub themes: Vec<Theme>,
    pub layouts: Vec<Layout>,
    pub bans: Bans,
    pub members: Members,
    /// `None` when the site never activated its forum.
    pub forum: Option<ForumSettings>,
    pub icons: Icons,
}

impl SiteSnapshot {
    /// Archive entries in their fixed order: the JSON sections, then the icon
    /// binaries. Icon buffers move into the entries.
    pub fn into_entries(self) -> BackupResult<Vec<ArchiveEntry>> {
        let mut entries = vec![
            ArchiveEntry::structured("site.json", &self.site)?,
            ArchiveEntry::structured("categories.json", &self.categories)?,
            ArchiveEntry::structured("themes.json", &self.themes)?,
            ArchiveEntry::structured("layouts.json", &self.layouts)?,
            ArchiveEntry::structured("bans.json", &self.bans)?,
            ArchiveEntry::structured("members.json", &self.members)?,
        ];
        if let Some(forum) = &self.forum {
            entries.push(ArchiveEntry::structured("forum.json", forum)?);
        }

        let mut names: HashSet<String> = entries.iter().map(|e| e.name.clone()).collect();
        for icon in self.icons.into_vec() {
            // Two icons uploaded under one filename would collide.
            let mut name = icon.filename.clone();
            let mut attempt = 0;
            while names.contains(&name) {
                attempt += 1;
                name = match attempt {
                    1 => format!("{}-{}", icon.kind.as_str(), icon.filename),
                    n => format!("{}-{n}-{}", icon.kind.as_str(), icon.filename),
                };
            }
            names.insert(name.clone());
            entries.push(ArchiveEntry::binary(name, icon.content));
        }
        Ok(entries)
    }
}
