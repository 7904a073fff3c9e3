//! Snapshot aggregator.
//!
//! Runs every extraction task in a fixed order, one at a time. Only the
//! task bodies themselves fan out (icon downloads, ban and member
//! listings). Each task belongs to one tolerance class:
//!
//! - required: any fault aborts the run
//! - plan-gated: an upgrade prompt substitutes the section's default
//! - presence-gated: a disabled feature drops the section

use std::future::Future;
use std::time::Instant;

use tracing::{info, warn};

use crate::gateway::{Availability, ModuleGateway};
use crate::progress::{ProgressEventKind, ProgressReporter, SnapshotTask};
use crate::snapshot::{SiteInfo, SiteSnapshot, SnapshotMeta};
use crate::tasks::{appearance, bans, categories, forum, icons, members, policy, site};
use crate::types::BackupResult;

pub struct SnapshotAggregator {
    gateway: ModuleGateway,
    progress: ProgressReporter,
    site: String,
}

impl SnapshotAggregator {
    pub fn new(
        gateway: ModuleGateway,
        progress: ProgressReporter,
        site: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            progress,
            site: site.into(),
        }
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Extract the whole snapshot.
    pub async fn run(&self) -> BackupResult<SiteSnapshot> {
        let gw = &self.gateway;
        let progress = &self.progress;
        info!(site = %self.site, "starting snapshot");

        let general = self.required(SnapshotTask::General, site::fetch_general(gw)).await?;
        let domains = self.required(SnapshotTask::Domains, site::fetch_domains(gw)).await?;
        let toolbar = self.required(SnapshotTask::Toolbar, site::fetch_toolbar(gw)).await?;
        let user_profile_pages = self
            .plan_gated(SnapshotTask::UserProfilePages, site::fetch_user_profile_pages(gw))
            .await?;
        let custom_footer = self
            .plan_gated(SnapshotTask::CustomFooter, site::fetch_custom_footer(gw))
            .await?;
        let access = self.required(SnapshotTask::AccessPolicy, policy::fetch_access(gw)).await?;
        let https = self.plan_gated(SnapshotTask::HttpsPolicy, policy::fetch_https(gw)).await?;
        let api_access = self
            .required(SnapshotTask::ApiAccess, policy::fetch_api_access(gw))
            .await?;
        let user_icons = self
            .plan_gated(SnapshotTask::UserIcons, policy::fetch_user_icons(gw))
            .await?;
        let link_blocking = self
            .required(SnapshotTask::LinkBlocking, policy::fetch_link_blocking(gw))
            .await?;
        let icons = self.required(SnapshotTask::Icons, icons::fetch_icons(gw)).await?;
        let categories = self
            .required(SnapshotTask::Categories, categories::fetch_categories(gw))
            .await?;
        let themes = self
            .required(SnapshotTask::Themes, appearance::fetch_themes(gw, progress))
            .await?;
        let layouts = self
            .required(SnapshotTask::Layouts, appearance::fetch_layouts(gw, progress))
            .await?;
        let bans = self.required(SnapshotTask::Bans, bans::fetch_bans(gw, progress)).await?;
        let members = self
            .required(SnapshotTask::Members, members::fetch_members(gw, progress))
            .await?;
        let forum = self.presence_gated(SnapshotTask::Forum, forum::fetch_forum(gw)).await?;

        Ok(SiteSnapshot {
            site: SiteInfo {
                meta: SnapshotMeta::new(self.site.clone()),
                general,
                domains,
                toolbar,
                user_profile_pages,
                custom_footer,
                access,
                https,
                api_access,
                user_icons,
                link_blocking,
            },
            categories,
            themes,
            layouts,
            bans,
            members,
            forum,
            icons,
        })
    }

    async fn required<T>(
        &self,
        task: SnapshotTask,
        work: impl Future<Output = BackupResult<T>>,
    ) -> BackupResult<T> {
        self.progress.emit(ProgressEventKind::TaskStarted { task });
        let started = Instant::now();
        let value = work.await.map_err(|e| e.in_task(task))?;
        self.completed(task, started);
        Ok(value)
    }

    async fn plan_gated<T: Default>(
        &self,
        task: SnapshotTask,
        work: impl Future<Output = BackupResult<Availability<T>>>,
    ) -> BackupResult<T> {
        match self.required(task, work).await? {
            Availability::Available(value) => Ok(value),
            Availability::Unavailable => {
                warn!("{task} not included in the site's plan, using defaults");
                self.progress.emit(ProgressEventKind::TaskDefaulted {
                    task,
                    reason: "upgrade required".to_string(),
                });
                Ok(T::default())
            }
        }
    }

    async fn presence_gated<T>(
        &self,
        task: SnapshotTask,
        work: impl Future<Output = BackupResult<Option<T>>>,
    ) -> BackupResult<Option<T>> {
        let value = self.required(task, work).await?;
        if value.is_none() {
            info!("{task} disabled, omitting section");
            self.progress.emit(ProgressEventKind::TaskSkipped {
                task,
                reason: "feature disabled".to_string(),
            });
        }
        Ok(value)
    }

    fn completed(&self, task: SnapshotTask, started: Instant) {
        let duration_ms = started.elapsed().as_millis() as u64;
        info!("{task} done in {duration_ms}ms");
        self.progress
            .emit(ProgressEventKind::TaskCompleted { task, duration_ms });
    }
}
