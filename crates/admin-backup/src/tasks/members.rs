//! Site members, moderators and admins.

use scraper::ElementRef;
use serde::Serialize;

use crate::decode::UserRef;
use crate::gateway::ModuleGateway;
use crate::pager::walk;
use crate::progress::ProgressReporter;
use crate::tasks::{row_timestamp, row_user};
use crate::types::{BackupResult, ModuleParams};

pub const MEMBERS_MODULE: &str = "managesite/members/ManageSiteMembersListModule";
pub const MODERATORS_MODULE: &str = "managesite/members/ManageSiteModeratorsModule";
pub const ADMINS_MODULE: &str = "managesite/members/ManageSiteAdminsModule";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub user: UserRef,
    /// When the user joined, or was promoted for staff listings.
    pub since: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Members {
    pub members: Vec<Member>,
    pub moderators: Vec<Member>,
    pub admins: Vec<Member>,
}

pub fn parse_member(row: &ElementRef<'_>) -> BackupResult<Member> {
    Ok(Member {
        user: row_user(row)?,
        since: row_timestamp(row)?,
    })
}

/// All three listings are walked concurrently.
pub async fn fetch_members(
    gw: &ModuleGateway,
    progress: &ProgressReporter,
) -> BackupResult<Members> {
    let params = ModuleParams::new();
    let (members, moderators, admins) = futures::try_join!(
        walk(gw, progress, MEMBERS_MODULE, &params, parse_member),
        walk(gw, progress, MODERATORS_MODULE, &params, parse_member),
        walk(gw, progress, ADMINS_MODULE, &params, parse_member),
    )?;
    Ok(Members {
        members,
        moderators,
        admins,
    })
}
