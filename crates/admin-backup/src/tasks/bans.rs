//! User and IP bans.

use scraper::ElementRef;
use serde::Serialize;

use crate::decode::UserRef;
use crate::gateway::ModuleGateway;
use crate::pager::walk;
use crate::progress::ProgressReporter;
use crate::tasks::{cell_text, row_timestamp, row_user};
use crate::types::{BackupError, BackupResult, ModuleParams};

pub const USER_BANS_MODULE: &str = "managesite/blocks/ManageSiteUserBlocksModule";
pub const IP_BANS_MODULE: &str = "managesite/blocks/ManageSiteIpBlocksModule";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserBan {
    pub user: UserRef,
    pub since: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpBan {
    pub address: String,
    pub since: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bans {
    pub users: Vec<UserBan>,
    pub ips: Vec<IpBan>,
}

/// `| user | banned since | reason |`
pub fn parse_user_ban(row: &ElementRef<'_>) -> BackupResult<UserBan> {
    Ok(UserBan {
        user: row_user(row)?,
        since: row_timestamp(row)?,
        reason: cell_text(row, 2),
    })
}

/// `| address | banned since | reason |`
pub fn parse_ip_ban(row: &ElementRef<'_>) -> BackupResult<IpBan> {
    let address = cell_text(row, 0).ok_or_else(|| BackupError::MissingElement {
        section: "ip bans",
        selector: "td".to_string(),
    })?;
    Ok(IpBan {
        address,
        since: row_timestamp(row)?,
        reason: cell_text(row, 2),
    })
}

/// Both listings are walked concurrently.
pub async fn fetch_bans(gw: &ModuleGateway, progress: &ProgressReporter) -> BackupResult<Bans> {
    let params = ModuleParams::new();
    let (users, ips) = futures::try_join!(
        walk(gw, progress, USER_BANS_MODULE, &params, parse_user_ban),
        walk(gw, progress, IP_BANS_MODULE, &params, parse_ip_ban),
    )?;
    Ok(Bans { users, ips })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    const USER_BANS: &str = r#"
        <table>
          <tr><th>User</th><th>Since</th><th>Reason</th></tr>
          <tr>
            <td><span class="printuser"><a href="http://www.wikidot.com/user:info/troll" onclick="WIKIDOT.page.listeners.userInfo(1234); return false;">troll</a></span></td>
            <td><span class="odate time_1577836800 format_%25e%20%25b%20%25Y">01 Jan 2020</span></td>
            <td>vandalism</td>
          </tr>
          <tr>
            <td><span class="printuser deleted" data-id="999">(account deleted)</span></td>
            <td><span class="odate time_1600000000">13 Sep 2020</span></td>
            <td></td>
          </tr>
        </table>"#;

    const IP_BANS: &str = r#"
        <table>
          <tr><th>IP</th><th>Since</th><th>Reason</th></tr>
          <tr><td>203.0.113.7</td><td><span class="odate time_1577836800">01 Jan 2020</span></td><td>ban evasion</td></tr>
        </table>"#;

    #[tokio::test]
    async fn test_fetch_bans() {
        let transport = ScriptedTransport::new()
            .respond_body(USER_BANS_MODULE, USER_BANS)
            .respond_body(IP_BANS_MODULE, IP_BANS);

        let bans = fetch_bans(&transport.gateway(), &ProgressReporter::silent())
            .await
            .unwrap();

        assert_eq!(bans.users.len(), 2);
        assert_eq!(
            bans.users[0].user,
            UserRef::Active {
                id: 1234,
                name: "troll".into()
            }
        );
        assert_eq!(bans.users[0].since, 1577836800);
        assert_eq!(bans.users[0].reason.as_deref(), Some("vandalism"));
        assert_eq!(bans.users[1].user, UserRef::Deleted { id: 999 });
        assert_eq!(bans.users[1].reason, None);

        assert_eq!(bans.ips[0].address, "203.0.113.7");
        assert_eq!(bans.ips[0].reason.as_deref(), Some("ban evasion"));
    }

    #[tokio::test]
    async fn test_row_without_date_faults() {
        let transport = ScriptedTransport::new()
            .respond_body(
                USER_BANS_MODULE,
                r#"<table><tr><th>x</th></tr><tr><td><span class="printuser deleted" data-id="1"></span></td><td>never</td></tr></table>"#,
            )
            .respond_body(IP_BANS_MODULE, r#"<div class="no-entries"></div>"#);

        let err = fetch_bans(&transport.gateway(), &ProgressReporter::silent())
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::MissingTimestamp(_)));
    }
}
