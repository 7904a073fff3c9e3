//! Configuration loading and resolution.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use url::Url;

/// Environment variable holding the admin's session cookie.
pub const SESSION_ENV: &str = "WIKIDOT_SESSION_ID";
/// Environment variable overriding where archives are written.
pub const OUTPUT_DIR_ENV: &str = "ADMIN_BACKUP_DIR";

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Everything one backup run needs.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub site: String,
    pub base_url: Url,
    pub session_id: String,
    pub output_dir: PathBuf,
    pub timeout_ms: u64,
}

impl BackupConfig {
    pub fn resolve(
        site: &str,
        session: Option<&str>,
        output: Option<&str>,
        base_url: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> Result<Self> {
        let site = site.trim();
        if site.is_empty() || !site.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            bail!("invalid site name '{site}'");
        }

        let base_url = match base_url {
            Some(url) => Url::parse(url).with_context(|| format!("invalid base URL '{url}'"))?,
            None => default_base_url(site)?,
        };

        Ok(Self {
            site: site.to_string(),
            base_url,
            session_id: resolve_session(session)?,
            output_dir: resolve_output_dir(output),
            timeout_ms: timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        })
    }

    /// Where the archive for this run is written.
    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

pub fn default_base_url(site: &str) -> Result<Url> {
    Ok(Url::parse(&format!("https://{site}.wikidot.com"))?)
}

/// Resolve the session id: flag first, then the environment.
pub fn resolve_session(explicit: Option<&str>) -> Result<String> {
    if let Some(session) = explicit {
        return Ok(session.to_string());
    }

    match std::env::var(SESSION_ENV) {
        Ok(session) if !session.is_empty() => Ok(session),
        _ => bail!("no session id: pass --session or set {SESSION_ENV}"),
    }
}

/// Resolve the output directory: flag, then environment, then the current
/// directory.
pub fn resolve_output_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
        return PathBuf::from(dir);
    }

    PathBuf::from(".")
}
