//! Command implementations behind the `admin-backup` binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use admin_backup::{backup_site, read_entries};
use anyhow::{Context, Result};
use tracing::info;

use crate::config::BackupConfig;
use crate::progress::spawn_printer;
use crate::transport::WikidotConnector;

/// Back up one site and write `<site>.zip` into the output directory.
pub async fn backup(config: &BackupConfig) -> Result<PathBuf> {
    info!("Backing up {} via {}", config.site, config.base_url);
    let transport = WikidotConnector::new(
        config.base_url.clone(),
        config.session_id.clone(),
        config.timeout_ms,
    )?;

    let (tx, rx) = admin_backup::progress::channel();
    let printer = spawn_printer(rx);
    let result = backup_site(Arc::new(transport), &config.site, Some(tx)).await;
    // The sender is gone once the run returns, so the printer drains and exits.
    let _ = printer.await;
    let archive = result.with_context(|| format!("backup of {} failed", config.site))?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
    let path = config.archive_path(&archive.file_name);
    std::fs::write(&path, &archive.bytes)
        .with_context(|| format!("cannot write {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), archive.bytes.len());
    Ok(path)
}

/// Entry names and sizes of an archive on disk.
pub fn inspect(path: &Path) -> Result<Vec<(String, usize)>> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let entries = read_entries(&bytes)
        .with_context(|| format!("{} is not a backup archive", path.display()))?;
    Ok(entries
        .into_iter()
        .map(|(name, data)| (name, data.len()))
        .collect())
}
