//! Entry point: one run, one archive.

use std::sync::Arc;

use tracing::info;

use crate::aggregator::SnapshotAggregator;
use crate::archive::{self, archive_file_name, BackupArchive};
use crate::gateway::{ModuleGateway, ModuleTransport};
use crate::progress::{ProgressEventKind, ProgressReporter, ProgressSender};
use crate::types::BackupResult;

/// Snapshot `site` through `transport` and pack it into `<site>.zip`.
///
/// Any fault in a required task ends the run without an archive.
pub async fn backup_site(
    transport: Arc<dyn ModuleTransport>,
    site: &str,
    progress: Option<ProgressSender>,
) -> BackupResult<BackupArchive> {
    let aggregator = SnapshotAggregator::new(
        ModuleGateway::new(transport),
        ProgressReporter::new(progress, site),
        site,
    );

    let entries = aggregator.run().await?.into_entries()?;
    let bytes = archive::build(&entries)?;
    info!("{site}: archived {} entries, {} bytes", entries.len(), bytes.len());
    aggregator.progress().emit(ProgressEventKind::ArchiveBuilt {
        entries: entries.len(),
        bytes: bytes.len(),
    });

    Ok(BackupArchive {
        file_name: archive_file_name(site),
        bytes,
    })
}
