//! AdminBackup: snapshot a wiki site's admin panel into a single zip archive.

pub mod aggregator;
pub mod archive;
pub mod decode;
pub mod gateway;
pub mod markup;
pub mod pager;
pub mod pipeline;
pub mod progress;
pub mod snapshot;
pub mod tasks;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::SnapshotAggregator;
pub use archive::{archive_file_name, read_entries, ArchiveContent, ArchiveEntry, BackupArchive};
pub use gateway::{Availability, ModuleGateway, ModuleResponse, ModuleTransport};
pub use pipeline::backup_site;
pub use progress::{ProgressEvent, ProgressEventKind, ProgressReporter, SnapshotTask};
pub use snapshot::{SiteInfo, SiteSnapshot};
pub use types::*;
