//! Terminal rendering of backup progress.

use admin_backup::progress::{ProgressEventKind, ProgressReceiver};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// One human-readable line per event, or `None` for events not worth a line.
pub fn describe(event: &ProgressEventKind) -> Option<String> {
    match event {
        ProgressEventKind::TaskStarted { .. } => None,
        ProgressEventKind::TaskCompleted { task, duration_ms } => {
            Some(format!("  ✓ {task} ({duration_ms}ms)"))
        }
        ProgressEventKind::TaskDefaulted { task, reason } => {
            Some(format!("  ~ {task}: {reason}, using defaults"))
        }
        ProgressEventKind::TaskSkipped { task, reason } => Some(format!("  - {task}: {reason}")),
        ProgressEventKind::PageFetched {
            module,
            page,
            last_page,
        } if *last_page > 1 => Some(format!("    {module} page {page}/{last_page}")),
        ProgressEventKind::PageFetched { .. } => None,
        ProgressEventKind::ArchiveBuilt { entries, bytes } => {
            Some(format!("  archive: {entries} entries, {bytes} bytes"))
        }
    }
}

/// Print events to stderr until the run drops its sender.
pub fn spawn_printer(mut rx: ProgressReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = describe(&event.event) {
                        eprintln!("{line}");
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!("progress printer lagged by {missed} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
