//! Progress event types and broadcast channel for backup telemetry.
//!
//! The aggregator emits `ProgressEvent`s while it walks the admin panel,
//! which flow through a `tokio::sync::broadcast` channel to all subscribers
//! (terminal output, log sinks). When no subscriber exists, events are
//! silently dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A progress event emitted during a backup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The run this event belongs to (the site identifier).
    pub request_id: String,
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The kind of progress event.
    pub event: ProgressEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    /// An extraction task has started.
    TaskStarted { task: SnapshotTask },
    /// An extraction task completed successfully.
    TaskCompleted { task: SnapshotTask, duration_ms: u64 },
    /// A plan-gated task was unavailable and its default was substituted.
    TaskDefaulted { task: SnapshotTask, reason: String },
    /// A presence-gated task found its feature disabled.
    TaskSkipped { task: SnapshotTask, reason: String },
    /// One page of a paginated listing was fetched.
    PageFetched {
        module: String,
        page: u32,
        last_page: u32,
    },
    /// The archive was written.
    ArchiveBuilt { entries: usize, bytes: usize },
}

/// Identifies which extraction step is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotTask {
    General,
    Domains,
    Toolbar,
    UserProfilePages,
    CustomFooter,
    AccessPolicy,
    HttpsPolicy,
    ApiAccess,
    UserIcons,
    LinkBlocking,
    Icons,
    Categories,
    Themes,
    Layouts,
    Bans,
    Members,
    Forum,
}

impl std::fmt::Display for SnapshotTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "General info"),
            Self::Domains => write!(f, "Domains"),
            Self::Toolbar => write!(f, "Toolbar"),
            Self::UserProfilePages => write!(f, "User profile pages"),
            Self::CustomFooter => write!(f, "Custom footer"),
            Self::AccessPolicy => write!(f, "Access policy"),
            Self::HttpsPolicy => write!(f, "HTTPS policy"),
            Self::ApiAccess => write!(f, "API access"),
            Self::UserIcons => write!(f, "User icons"),
            Self::LinkBlocking => write!(f, "Link blocking"),
            Self::Icons => write!(f, "Icons"),
            Self::Categories => write!(f, "Categories"),
            Self::Themes => write!(f, "Themes"),
            Self::Layouts => write!(f, "Layouts"),
            Self::Bans => write!(f, "Bans"),
            Self::Members => write!(f, "Members"),
            Self::Forum => write!(f, "Forum"),
        }
    }
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// 256 events covers a full run (two or three events per task plus one per
/// listing page) for all but very large member lists; slow receivers see
/// `Lagged` rather than blocking the run.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Emits progress events for one run.
///
/// Takes `&self` so members of a concurrent task group can report through
/// the same handle.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: Option<ProgressSender>,
    request_id: String,
    seq: AtomicU64,
}

impl ProgressReporter {
    pub fn new(tx: Option<ProgressSender>, request_id: impl Into<String>) -> Self {
        Self {
            tx,
            request_id: request_id.into(),
            seq: AtomicU64::new(0),
        }
    }

    /// A reporter with no channel; every emit is a no-op.
    pub fn silent() -> Self {
        Self::new(None, "")
    }

    /// Emit a progress event, silently ignoring send errors (which occur
    /// when no receivers are listening).
    pub fn emit(&self, event: ProgressEventKind) {
        if let Some(ref sender) = self.tx {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
            let _ = sender.send(ProgressEvent {
                request_id: self.request_id.clone(),
                seq,
                event,
            });
        }
    }
}
