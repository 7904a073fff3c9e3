//! Shared request types and the error taxonomy for the extraction pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::progress::SnapshotTask;

/// Named parameters sent alongside a module call.
///
/// Ordered so the same call always produces the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleParams(BTreeMap<String, String>);

impl ModuleParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Errors that can occur while extracting a site snapshot.
///
/// Every variant is fatal to the run: the markup no longer matches what the
/// decoders expect, so a partial snapshot would be untrustworthy.
#[derive(thiserror::Error, Debug)]
pub enum BackupError {
    #[error(
        "Module call {module} failed with status '{status}'{}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    RemoteCallFailed {
        module: String,
        status: String,
        message: Option<String>,
    },

    #[error("Malformed user reference: {0}")]
    MalformedUserRef(String),

    #[error("Missing timestamp: {0}")]
    MissingTimestamp(String),

    #[error("Invalid vote eligibility in code '{0}'")]
    InvalidEligibility(String),

    #[error("Invalid page index: '{0}'")]
    InvalidPageIndex(String),

    #[error("Unexpected field count in {section}: found {found}, expected one of {expected:?}")]
    UnexpectedFieldCount {
        section: &'static str,
        found: usize,
        expected: Vec<usize>,
    },

    #[error("Unsupported entry type for '{0}'")]
    UnsupportedEntryType(String),

    #[error("Malformed permission group '{0}'")]
    MalformedPermissions(String),

    #[error("Missing element '{selector}' in {section}")]
    MissingElement {
        section: &'static str,
        selector: String,
    },

    #[error("Module {module} returned no '{field}' field")]
    MissingAuxiliary { module: String, field: String },

    #[error("Unexpected value '{value}' for {field}")]
    UnexpectedValue { field: &'static str, value: String },

    #[error("Invalid module response: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{task} failed: {source}")]
    Task {
        task: SnapshotTask,
        #[source]
        source: Box<BackupError>,
    },
}

impl BackupError {
    /// Wrap this error with the extraction step it happened in.
    pub fn in_task(self, task: SnapshotTask) -> Self {
        match self {
            // Keep the innermost step when tasks nest.
            BackupError::Task { .. } => self,
            other => BackupError::Task {
                task,
                source: Box::new(other),
            },
        }
    }

    /// The underlying fault, with any task context stripped.
    pub fn root_cause(&self) -> &BackupError {
        match self {
            BackupError::Task { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The extraction step this error was raised in, if known.
    pub fn task(&self) -> Option<SnapshotTask> {
        match self {
            BackupError::Task { task, .. } => Some(*task),
            _ => None,
        }
    }
}

/// Convenience result type.
pub type BackupResult<T> = Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_builder_orders_keys() {
        let params = ModuleParams::new().with("page", "2").with("group", "admins");
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["group", "page"]);
        assert_eq!(params.get("page"), Some("2"));
    }

    #[test]
    fn test_task_wrapping_keeps_root_cause() {
        let err = BackupError::InvalidPageIndex("next".into())
            .in_task(SnapshotTask::Members)
            .in_task(SnapshotTask::Categories);
        assert_eq!(err.task(), Some(SnapshotTask::Members));
        assert!(matches!(err.root_cause(), BackupError::InvalidPageIndex(_)));
    }

    #[test]
    fn test_remote_call_message() {
        let err = BackupError::RemoteCallFailed {
            module: "managesite/ManageSiteGeneralModule".into(),
            status: "no_permission".into(),
            message: Some("Not an admin".into()),
        };
        assert_eq!(
            err.to_string(),
            "Module call managesite/ManageSiteGeneralModule failed with status 'no_permission': Not an admin"
        );
    }
}
