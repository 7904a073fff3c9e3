//! AdminBackup CLI: HTTP module connector, configuration and commands.

pub mod commands;
pub mod config;
pub mod progress;
pub mod transport;

pub use config::BackupConfig;
pub use transport::WikidotConnector;
