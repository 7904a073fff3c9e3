//! Zip archive builder.
//!
//! Entries are written in the order given. Structured entries are
//! serialized as pretty JSON; binaries are stored as-is.

use std::io::{Cursor, Read, Write};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::types::{BackupError, BackupResult};

/// What an archive entry holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveContent {
    /// A JSON document. Must be an object or an array.
    Structured(Value),
    /// A raw asset such as an icon.
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: ArchiveContent,
}

impl ArchiveEntry {
    pub fn structured<T: Serialize + ?Sized>(
        name: impl Into<String>,
        value: &T,
    ) -> BackupResult<Self> {
        Ok(Self {
            name: name.into(),
            content: ArchiveContent::Structured(serde_json::to_value(value)?),
        })
    }

    pub fn binary(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: ArchiveContent::Binary(bytes),
        }
    }
}

/// A finished archive, ready to be saved or offered for download.
#[derive(Debug, Clone)]
pub struct BackupArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Archives are named after the site's short identifier.
pub fn archive_file_name(site: &str) -> String {
    format!("{site}.zip")
}

fn encode(entry: &ArchiveEntry) -> BackupResult<Vec<u8>> {
    match &entry.content {
        ArchiveContent::Structured(value @ (Value::Object(_) | Value::Array(_))) => {
            Ok(serde_json::to_vec_pretty(value)?)
        }
        ArchiveContent::Structured(_) => Err(BackupError::UnsupportedEntryType(entry.name.clone())),
        ArchiveContent::Binary(bytes) => Ok(bytes.clone()),
    }
}

/// Write every entry into one deflated zip and return its bytes.
pub fn build(entries: &[ArchiveEntry]) -> BackupResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        let data = encode(entry)?;
        debug!("archiving {} ({} bytes)", entry.name, data.len());
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&data)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Read back `(name, bytes)` pairs in archive order.
pub fn read_entries(bytes: &[u8]) -> BackupResult<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        // The declared size is untrusted.
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push((file.name().to_string(), data));
    }
    Ok(entries)
}
