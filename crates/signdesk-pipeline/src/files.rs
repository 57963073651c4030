//! File registry collaborator and on-disk metadata derivation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

use signdesk_core::{FileEntry, Result, SignedArtifact, SigndeskError};

/// The file registry collaborator: the signing pipeline's follow-on
/// selection/deletion effects land here.
#[async_trait]
pub trait FileRegistry: Send + Sync {
    /// Look up one file by id.
    async fn get(&self, id: u64) -> Option<FileEntry>;

    /// Register newly produced artifacts as the new active selection.
    async fn select_package(&self, files: Vec<FileEntry>);

    /// Remove the source entries that were successfully replaced.
    async fn delete_package(&self, ids: Vec<u64>);
}

/// Build a [`FileEntry`] for a signed artifact by re-stat'ing it,
/// carrying `extra`/`remote_id`/`socket` over unchanged.
///
/// # Errors
///
/// IO error when the artifact cannot be stat'ed.
pub async fn file_entry_from_artifact(id: u64, artifact: SignedArtifact) -> Result<FileEntry> {
    let path = &artifact.fullpath;
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| SigndeskError::io(path.display().to_string(), e))?;
    let last_modified = meta
        .modified()
        .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);

    Ok(FileEntry {
        id,
        filename: basename(path),
        extension: extension(path),
        last_modified,
        size: meta.len(),
        active: true,
        fullpath: artifact.fullpath,
        extra: artifact.extra,
        remote_id: artifact.remote_id,
        socket: artifact.socket,
    })
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
