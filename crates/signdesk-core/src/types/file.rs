//! File entries flowing through the signing and verification pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file known to the file registry.
///
/// `extra`, `remote_id` and `socket` are carried through signing
/// unmodified so a newly produced signed file can be correlated back to
/// its remote origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Registry-assigned id
    pub id: u64,
    /// Absolute path on disk
    pub fullpath: PathBuf,
    /// Display name (basename of `fullpath` unless overridden)
    pub filename: String,
    /// Extension without the dot, lowercased
    pub extension: String,
    /// Last modification time
    pub last_modified: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
    /// Whether the file is part of the active selection
    pub active: bool,
    /// Opaque remote metadata, passed through untouched
    #[serde(default)]
    pub extra: serde_json::Value,
    /// Remote document id, when the file originated from a collaboration
    /// endpoint
    pub remote_id: Option<String>,
    /// Connection id for push notifications
    pub socket: Option<String>,
}

/// A freshly signed artifact, before it is re-stat'ed into a `FileEntry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedArtifact {
    /// Path of the produced signature file
    pub fullpath: PathBuf,
    /// Carried over from the source file
    #[serde(default)]
    pub extra: serde_json::Value,
    /// Carried over from the source file
    pub remote_id: Option<String>,
    /// Carried over from the source file
    pub socket: Option<String>,
}

/// Aggregated outcome of a signing batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// True iff every file in the batch signed successfully
    pub all_succeeded: bool,
}
