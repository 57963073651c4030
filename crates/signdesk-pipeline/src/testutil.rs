//! Scriptable fakes shared by the pipeline tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use signdesk_core::{FileEntry, PkiHandle, Result, SigndeskError};

use crate::files::FileRegistry;
use crate::notify::ConnectionHub;
use crate::sign_backend::{
    ChainCertProperties, DataFormat, SignBackend, SignatureHandle, SignerProperties,
};

/// Create a real file under `dir` and the matching registry entry.
pub(crate) fn file_on_disk(
    dir: &tempfile::TempDir,
    name: &str,
    id: u64,
    remote_id: Option<&str>,
    socket: Option<&str>,
) -> FileEntry {
    let path = dir.path().join(name);
    std::fs::write(&path, b"document bytes").unwrap();
    FileEntry {
        id,
        fullpath: path,
        filename: name.to_string(),
        extension: Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default(),
        last_modified: Utc::now(),
        size: 14,
        active: true,
        extra: serde_json::json!({"origin": "test"}),
        remote_id: remote_id.map(str::to_string),
        socket: socket.map(str::to_string),
    }
}

/// A backend that "signs" by copying the source into the out folder
/// with a `.sig` suffix, scriptable for the failure paths.
pub(crate) struct CopySignBackend {
    fail_paths: Vec<PathBuf>,
    detached: bool,
    attachable: bool,
    verdict: bool,
    next_handle: AtomicU64,
}

impl Default for CopySignBackend {
    fn default() -> Self {
        Self {
            fail_paths: Vec::new(),
            detached: false,
            attachable: true,
            verdict: true,
            next_handle: AtomicU64::new(1),
        }
    }
}

impl CopySignBackend {
    pub(crate) fn failing_for(paths: &[PathBuf]) -> Self {
        Self {
            fail_paths: paths.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn detached_attachable() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    pub(crate) fn detached_and_unattachable() -> Self {
        Self {
            detached: true,
            attachable: false,
            ..Self::default()
        }
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            verdict: false,
            ..Self::default()
        }
    }
}

impl SignBackend for CopySignBackend {
    fn sign_file(
        &self,
        path: &Path,
        _cert: PkiHandle,
        _key: PkiHandle,
        _policies: &[String],
        _format: DataFormat,
        out_folder: &Path,
    ) -> Result<PathBuf> {
        if self.fail_paths.iter().any(|p| p == path) {
            return Err(SigndeskError::Sign {
                path: path.display().to_string(),
                reason: "scripted failure".into(),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out = out_folder.join(format!("{name}.sig"));
        std::fs::copy(path, &out).map_err(|e| SigndeskError::io(out.display().to_string(), e))?;
        Ok(out)
    }

    fn load_signature(&self, _path: &Path) -> Result<SignatureHandle> {
        Ok(SignatureHandle(
            self.next_handle.fetch_add(1, Ordering::Relaxed),
        ))
    }

    fn is_detached(&self, _sig: SignatureHandle) -> bool {
        self.detached
    }

    fn set_detached_content(
        &self,
        sig: SignatureHandle,
        content: &Path,
    ) -> Result<SignatureHandle> {
        if self.attachable {
            Ok(sig)
        } else {
            Err(SigndeskError::Signature {
                path: content.display().to_string(),
                reason: "content cannot be attached".into(),
            })
        }
    }

    fn verify_signature(&self, _sig: SignatureHandle) -> Result<bool> {
        Ok(self.verdict)
    }

    fn signer_properties(&self, _sig: SignatureHandle) -> Result<Vec<SignerProperties>> {
        let now = Utc::now();
        let cert = |subject: &str| ChainCertProperties {
            issuer_friendly_name: "Test Root".into(),
            not_before: now - Duration::days(1),
            not_after: now + Duration::days(365),
            signature_digest_algorithm: "SHA256".into(),
            subject_name: format!("CN={subject}"),
            issuer_name: "CN=Test Root".into(),
        };
        Ok(vec![SignerProperties {
            subject: "Test Signer".into(),
            certs: vec![cert("Test Root"), cert("Test Signer")],
        }])
    }
}

/// Connection hub that records every emitted event.
#[derive(Default)]
pub(crate) struct RecordingHub {
    live: HashSet<String>,
    events: Mutex<Vec<(String, String, Value)>>,
}

impl RecordingHub {
    pub(crate) fn connected(sockets: &[&str]) -> Self {
        Self {
            live: sockets.iter().map(|s| (*s).to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<(String, String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl ConnectionHub for RecordingHub {
    fn is_connected(&self, socket: &str) -> bool {
        self.live.contains(socket)
    }

    fn emit(&self, socket: &str, event: &str, payload: Value) {
        self.events
            .lock()
            .unwrap()
            .push((socket.to_string(), event.to_string(), payload));
    }
}

/// File registry that records follow-on effects and serves lookups
/// from a preloaded map.
#[derive(Default)]
pub(crate) struct RecordingRegistry {
    files: tokio::sync::Mutex<HashMap<u64, FileEntry>>,
    selected: Mutex<Vec<FileEntry>>,
    deleted: Mutex<Vec<u64>>,
}

impl RecordingRegistry {
    pub(crate) async fn insert(&self, entry: FileEntry) {
        self.files.lock().await.insert(entry.id, entry);
    }

    pub(crate) fn selected(&self) -> Vec<FileEntry> {
        self.selected.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<u64> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileRegistry for RecordingRegistry {
    async fn get(&self, id: u64) -> Option<FileEntry> {
        self.files.lock().await.get(&id).cloned()
    }

    async fn select_package(&self, files: Vec<FileEntry>) {
        self.selected.lock().unwrap().extend(files);
    }

    async fn delete_package(&self, ids: Vec<u64>) {
        self.deleted.lock().unwrap().extend(ids);
    }
}
