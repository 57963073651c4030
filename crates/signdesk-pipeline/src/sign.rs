//! Batch signing pipeline.
//!
//! Files are processed sequentially, never concurrently: remote
//! notifications and uploads are keyed by file identity and must not
//! interleave for the same file. A per-file failure marks the batch and
//! moves on; the pipeline always attempts every file.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

use signdesk_core::{
    BatchResult, FileEntry, PkiHandle, Result, SignedArtifact, SignerInfo, SigndeskError,
};

use crate::files::{file_entry_from_artifact, FileRegistry};
use crate::notify::{notify_if_connected, ConnectionHub, FILES_SIGNED};
use crate::sign_backend::{normalize_signers, DataFormat, SignBackend};
use crate::upload::UploadClient;

/// One signing batch: the files plus the signing identity and output
/// parameters, applied uniformly to every file.
#[derive(Debug, Clone)]
pub struct SignRequest {
    /// Files to sign, in order
    pub files: Vec<FileEntry>,
    /// Signing certificate
    pub certificate: PkiHandle,
    /// Signing key
    pub key: PkiHandle,
    /// Policy ids handed to the sign call
    pub policies: Vec<String>,
    /// Output encoding
    pub format: DataFormat,
    /// Where produced signature files land
    pub out_folder: PathBuf,
}

/// Outcome of the signing loop, before the follow-on registry effects.
///
/// The aggregated result must reach the observer before the file
/// registry is touched, so the loop hands the pending effects back to
/// the caller instead of applying them itself. Pass the batch to
/// [`SignPipeline::finish_package`] once the result has been reported.
#[derive(Debug)]
pub struct SignedBatch {
    /// Aggregated per-file outcome
    pub result: BatchResult,
    artifacts: Vec<SignedArtifact>,
    replaced_ids: Vec<u64>,
}

/// Drives batched per-file signing with partial-failure aggregation.
pub struct SignPipeline {
    backend: Arc<dyn SignBackend>,
    hub: Arc<dyn ConnectionHub>,
    files: Arc<dyn FileRegistry>,
    uploader: UploadClient,
    next_file_id: AtomicU64,
}

impl SignPipeline {
    /// Wire the pipeline to its collaborators.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SignBackend>,
        hub: Arc<dyn ConnectionHub>,
        files: Arc<dyn FileRegistry>,
        uploader: UploadClient,
    ) -> Self {
        Self {
            backend,
            hub,
            files,
            uploader,
            next_file_id: AtomicU64::new(1),
        }
    }

    /// Sign every file in the request.
    ///
    /// Returns `all_succeeded == true` iff every sign call produced an
    /// artifact, together with the pending follow-on effects. The
    /// selection/deletion effects are deliberately not applied here:
    /// call [`finish_package`] after the result has been reported.
    ///
    /// [`finish_package`]: Self::finish_package
    pub async fn sign_package(&self, request: SignRequest) -> Result<SignedBatch> {
        let mut all_succeeded = true;
        let mut artifacts: Vec<SignedArtifact> = Vec::new();
        let mut replaced_ids: Vec<u64> = Vec::new();

        for file in &request.files {
            let new_path = match self.backend.sign_file(
                &file.fullpath,
                request.certificate,
                request.key,
                &request.policies,
                request.format,
                &request.out_folder,
            ) {
                Ok(path) => path,
                Err(e) => {
                    warn!(path = %file.fullpath.display(), error = %e, "sign call failed");
                    all_succeeded = false;
                    continue;
                }
            };

            debug!(source = %file.fullpath.display(), artifact = %new_path.display(), "file signed");
            replaced_ids.push(file.id);
            artifacts.push(SignedArtifact {
                fullpath: new_path.clone(),
                extra: file.extra.clone(),
                remote_id: file.remote_id.clone(),
                socket: file.socket.clone(),
            });

            notify_if_connected(
                self.hub.as_ref(),
                file.socket.as_deref(),
                FILES_SIGNED,
                serde_json::Value::String(file.fullpath.display().to_string()),
            );

            // Re-attach failure kills signer extraction for this file
            // only; the upload still goes out with an empty signer list.
            let signers = match self.extract_signers(&new_path) {
                Ok(signers) => signers,
                Err(e) => {
                    error!(artifact = %new_path.display(), error = %e, "signer extraction failed");
                    Vec::new()
                }
            };

            if let Some(remote_id) = &file.remote_id {
                if let Err(e) = self
                    .uploader
                    .upload_signed(&new_path, &file.extra, remote_id, &signers)
                    .await
                {
                    warn!(id = remote_id, error = %e, "artifact upload failed");
                }
            }
        }

        Ok(SignedBatch {
            result: BatchResult { all_succeeded },
            artifacts,
            replaced_ids,
        })
    }

    /// Apply the follow-on effects of a completed batch: the successful
    /// artifacts become the new active file selection and their source
    /// entries are deleted.
    pub async fn finish_package(&self, batch: SignedBatch) {
        self.select_signed_package(batch.artifacts).await;
        self.files.delete_package(batch.replaced_ids).await;
    }

    /// Load the produced signature and pull normalized signer info out
    /// of it, re-attaching content when the structure is detached.
    fn extract_signers(&self, artifact: &std::path::Path) -> Result<Vec<SignerInfo>> {
        let mut sig = self.backend.load_signature(artifact)?;
        if self.backend.is_detached(sig) {
            sig = self
                .backend
                .set_detached_content(sig, artifact)
                .map_err(|_| SigndeskError::DetachedContent {
                    path: artifact.display().to_string(),
                })?;
        }
        let props = self.backend.signer_properties(sig)?;
        Ok(normalize_signers(&props, Utc::now()))
    }

    /// Follow-on effect (a): re-stat the artifacts into file entries and
    /// hand them to the registry as the new active selection. Artifacts
    /// that vanished between signing and stat are skipped with a warning.
    async fn select_signed_package(&self, artifacts: Vec<SignedArtifact>) {
        let mut entries = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let id = self.next_file_id.fetch_add(1, Ordering::Relaxed);
            match file_entry_from_artifact(id, artifact).await {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "signed artifact could not be stat'ed"),
            }
        }
        self.files.select_package(entries).await;
    }
}
