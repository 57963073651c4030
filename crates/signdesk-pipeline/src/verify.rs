//! Signature verification pipeline.

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use signdesk_core::{Result, SignerInfo, SigndeskError};

use crate::files::FileRegistry;
use crate::notify::{notify_if_connected, ConnectionHub, SIGNATURE_VERIFIED};
use crate::sign_backend::{normalize_signers, SignBackend};

/// Diagnostic emitted when verification hits an error, before the
/// authoritative terminal event.
#[derive(Debug)]
pub struct VerifyFailure {
    /// File the verification ran against
    pub file_id: u64,
    /// What went wrong
    pub error: SigndeskError,
}

/// Authoritative verification result for UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    /// File the verification ran against
    pub file_id: u64,
    /// Signature validity; false on the error path
    pub status: bool,
    /// Normalized per-signer metadata; empty on the error path
    pub signers: Vec<SignerInfo>,
}

/// Everything one verification run reports.
///
/// A failed run carries both the diagnostic and the terminal outcome:
/// consumers must expect up to two events and treat the later one as
/// authoritative.
#[derive(Debug)]
pub struct VerificationReport {
    /// The always-present terminal outcome
    pub outcome: VerificationOutcome,
    /// The diagnostic, present only when an error occurred
    pub failure: Option<VerifyFailure>,
}

/// Loads and verifies an existing signature for one file.
pub struct VerifyPipeline {
    backend: Arc<dyn SignBackend>,
    hub: Arc<dyn ConnectionHub>,
    files: Arc<dyn FileRegistry>,
}

impl VerifyPipeline {
    /// Wire the pipeline to its collaborators.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SignBackend>,
        hub: Arc<dyn ConnectionHub>,
        files: Arc<dyn FileRegistry>,
    ) -> Self {
        Self {
            backend,
            hub,
            files,
        }
    }

    /// Verify the signature of one file.
    ///
    /// Never fails outright: errors are folded into the report as a
    /// diagnostic plus a `status = false` outcome.
    pub async fn verify_file(&self, file_id: u64) -> VerificationReport {
        match self.run(file_id).await {
            Ok((status, signers)) => VerificationReport {
                outcome: VerificationOutcome {
                    file_id,
                    status,
                    signers,
                },
                failure: None,
            },
            Err(error) => {
                warn!(file_id, error = %error, "verification failed");
                VerificationReport {
                    outcome: VerificationOutcome {
                        file_id,
                        status: false,
                        signers: Vec::new(),
                    },
                    failure: Some(VerifyFailure { file_id, error }),
                }
            }
        }
    }

    async fn run(&self, file_id: u64) -> Result<(bool, Vec<SignerInfo>)> {
        let file = self
            .files
            .get(file_id)
            .await
            .ok_or(SigndeskError::lookup("file", file_id))?;

        let mut sig = self.backend.load_signature(&file.fullpath)?;
        if self.backend.is_detached(sig) {
            sig = self
                .backend
                .set_detached_content(sig, &file.fullpath)
                .map_err(|_| SigndeskError::DetachedContent {
                    path: file.fullpath.display().to_string(),
                })?;
        }

        let status = self.backend.verify_signature(sig)?;
        let props = self.backend.signer_properties(sig)?;
        let signers = normalize_signers(&props, Utc::now());

        notify_if_connected(
            self.hub.as_ref(),
            file.socket.as_deref(),
            SIGNATURE_VERIFIED,
            serde_json::to_value(&signers).unwrap_or_default(),
        );

        Ok((status, signers))
    }
}
