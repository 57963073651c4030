//! Lifecycle-wrapped entry points.
//!
//! Each function is one user-triggerable operation: it reports `Started`
//! synchronously, defers the work by one tick, and fires exactly one
//! terminal event on the observer. Signature verification additionally
//! reports a `Failed` diagnostic before its terminal event when the run
//! hit an error; the terminal `Succeeded` outcome is authoritative.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

use signdesk_core::license::load_license;
use signdesk_core::{
    spawn_operation, BatchResult, CertificateDetails, Container, LicensePayload, Observer,
    PkiHandle, SigndeskError,
};
use signdesk_pki::{CertificateRegistry, CertificateSnapshot, ContainerRegistry, ProviderType};

use crate::sign::{SignPipeline, SignRequest};
use crate::verify::{VerificationOutcome, VerifyFailure, VerifyPipeline};

/// Bootstrap-import and (re-)enumerate the certificate store.
pub fn load_all_certificates(
    registry: Arc<CertificateRegistry>,
    observer: Arc<dyn Observer<CertificateSnapshot, SigndeskError>>,
) -> JoinHandle<()> {
    spawn_operation(observer, async move { registry.load_all().await })
}

/// Re-enumerate key containers of one provider type.
pub fn load_all_containers(
    registry: Arc<ContainerRegistry>,
    provider: ProviderType,
    observer: Arc<dyn Observer<Vec<Container>, SigndeskError>>,
) -> JoinHandle<()> {
    spawn_operation(observer, async move { registry.load_all(provider).await })
}

/// Resolve the certificate bound to a container.
pub fn certificate_from_container(
    registry: Arc<ContainerRegistry>,
    id: u64,
    provider: ProviderType,
    observer: Arc<dyn Observer<(PkiHandle, CertificateDetails), SigndeskError>>,
) -> JoinHandle<()> {
    spawn_operation(observer, async move {
        registry.certificate_from_container(id, provider).await
    })
}

/// Resolve trust for one certificate.
pub fn verify_certificate(
    registry: Arc<CertificateRegistry>,
    id: u64,
    observer: Arc<dyn Observer<bool, SigndeskError>>,
) -> JoinHandle<()> {
    spawn_operation(observer, async move {
        registry.verify_certificate(id).await
    })
}

/// Sign a batch of files.
///
/// The aggregated `BatchResult` reaches the observer before the
/// follow-on selection/deletion effects touch the file registry, so the
/// lifecycle contract is spelled out here rather than delegated to
/// [`spawn_operation`].
pub fn sign_package(
    pipeline: Arc<SignPipeline>,
    request: SignRequest,
    observer: Arc<dyn Observer<BatchResult, SigndeskError>>,
) -> JoinHandle<()> {
    observer.on_started();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        match pipeline.sign_package(request).await {
            Ok(batch) => {
                observer.on_succeeded(batch.result);
                pipeline.finish_package(batch).await;
            }
            Err(error) => observer.on_failed(error),
        }
    })
}

/// Verify the signature of one file.
///
/// The terminal event is always `Succeeded`: a run that hit an error
/// first reports the diagnostic through `on_failed`, then terminates
/// with `status = false` and an empty signer list.
pub fn verify_signature(
    pipeline: Arc<VerifyPipeline>,
    file_id: u64,
    observer: Arc<dyn Observer<VerificationOutcome, VerifyFailure>>,
) -> JoinHandle<()> {
    let diagnostics = Arc::clone(&observer);
    spawn_operation(observer, async move {
        let report = pipeline.verify_file(file_id).await;
        if let Some(failure) = report.failure {
            diagnostics.on_failed(failure);
        }
        Ok(report.outcome)
    })
}

/// Read and structurally parse the license token at `path`.
pub fn load_license_file(
    path: PathBuf,
    observer: Arc<dyn Observer<LicensePayload, SigndeskError>>,
) -> JoinHandle<()> {
    spawn_operation(observer, async move { load_license(&path).await })
}
