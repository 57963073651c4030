//! Desktop document signing core: certificate registries, chain trust
//! resolution, and batched sign/verify pipelines.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use signdesk::{
//!     load_all_certificates, CertificateRegistry, Config, EventSink,
//!     SoftPkiBackend,
//! };
//!
//! #[tokio::main]
//! async fn main() -> signdesk::Result<()> {
//!     let config = Config::load(Path::new("signdesk.toml"))?;
//!     let registry = Arc::new(CertificateRegistry::new(
//!         Arc::new(SoftPkiBackend::new()),
//!         config,
//!     ));
//!
//!     // Started fires before this call returns; the terminal event
//!     // arrives on the sink once enumeration completes.
//!     let (sink, mut events) = EventSink::channel();
//!     let _load = load_all_certificates(registry, sink);
//!     while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - [`signdesk_core`] - data model, error taxonomy, operation
//!   lifecycle, license parsing, configuration
//! - [`signdesk_pki`] - certificate & container registries, chain trust
//!   resolution, the in-memory software store
//! - [`signdesk_pipeline`] - batched signing, signature verification,
//!   remote upload, lifecycle-wrapped entry points

pub use signdesk_core::{
    lifecycle, parse_license, BatchResult, CertificateDetails, CertificateItem, Config, Container,
    EventSink, FileEntry, ItemKind, License, LicensePayload, LifecycleEvent, Observer, PkiHandle,
    Provider, Result, SignedArtifact, SignerInfo, SigndeskError,
};
pub use signdesk_pipeline::ops::{
    certificate_from_container, load_all_certificates, load_all_containers, load_license_file,
    sign_package, verify_certificate, verify_signature,
};
pub use signdesk_pipeline::{
    ConnectionHub, DataFormat, FileRegistry, NullHub, SignBackend, SignPipeline, SignRequest,
    SignedBatch, UploadClient, VerificationOutcome, VerifyFailure, VerifyPipeline,
};
pub use signdesk_pki::{
    CertificateRegistry, CertificateSnapshot, ContainerRegistry, PkiBackend, ProviderType,
    SoftPkiBackend,
};
