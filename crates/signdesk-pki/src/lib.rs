//! # signdesk-pki
//!
//! Certificate & key registry, container registry and chain trust
//! resolution for the signdesk signing core.
//!
//! All store access goes through the [`PkiBackend`] trait; the crate
//! ships [`SoftPkiBackend`], an in-memory software store built on
//! x509-parser, for hosts without a native CSP and for tests.
//!
//! ## Trust model
//!
//! A certificate's provider classification (`System` vs
//! `ExternalService`) is fixed at creation and selects the trust
//! algorithm: system items get an explicit chain built against the
//! trusted-root subset, external-service items delegate to the
//! provider's own chain verification. Failures on either path downgrade
//! to *untrusted*, never to a crash.

pub mod backend;
pub mod containers;
pub mod registry;
pub mod soft_store;
pub mod x509;

pub use backend::{CertFormat, Chain, PkiBackend, ProviderType, RawContainer, StoreItem};
pub use containers::ContainerRegistry;
pub use registry::{CertificateRegistry, CertificateSnapshot};
pub use soft_store::SoftPkiBackend;
pub use x509::ParsedCertificate;
