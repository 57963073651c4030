//! Shared data model for registries and pipelines.

mod certificate;
mod container;
mod file;
mod signer;

pub use certificate::{CertificateDetails, CertificateItem, ItemKind, PkiHandle, Provider};
pub use container::Container;
pub use file::{BatchResult, FileEntry, SignedArtifact};
pub use signer::SignerInfo;
