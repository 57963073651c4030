//! PKI backend interface.
//!
//! The registries and the trust resolver never touch certificates
//! directly; every store, chain and container operation goes through
//! this trait. Production wires it to a native CSP, tests and the
//! software store implement it in memory.

use std::path::Path;

use signdesk_core::{CertificateDetails, ItemKind, PkiHandle, Provider, Result};

/// On-disk encoding of a certificate being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertFormat {
    /// PEM-armored
    Pem,
    /// Raw DER
    Der,
}

/// CSP provider type number used for container enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderType(pub u32);

impl ProviderType {
    /// GOST R 34.10-2001 DH provider.
    pub const GOST_2001_DH: Self = Self(75);
}

impl Default for ProviderType {
    fn default() -> Self {
        Self::GOST_2001_DH
    }
}

/// An item as a backend store reports it, before the registry assigns
/// an id.
#[derive(Debug, Clone, Copy)]
pub struct StoreItem {
    /// Backend handle, stable across enumerations
    pub handle: PkiHandle,
    /// Originating provider, fixed at creation
    pub provider: Provider,
    /// Certificate or key
    pub kind: ItemKind,
}

/// A built certificate chain, leaf first, root last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Handles of the chain members
    pub certs: Vec<PkiHandle>,
}

/// A key container exactly as the provider enumerates it.
#[derive(Debug, Clone)]
pub struct RawContainer {
    /// Display name
    pub container: String,
    /// Unique provider handle
    pub unique_name: String,
    /// Fully-qualified container name (reader path included)
    pub fqcn: String,
}

/// External PKI capability.
pub trait PkiBackend: Send + Sync {
    /// Load a certificate from disk without adding it to the store.
    fn load_certificate(&self, path: &Path, format: CertFormat) -> Result<PkiHandle>;

    /// Add a previously loaded certificate to the store.
    fn import_certificate(&self, handle: PkiHandle) -> Result<()>;

    /// Load a private key from disk and add it to the store.
    fn import_key(&self, path: &Path, password: &str) -> Result<PkiHandle>;

    /// Enumerate every item currently in the store.
    fn items(&self) -> Result<Vec<StoreItem>>;

    /// The trusted-root subset used for system-provider chain building.
    fn trusted_roots(&self) -> Vec<PkiHandle>;

    /// Build a chain from `cert` up to one of `trusted`.
    fn build_chain(&self, cert: PkiHandle, trusted: &[PkiHandle]) -> Result<Chain>;

    /// Verify a built chain.
    fn verify_chain(&self, chain: &Chain) -> Result<bool>;

    /// Provider-native chain verification, for items that never expose
    /// an explicit chain object.
    fn verify_certificate_chain(&self, cert: PkiHandle) -> Result<bool>;

    /// Enumerate key containers of the given provider type.
    fn enum_containers(&self, provider: ProviderType) -> Result<Vec<RawContainer>>;

    /// Resolve the certificate bound to a container.
    fn certificate_from_container(
        &self,
        name: &str,
        provider: ProviderType,
    ) -> Result<(PkiHandle, CertificateDetails)>;
}
