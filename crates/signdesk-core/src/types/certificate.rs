//! Certificate and key item types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Originating provider of a certificate or key.
///
/// Fixed at creation; it selects the trust-resolution algorithm and must
/// never be re-derived elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    /// Local system trust store
    System,
    /// External cryptographic service with its own chain verification
    ExternalService,
}

/// What kind of PKI object a store item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// An X.509 certificate
    Certificate,
    /// A private key
    Key,
}

/// Opaque handle to a PKI object held by a backend.
///
/// Handles are issued by the backend and stay stable across registry
/// reloads; the registry keys its id map on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PkiHandle(pub u64);

/// One entry in the certificate & key registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateItem {
    /// Registry-assigned id, stable for the life of the process
    pub id: u64,
    /// Where the item came from
    pub provider: Provider,
    /// Certificate or key
    pub kind: ItemKind,
    /// Backend handle to the raw object
    pub handle: PkiHandle,
}

/// Display-oriented description of a certificate resolved from a key
/// container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetails {
    /// Thumbprint (lowercase hex SHA-256 of the DER encoding)
    pub hash: String,
    /// Issuer common name
    pub issuer_friendly_name: String,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Subject organization
    pub organization_name: String,
    /// Public key algorithm name or OID
    pub public_key_algorithm: String,
    /// Serial number (hex)
    pub serial: String,
    /// Signature algorithm name or OID
    pub signature_algorithm: String,
    /// Digest algorithm used inside the signature algorithm
    pub signature_digest_algorithm: String,
    /// Subject common name
    pub subject_friendly_name: String,
}
