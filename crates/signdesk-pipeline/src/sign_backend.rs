//! Sign/verify backend interface.
//!
//! Wraps the external CMS capability: producing a signature file,
//! loading one back, pairing detached signatures with their content,
//! and reading signer properties out of a loaded structure.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use signdesk_core::{PkiHandle, Result, SignerInfo};

/// Encoding of produced signature files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Raw DER
    #[default]
    Der,
    /// PEM-armored
    Pem,
}

/// Opaque loaded signature structure, owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureHandle(pub u64);

/// One certificate in a signer's chain, as the backend reports it.
#[derive(Debug, Clone)]
pub struct ChainCertProperties {
    /// Issuer display name
    pub issuer_friendly_name: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Digest algorithm of the certificate's signature
    pub signature_digest_algorithm: String,
    /// Full subject distinguished name
    pub subject_name: String,
    /// Full issuer distinguished name
    pub issuer_name: String,
}

/// Raw per-signer properties. The chain is ordered outermost first;
/// the innermost (signer) certificate is last.
#[derive(Debug, Clone)]
pub struct SignerProperties {
    /// Signer subject display name
    pub subject: String,
    /// The signer's certificate chain
    pub certs: Vec<ChainCertProperties>,
}

/// External sign/verify capability.
pub trait SignBackend: Send + Sync {
    /// Sign one file, producing a new signature file in `out_folder`.
    fn sign_file(
        &self,
        path: &Path,
        cert: PkiHandle,
        key: PkiHandle,
        policies: &[String],
        format: DataFormat,
        out_folder: &Path,
    ) -> Result<PathBuf>;

    /// Load a signature structure from disk.
    fn load_signature(&self, path: &Path) -> Result<SignatureHandle>;

    /// Whether the structure is detached from its content.
    fn is_detached(&self, sig: SignatureHandle) -> bool;

    /// Pair a detached structure with its content file.
    fn set_detached_content(&self, sig: SignatureHandle, content: &Path)
        -> Result<SignatureHandle>;

    /// Cryptographically verify the signature.
    fn verify_signature(&self, sig: SignatureHandle) -> Result<bool>;

    /// Read per-signer properties.
    fn signer_properties(&self, sig: SignatureHandle) -> Result<Vec<SignerProperties>>;
}

/// Normalize raw signer properties into wire-ready [`SignerInfo`]
/// entries. Subject and issuer come from the innermost certificate of
/// each signer's chain; signers with an empty chain are skipped.
/// `signing_time` is the moment of this call, not the original signing
/// time.
#[must_use]
pub fn normalize_signers(props: &[SignerProperties], now: DateTime<Utc>) -> Vec<SignerInfo> {
    props
        .iter()
        .filter_map(|info| {
            info.certs.last().map(|inner| SignerInfo {
                subject_friendly_name: info.subject.clone(),
                issuer_friendly_name: inner.issuer_friendly_name.clone(),
                not_before: inner.not_before,
                not_after: inner.not_after,
                digest_algorithm: inner.signature_digest_algorithm.clone(),
                signing_time: now,
                subject_name: inner.subject_name.clone(),
                issuer_name: inner.issuer_name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_cert(subject: &str) -> ChainCertProperties {
        let now = Utc::now();
        ChainCertProperties {
            issuer_friendly_name: format!("issuer of {subject}"),
            not_before: now,
            not_after: now,
            signature_digest_algorithm: "SHA256".into(),
            subject_name: format!("CN={subject}"),
            issuer_name: format!("CN=issuer of {subject}"),
        }
    }

    #[test]
    fn normalization_uses_the_innermost_chain_certificate() {
        let props = vec![SignerProperties {
            subject: "Alice".into(),
            certs: vec![chain_cert("Root CA"), chain_cert("Alice")],
        }];
        let now = Utc::now();
        let normalized = normalize_signers(&props, now);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].subject_friendly_name, "Alice");
        assert_eq!(normalized[0].subject_name, "CN=Alice");
        assert_eq!(normalized[0].issuer_friendly_name, "issuer of Alice");
        assert_eq!(normalized[0].signing_time, now);
    }

    #[test]
    fn signers_without_a_chain_are_skipped() {
        let props = vec![SignerProperties {
            subject: "ghost".into(),
            certs: vec![],
        }];
        assert!(normalize_signers(&props, Utc::now()).is_empty());
    }
}
