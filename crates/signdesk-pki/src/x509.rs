//! X.509 parsing helpers for the software store.
//!
//! Everything display-oriented is computed once at parse time so the
//! rest of the crate never holds borrowed certificate data.

use chrono::{DateTime, TimeZone, Utc};
use ring::digest::{digest, SHA256};
use std::path::Path;

use signdesk_core::{CertificateDetails, Result, SigndeskError};

use crate::backend::CertFormat;

/// A fully parsed certificate with precomputed display fields.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    /// Raw DER encoding
    pub der: Vec<u8>,
    /// Lowercase hex SHA-256 of the DER bytes
    pub thumbprint: String,
    /// Subject distinguished name
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    /// Subject common name (empty when absent)
    pub subject_cn: String,
    /// Issuer common name (empty when absent)
    pub issuer_cn: String,
    /// Subject organization (empty when absent)
    pub organization: String,
    /// Serial number (hex)
    pub serial: String,
    /// Signature algorithm name
    pub signature_algorithm: String,
    /// Digest algorithm inside the signature algorithm
    pub signature_digest_algorithm: String,
    /// Public key algorithm name
    pub public_key_algorithm: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
}

impl ParsedCertificate {
    /// Whether the certificate is its own issuer.
    #[must_use]
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }

    /// Whether `now` falls inside the validity window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before && now <= self.not_after
    }

    /// Display-oriented item for container resolution.
    #[must_use]
    pub fn details(&self) -> CertificateDetails {
        CertificateDetails {
            hash: self.thumbprint.clone(),
            issuer_friendly_name: self.issuer_cn.clone(),
            not_after: self.not_after,
            organization_name: self.organization.clone(),
            public_key_algorithm: self.public_key_algorithm.clone(),
            serial: self.serial.clone(),
            signature_algorithm: self.signature_algorithm.clone(),
            signature_digest_algorithm: self.signature_digest_algorithm.clone(),
            subject_friendly_name: self.subject_cn.clone(),
        }
    }
}

/// Parse the first certificate in a file.
///
/// # Errors
///
/// Returns `Backend` when the file cannot be read, contains no
/// certificate, or fails DER parsing.
pub fn parse_certificate_file(path: &Path, format: CertFormat) -> Result<ParsedCertificate> {
    let path_str = path.display().to_string();
    let content = std::fs::read(path).map_err(|e| SigndeskError::io(&path_str, e))?;

    match format {
        CertFormat::Der => parse_der(&content),
        CertFormat::Pem => {
            let pems = pem::parse_many(&content)
                .map_err(|e| SigndeskError::Backend(format!("{path_str}: pem decode: {e}")))?;
            let block = pems
                .iter()
                .find(|p| p.tag() == "CERTIFICATE")
                .ok_or_else(|| {
                    SigndeskError::Backend(format!("{path_str}: no CERTIFICATE block"))
                })?;
            parse_der(block.contents())
        }
    }
}

/// Parse a single DER-encoded X.509 certificate.
pub fn parse_der(der: &[u8]) -> Result<ParsedCertificate> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| SigndeskError::Backend(format!("certificate parse: {e}")))?;

    let (signature_algorithm, signature_digest_algorithm) =
        signature_algorithm_names(&cert.signature_algorithm.algorithm.to_id_string());

    Ok(ParsedCertificate {
        thumbprint: sha256_hex(der),
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        subject_cn: common_name(cert.subject()),
        issuer_cn: common_name(cert.issuer()),
        organization: organization(cert.subject()),
        serial: cert.raw_serial_as_string(),
        signature_algorithm,
        signature_digest_algorithm,
        public_key_algorithm: public_key_algorithm_name(
            &cert.public_key().algorithm.algorithm.to_id_string(),
        ),
        not_before: asn1_to_utc(cert.validity().not_before),
        not_after: asn1_to_utc(cert.validity().not_after),
        der: der.to_vec(),
    })
}

/// Lowercase hex SHA-256 of raw bytes.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data).as_ref())
}

fn common_name(name: &x509_parser::x509::X509Name<'_>) -> String {
    name.iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn organization(name: &x509_parser::x509::X509Name<'_>) -> String {
    name.iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Map a signature algorithm OID to (name, digest name).
///
/// Unknown OIDs pass through as-is for both.
fn signature_algorithm_names(oid: &str) -> (String, String) {
    let (name, digest) = match oid {
        "1.2.840.113549.1.1.5" => ("RSA-SHA1", "SHA1"),
        "1.2.840.113549.1.1.11" => ("RSA-SHA256", "SHA256"),
        "1.2.840.113549.1.1.12" => ("RSA-SHA384", "SHA384"),
        "1.2.840.113549.1.1.13" => ("RSA-SHA512", "SHA512"),
        "1.2.840.10045.4.3.2" => ("ECDSA-SHA256", "SHA256"),
        "1.2.840.10045.4.3.3" => ("ECDSA-SHA384", "SHA384"),
        "1.2.643.2.2.3" => ("GOST R 34.10-2001", "GOST R 34.11-94"),
        "1.2.643.7.1.1.3.2" => ("GOST R 34.10-2012-256", "GOST R 34.11-2012-256"),
        "1.2.643.7.1.1.3.3" => ("GOST R 34.10-2012-512", "GOST R 34.11-2012-512"),
        other => (other, other),
    };
    (name.to_string(), digest.to_string())
}

fn public_key_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.1" => "RSA",
        "1.2.840.10045.2.1" => "EC",
        "1.2.643.2.2.19" => "GOST R 34.10-2001",
        "1.2.643.7.1.1.1.1" => "GOST R 34.10-2012-256",
        "1.2.643.7.1.1.1.2" => "GOST R 34.10-2012-512",
        other => other,
    }
    .to_string()
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    let epoch = t.timestamp();
    Utc.timestamp_opt(epoch, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
