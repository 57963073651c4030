//! Normalized signer metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-signer metadata extracted from a signature, normalized from the
/// innermost certificate of the signer's chain.
///
/// Produced fresh on every sign/verify call and shipped as JSON to the
/// collaboration endpoint and notification channel, hence the camelCase
/// wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerInfo {
    /// Signer subject display name
    pub subject_friendly_name: String,
    /// Issuer display name of the innermost chain certificate
    pub issuer_friendly_name: String,
    /// Certificate validity start
    pub not_before: DateTime<Utc>,
    /// Certificate validity end
    pub not_after: DateTime<Utc>,
    /// Digest algorithm of the certificate's signature
    pub digest_algorithm: String,
    /// Wall-clock time of this sign/verify call, not the original
    /// signing time
    pub signing_time: DateTime<Utc>,
    /// Full subject distinguished name
    pub subject_name: String,
    /// Full issuer distinguished name
    pub issuer_name: String,
}
