use thiserror::Error;

/// Result type alias for signdesk operations
pub type Result<T> = std::result::Result<T, SigndeskError>;

/// Errors that can occur in the signing and trust orchestration core
#[derive(Error, Debug)]
pub enum SigndeskError {
    /// A referenced certificate, container or file id was not found
    #[error("no {kind} with id {id}")]
    Lookup {
        /// What was looked up ("certificate", "container", "file")
        kind: &'static str,
        /// The id that missed
        id: u64,
    },

    /// Building a certificate chain against the trusted roots failed
    #[error("chain build failed: {0}")]
    ChainBuild(String),

    /// Verifying a built chain (or a provider-native chain) failed
    #[error("chain verification failed: {0}")]
    ChainVerify(String),

    /// The external sign call failed for a single file
    #[error("signing failed for {path}: {reason}")]
    Sign {
        /// File that could not be signed
        path: String,
        /// Provider-reported reason
        reason: String,
    },

    /// A loaded signature structure could not be used
    #[error("signature error for {path}: {reason}")]
    Signature {
        /// Signature file involved
        path: String,
        /// What went wrong (load, verify, signer extraction)
        reason: String,
    },

    /// A detached signature's original content could not be re-attached
    #[error("detached content could not be attached for {path}")]
    DetachedContent {
        /// Signature file missing its content
        path: String,
    },

    /// The provider enumeration call itself failed
    #[error("provider enumeration failed: {0}")]
    ProviderEnumeration(String),

    /// Malformed license token or missing mandatory claim
    #[error("license parse failed: {0}")]
    LicenseParse(String),

    /// A PKI backend call failed (import, store access)
    #[error("pki backend error: {0}")]
    Backend(String),

    /// HTTP request failed (remote collaboration upload)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error at {path}: {source}")]
    Io {
        /// Path involved
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SigndeskError {
    /// Build a lookup error for a missing registry entry
    #[must_use]
    pub const fn lookup(kind: &'static str, id: u64) -> Self {
        Self::Lookup { kind, id }
    }

    /// Build an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the chain errors the trust resolver downgrades to `trusted = false`
    #[must_use]
    pub const fn is_chain_error(&self) -> bool {
        matches!(self, Self::ChainBuild(_) | Self::ChainVerify(_))
    }

    /// True when the error aborts a whole registry operation rather than one item
    #[must_use]
    pub const fn is_operation_fatal(&self) -> bool {
        matches!(
            self,
            Self::ProviderEnumeration(_) | Self::LicenseParse(_) | Self::Lookup { .. }
        )
    }
}
