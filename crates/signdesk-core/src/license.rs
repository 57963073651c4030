//! License token parsing.
//!
//! A license is a three-segment `<header>.<claims>.<signature>` token at
//! a fixed on-disk path. Only the claims segment is decoded, and only
//! structurally: no cryptographic check of the token is performed.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SigndeskError};

/// Parsed license claim set. All six claims are mandatory; a token
/// missing any of them is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Expiration time (epoch seconds)
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Issued at (epoch seconds)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Token id
    pub jti: String,
    /// Subject
    pub sub: String,
}

/// Raw token text plus its parsed claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePayload {
    /// The token exactly as read from disk
    pub data: String,
    /// The accepted claim set
    pub license: License,
}

/// Structurally parse a license token.
///
/// # Errors
///
/// `LicenseParse` when the token has fewer than three dot-segments, the
/// claims segment is not valid base64, or any of the six claims is
/// missing.
pub fn parse_license(token: &str) -> Result<License> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 3 {
        return Err(SigndeskError::LicenseParse(format!(
            "expected 3 dot-segments, got {}",
            segments.len()
        )));
    }

    let raw = decode_segment(segments[1])?;
    serde_json::from_slice(&raw)
        .map_err(|e| SigndeskError::LicenseParse(format!("claims rejected: {e}")))
}

/// Decode one token segment. Tokens in the wild use both the url-safe
/// and the standard alphabet, so try url-safe first.
fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| SigndeskError::LicenseParse(format!("claims segment is not base64: {e}")))
}

/// Read and parse the license token at `path`.
///
/// # Errors
///
/// `LicenseParse` when the file is absent, unreadable, or its content
/// fails [`parse_license`]. No partial license is ever returned.
pub async fn load_license(path: &Path) -> Result<LicensePayload> {
    debug!(path = %path.display(), "loading license token");
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SigndeskError::LicenseParse(format!("cannot read license: {e}")))?;

    let license = parse_license(&data)?;
    Ok(LicensePayload { data, license })
}
