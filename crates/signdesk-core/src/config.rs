//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SigndeskError};

/// Default collaboration upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str =
    "https://bitrix.tsumo.org/bitrix/components/trustednet/trustednet.docs/ajax.php?command=upload";

/// CSP provider type used for container enumeration when none is given
/// (75 = GOST R 34.10-2001 DH).
pub const DEFAULT_PROVIDER_TYPE: u32 = 75;

/// Configuration for the signing orchestration core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PEM certificate imported into the store on startup.
    pub bootstrap_cert: PathBuf,

    /// Private key matching `bootstrap_cert`.
    pub bootstrap_key: PathBuf,

    /// Password for the bootstrap key (empty = none).
    #[serde(default)]
    pub bootstrap_key_password: String,

    /// License token location.
    pub license_path: PathBuf,

    /// Collaboration upload endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Default cryptographic provider type for container enumeration.
    #[serde(default = "default_provider_type")]
    pub provider_type: u32,
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

const fn default_provider_type() -> u32 {
    DEFAULT_PROVIDER_TYPE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bootstrap_cert: PathBuf::from("cert1.crt"),
            bootstrap_key: PathBuf::from("cert1.key"),
            bootstrap_key_password: String::new(),
            license_path: PathBuf::from("license.lic"),
            upload_url: default_upload_url(),
            provider_type: DEFAULT_PROVIDER_TYPE,
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| SigndeskError::io(path.display().to_string(), e))?;
            toml::from_str(&content).map_err(|e| SigndeskError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }
}
