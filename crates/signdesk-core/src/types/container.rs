//! Key container listing types.

use serde::{Deserialize, Serialize};

/// A named key-storage unit exposed by a cryptographic provider.
///
/// Derived by filtering and reshaping the raw provider enumeration; the
/// listing is recomputed in full on every `load_all` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    /// Registry-assigned id for this enumeration round
    pub id: u64,
    /// Unique provider handle, used to resolve the bound certificate
    pub name: String,
    /// Human-readable container name
    pub friendly_name: String,
    /// Reader extracted from the fully-qualified container name
    pub reader: String,
}
