//! Push notification channel.

use serde_json::Value;
use tracing::debug;

/// Event pushed after each successful per-file sign call; payload is
/// the source fullpath.
pub const FILES_SIGNED: &str = "files signed";

/// Event pushed after signature verification; payload is the normalized
/// signer-info list.
pub const SIGNATURE_VERIFIED: &str = "signature verified";

/// Connection lookup and event push, keyed by a file's `socket` id.
///
/// Connections are external collaborators: this crate never owns them,
/// it only pushes events at ones that are currently connected.
pub trait ConnectionHub: Send + Sync {
    /// Whether the connection exists and is currently connected.
    fn is_connected(&self, socket: &str) -> bool;

    /// Push one event at a connection.
    fn emit(&self, socket: &str, event: &str, payload: Value);
}

/// Emit `event` when the file carries a live connection.
pub(crate) fn notify_if_connected(
    hub: &dyn ConnectionHub,
    socket: Option<&str>,
    event: &str,
    payload: Value,
) {
    let Some(socket) = socket else { return };
    if hub.is_connected(socket) {
        debug!(socket, event, "pushing notification");
        hub.emit(socket, event, payload);
    }
}

/// A hub with no connections; every emit is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHub;

impl ConnectionHub for NullHub {
    fn is_connected(&self, _socket: &str) -> bool {
        false
    }

    fn emit(&self, _socket: &str, _event: &str, _payload: Value) {}
}
