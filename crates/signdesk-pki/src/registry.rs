//! Process-wide certificate & key registry and the chain trust resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use signdesk_core::{
    CertificateItem, Config, ItemKind, PkiHandle, Provider, Result, SigndeskError,
};

use crate::backend::{CertFormat, PkiBackend};

/// The views a completed `load_all` exposes.
#[derive(Debug, Clone)]
pub struct CertificateSnapshot {
    /// Every item in the store, certificates and keys
    pub items: Vec<CertificateItem>,
    /// Certificate subset
    pub certificates: Vec<CertificateItem>,
    /// Trusted-root subset used by the system-provider chain path
    pub trusted_roots: Vec<PkiHandle>,
}

#[derive(Default)]
struct RegistryState {
    items: Vec<CertificateItem>,
    /// Handle -> id. Ids are assigned on first sight and never change.
    ids: HashMap<PkiHandle, u64>,
}

/// Owner of all certificate and key items.
///
/// Items are owned exclusively here; pipelines and the trust resolver
/// only ever receive copies keyed by id. Only the registry mutates its
/// own contents.
pub struct CertificateRegistry {
    backend: Arc<dyn PkiBackend>,
    config: Config,
    state: RwLock<RegistryState>,
    next_id: AtomicU64,
}

impl CertificateRegistry {
    /// Create an empty registry over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn PkiBackend>, config: Config) -> Self {
        Self {
            backend,
            config,
            state: RwLock::new(RegistryState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Import the bootstrap certificate and key, then (re-)enumerate the
    /// store.
    ///
    /// Bootstrap import failure is a warning, never an error: loading
    /// continues with whatever the store already holds. Enumeration
    /// failure aborts the whole operation and leaves prior contents
    /// untouched.
    pub async fn load_all(&self) -> Result<CertificateSnapshot> {
        self.bootstrap();

        let store_items = self
            .backend
            .items()
            .map_err(|e| SigndeskError::ProviderEnumeration(e.to_string()))?;

        let mut state = self.state.write().await;
        let items: Vec<CertificateItem> = store_items
            .iter()
            .map(|item| {
                let id = *state.ids.entry(item.handle).or_insert_with(|| {
                    self.next_id.fetch_add(1, Ordering::Relaxed)
                });
                CertificateItem {
                    id,
                    provider: item.provider,
                    kind: item.kind,
                    handle: item.handle,
                }
            })
            .collect();
        state.items = items.clone();
        drop(state);

        debug!(count = items.len(), "certificate store loaded");
        Ok(CertificateSnapshot {
            certificates: items
                .iter()
                .filter(|i| i.kind == ItemKind::Certificate)
                .cloned()
                .collect(),
            trusted_roots: self.backend.trusted_roots(),
            items,
        })
    }

    fn bootstrap(&self) {
        let cert_path = &self.config.bootstrap_cert;
        match self.backend.load_certificate(cert_path, CertFormat::Pem) {
            Ok(handle) => {
                if let Err(e) = self.backend.import_certificate(handle) {
                    warn!(path = %cert_path.display(), error = %e, "bootstrap certificate import failed");
                }
                if let Err(e) = self
                    .backend
                    .import_key(&self.config.bootstrap_key, &self.config.bootstrap_key_password)
                {
                    warn!(path = %self.config.bootstrap_key.display(), error = %e, "bootstrap key import failed");
                }
            }
            Err(e) => {
                warn!(path = %cert_path.display(), error = %e, "bootstrap certificate load failed");
            }
        }
    }

    /// Every item currently known.
    pub async fn items(&self) -> Vec<CertificateItem> {
        self.state.read().await.items.clone()
    }

    /// Certificate subset.
    pub async fn certificates(&self) -> Vec<CertificateItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|i| i.kind == ItemKind::Certificate)
            .cloned()
            .collect()
    }

    /// Look up one item by id.
    pub async fn get(&self, id: u64) -> Option<CertificateItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Trusted-root subset, straight from the backend.
    #[must_use]
    pub fn trusted_roots(&self) -> Vec<PkiHandle> {
        self.backend.trusted_roots()
    }

    /// Drop every item. Ids stay reserved: a later reload of the same
    /// handle gets its old id back.
    pub async fn clear(&self) {
        self.state.write().await.items.clear();
    }

    /// Resolve trust for a certificate.
    ///
    /// The trust algorithm is selected by the item's provider
    /// classification, fixed at creation. Chain failures on either path
    /// are downgraded to `Ok(false)`; only an unknown id is an error.
    pub async fn verify_certificate(&self, id: u64) -> Result<bool> {
        let item = self
            .get(id)
            .await
            .ok_or(SigndeskError::lookup("certificate", id))?;

        let trusted = match item.provider {
            Provider::System => {
                let roots = self.backend.trusted_roots();
                match self
                    .backend
                    .build_chain(item.handle, &roots)
                    .and_then(|chain| self.backend.verify_chain(&chain))
                {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        debug!(id, error = %e, "system chain verification failed");
                        false
                    }
                }
            }
            Provider::ExternalService => {
                match self.backend.verify_certificate_chain(item.handle) {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        debug!(id, error = %e, "provider chain verification failed");
                        false
                    }
                }
            }
        };

        Ok(trusted)
    }
}
