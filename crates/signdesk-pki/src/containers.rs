//! Key container registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use signdesk_core::{CertificateDetails, Container, PkiHandle, Result, SigndeskError};

use crate::backend::{PkiBackend, ProviderType};

/// Enumerates and reshapes key containers from a cryptographic provider.
///
/// The listing is recomputed in full on every [`load_all`] call; an
/// enumeration failure leaves the previous listing in place.
///
/// [`load_all`]: ContainerRegistry::load_all
pub struct ContainerRegistry {
    backend: Arc<dyn PkiBackend>,
    state: RwLock<Vec<Container>>,
    next_id: AtomicU64,
}

impl ContainerRegistry {
    /// Create an empty registry over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn PkiBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Enumerate containers of the given provider type.
    ///
    /// A container is dropped when `"registry"` occurs in its lowercased
    /// fully-qualified name at a position strictly greater than zero;
    /// absent or position zero keeps it.
    pub async fn load_all(&self, provider: ProviderType) -> Result<Vec<Container>> {
        let raw = self
            .backend
            .enum_containers(provider)
            .map_err(|e| SigndeskError::ProviderEnumeration(e.to_string()))?;

        let containers: Vec<Container> = raw
            .iter()
            .filter(|c| keep_container(&c.fqcn))
            .map(|c| Container {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                name: c.unique_name.clone(),
                friendly_name: c.container.clone(),
                reader: reader_of(&c.fqcn),
            })
            .collect();

        debug!(
            total = raw.len(),
            kept = containers.len(),
            "container enumeration complete"
        );
        *self.state.write().await = containers.clone();
        Ok(containers)
    }

    /// Current listing.
    pub async fn containers(&self) -> Vec<Container> {
        self.state.read().await.clone()
    }

    /// Look up one container by id.
    pub async fn get(&self, id: u64) -> Option<Container> {
        self.state.read().await.iter().find(|c| c.id == id).cloned()
    }

    /// Drop the current listing.
    pub async fn clear(&self) {
        self.state.write().await.clear();
    }

    /// Resolve the certificate bound to a container.
    pub async fn certificate_from_container(
        &self,
        id: u64,
        provider: ProviderType,
    ) -> Result<(PkiHandle, CertificateDetails)> {
        let container = self
            .get(id)
            .await
            .ok_or(SigndeskError::lookup("container", id))?;
        self.backend
            .certificate_from_container(&container.name, provider)
    }
}

/// Keep-rule for raw containers: drop only when `"registry"` appears at
/// a byte position strictly greater than zero in the lowercased fqcn.
fn keep_container(fqcn: &str) -> bool {
    !matches!(fqcn.to_lowercase().find("registry"), Some(pos) if pos > 0)
}

/// Reader portion of a fully-qualified container name: everything
/// between byte 4 and the last path separator.
fn reader_of(fqcn: &str) -> String {
    let end = fqcn.rfind('\\').unwrap_or(fqcn.len());
    let start = 4.min(end);
    fqcn.get(start..end).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CertFormat, Chain, RawContainer, StoreItem};
    use signdesk_core::PkiHandle;
    use std::path::Path;
    use std::sync::Mutex;

    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

    struct FakeBackend {
        containers: Mutex<Vec<RawContainer>>,
        fail: AtomicBool,
    }

    impl FakeBackend {
        fn with(raw: Vec<RawContainer>) -> Self {
            Self {
                containers: Mutex::new(raw),
                fail: AtomicBool::new(false),
            }
        }
    }

    impl PkiBackend for FakeBackend {
        fn load_certificate(&self, _: &Path, _: CertFormat) -> Result<PkiHandle> {
            unimplemented!()
        }
        fn import_certificate(&self, _: PkiHandle) -> Result<()> {
            unimplemented!()
        }
        fn import_key(&self, _: &Path, _: &str) -> Result<PkiHandle> {
            unimplemented!()
        }
        fn items(&self) -> Result<Vec<StoreItem>> {
            unimplemented!()
        }
        fn trusted_roots(&self) -> Vec<PkiHandle> {
            unimplemented!()
        }
        fn build_chain(&self, _: PkiHandle, _: &[PkiHandle]) -> Result<Chain> {
            unimplemented!()
        }
        fn verify_chain(&self, _: &Chain) -> Result<bool> {
            unimplemented!()
        }
        fn verify_certificate_chain(&self, _: PkiHandle) -> Result<bool> {
            unimplemented!()
        }
        fn enum_containers(&self, _: ProviderType) -> Result<Vec<RawContainer>> {
            if self.fail.load(AtomicOrdering::SeqCst) {
                return Err(SigndeskError::Backend("csp unavailable".into()));
            }
            Ok(self.containers.lock().unwrap().clone())
        }
        fn certificate_from_container(
            &self,
            name: &str,
            _: ProviderType,
        ) -> Result<(PkiHandle, CertificateDetails)> {
            if name == "token-1" {
                Ok((
                    PkiHandle(42),
                    CertificateDetails {
                        hash: "ab".repeat(32),
                        issuer_friendly_name: "Test CA".into(),
                        not_after: chrono::Utc::now(),
                        organization_name: "Test Org".into(),
                        public_key_algorithm: "GOST R 34.10-2001".into(),
                        serial: "01".into(),
                        signature_algorithm: "GOST R 34.10-2001".into(),
                        signature_digest_algorithm: "GOST R 34.11-94".into(),
                        subject_friendly_name: "Signer".into(),
                    },
                ))
            } else {
                Err(SigndeskError::Backend(format!("no container '{name}'")))
            }
        }
    }

    fn raw(friendly: &str, unique: &str, fqcn: &str) -> RawContainer {
        RawContainer {
            container: friendly.to_string(),
            unique_name: unique.to_string(),
            fqcn: fqcn.to_string(),
        }
    }

    #[tokio::test]
    async fn registry_substring_past_start_is_excluded() {
        let backend = FakeBackend::with(vec![
            raw("token", "token-1", "\\\\.\\Reader\\SomeRegistryThing"),
            raw("kept", "kept-1", "Registry\\Foo"),
            raw("plain", "plain-1", "\\\\.\\Aktiv Rutoken ECP 00 00\\plain"),
        ]);
        let registry = ContainerRegistry::new(Arc::new(backend));

        let listing = registry.load_all(ProviderType::default()).await.unwrap();
        let names: Vec<&str> = listing.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["kept-1", "plain-1"]);
    }

    #[tokio::test]
    async fn reader_is_sliced_between_byte_4_and_last_separator() {
        let backend = FakeBackend::with(vec![raw(
            "cont",
            "u-1",
            "\\\\.\\Aktiv Rutoken ECP 00 00\\cont",
        )]);
        let registry = ContainerRegistry::new(Arc::new(backend));
        let listing = registry.load_all(ProviderType::default()).await.unwrap();
        assert_eq!(listing[0].reader, "Aktiv Rutoken ECP 00 00");
        assert_eq!(listing[0].friendly_name, "cont");
    }

    #[tokio::test]
    async fn enumeration_failure_keeps_prior_listing() {
        let backend = Arc::new(FakeBackend::with(vec![raw("a", "a-1", "\\\\.\\R\\a")]));
        let dyn_backend: Arc<dyn PkiBackend> = backend.clone();
        let registry = ContainerRegistry::new(dyn_backend);
        registry.load_all(ProviderType::default()).await.unwrap();
        assert_eq!(registry.containers().await.len(), 1);

        backend.fail.store(true, AtomicOrdering::SeqCst);
        assert!(matches!(
            registry.load_all(ProviderType::default()).await.unwrap_err(),
            SigndeskError::ProviderEnumeration(_)
        ));
        // Prior contents untouched.
        assert_eq!(registry.containers().await.len(), 1);
    }

    #[tokio::test]
    async fn each_load_recomputes_the_listing() {
        let backend = FakeBackend::with(vec![raw("a", "a-1", "\\\\.\\R\\a")]);
        let registry = ContainerRegistry::new(Arc::new(backend));

        let first = registry.load_all(ProviderType::default()).await.unwrap();
        let second = registry.load_all(ProviderType::default()).await.unwrap();
        // Fresh ids each round, strictly increasing.
        assert!(second[0].id > first[0].id);
    }

    #[tokio::test]
    async fn resolves_certificate_for_known_container() {
        let backend = FakeBackend::with(vec![raw("token", "token-1", "\\\\.\\R\\token")]);
        let registry = ContainerRegistry::new(Arc::new(backend));
        let listing = registry.load_all(ProviderType::default()).await.unwrap();

        let (handle, details) = registry
            .certificate_from_container(listing[0].id, ProviderType::default())
            .await
            .unwrap();
        assert_eq!(handle, PkiHandle(42));
        assert_eq!(details.subject_friendly_name, "Signer");
    }

    #[tokio::test]
    async fn unknown_container_id_is_a_lookup_error() {
        let registry = ContainerRegistry::new(Arc::new(FakeBackend::with(vec![])));
        assert!(matches!(
            registry
                .certificate_from_container(77, ProviderType::default())
                .await
                .unwrap_err(),
            SigndeskError::Lookup { id: 77, .. }
        ));
    }
}
