//! In-memory software PKI store.
//!
//! Implements [`PkiBackend`] without any native CSP: certificates are
//! parsed with x509-parser, chains are walked by issuer linkage, and
//! containers are software key slots registered by the host
//! application. Chain verification here is structural (linkage plus
//! validity window), not cryptographic path validation.

use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use signdesk_core::{CertificateDetails, ItemKind, PkiHandle, Provider, Result, SigndeskError};

use crate::backend::{CertFormat, Chain, PkiBackend, ProviderType, RawContainer, StoreItem};
use crate::x509::{parse_certificate_file, ParsedCertificate};

/// Maximum issuer hops when building a chain.
const MAX_CHAIN_DEPTH: usize = 8;

enum SoftObject {
    Certificate(ParsedCertificate),
    Key {
        #[allow(dead_code)]
        path: PathBuf,
    },
}

struct SoftContainer {
    friendly: String,
    unique: String,
    fqcn: String,
    cert: PkiHandle,
}

#[derive(Default)]
struct SoftState {
    next_handle: u64,
    objects: HashMap<u64, SoftObject>,
    imported: Vec<PkiHandle>,
    containers: Vec<SoftContainer>,
}

impl SoftState {
    fn issue(&mut self) -> PkiHandle {
        self.next_handle += 1;
        PkiHandle(self.next_handle)
    }

    fn certificate(&self, handle: PkiHandle) -> Result<&ParsedCertificate> {
        match self.objects.get(&handle.0) {
            Some(SoftObject::Certificate(cert)) => Ok(cert),
            _ => Err(SigndeskError::Backend(format!(
                "handle {} is not a certificate",
                handle.0
            ))),
        }
    }
}

/// Software keystore backend.
#[derive(Default)]
pub struct SoftPkiBackend {
    state: Mutex<SoftState>,
}

impl SoftPkiBackend {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a software key container bound to an already loaded
    /// certificate. `reader` names the slot the container lives in.
    pub fn register_container(
        &self,
        friendly: &str,
        unique: &str,
        reader: &str,
        cert: PkiHandle,
    ) -> Result<()> {
        let mut state = self.lock();
        state.certificate(cert)?;
        let fqcn = format!("\\\\.\\{reader}\\{friendly}");
        state.containers.push(SoftContainer {
            friendly: friendly.to_string(),
            unique: unique.to_string(),
            fqcn,
            cert,
        });
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SoftState> {
        // Lock poisoning only happens after a panic in this module;
        // recover with the inner state either way.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl PkiBackend for SoftPkiBackend {
    fn load_certificate(&self, path: &Path, format: CertFormat) -> Result<PkiHandle> {
        let cert = parse_certificate_file(path, format)?;
        debug!(path = %path.display(), subject = %cert.subject, "loaded certificate");
        let mut state = self.lock();
        let handle = state.issue();
        state.objects.insert(handle.0, SoftObject::Certificate(cert));
        Ok(handle)
    }

    fn import_certificate(&self, handle: PkiHandle) -> Result<()> {
        let mut state = self.lock();
        state.certificate(handle)?;
        if !state.imported.contains(&handle) {
            state.imported.push(handle);
        }
        Ok(())
    }

    fn import_key(&self, path: &Path, _password: &str) -> Result<PkiHandle> {
        let path_str = path.display().to_string();
        std::fs::metadata(path).map_err(|e| SigndeskError::io(&path_str, e))?;
        let mut state = self.lock();
        let handle = state.issue();
        state.objects.insert(
            handle.0,
            SoftObject::Key {
                path: path.to_path_buf(),
            },
        );
        state.imported.push(handle);
        Ok(handle)
    }

    fn items(&self) -> Result<Vec<StoreItem>> {
        let state = self.lock();
        Ok(state
            .imported
            .iter()
            .filter_map(|handle| {
                state.objects.get(&handle.0).map(|obj| StoreItem {
                    handle: *handle,
                    provider: Provider::System,
                    kind: match obj {
                        SoftObject::Certificate(_) => ItemKind::Certificate,
                        SoftObject::Key { .. } => ItemKind::Key,
                    },
                })
            })
            .collect())
    }

    fn trusted_roots(&self) -> Vec<PkiHandle> {
        let state = self.lock();
        state
            .imported
            .iter()
            .filter(|handle| {
                matches!(
                    state.objects.get(&handle.0),
                    Some(SoftObject::Certificate(cert)) if cert.is_self_signed()
                )
            })
            .copied()
            .collect()
    }

    fn build_chain(&self, cert: PkiHandle, trusted: &[PkiHandle]) -> Result<Chain> {
        let state = self.lock();
        let mut certs = vec![cert];
        let mut current = state.certificate(cert)?;

        while !current.is_self_signed() {
            if certs.len() >= MAX_CHAIN_DEPTH {
                return Err(SigndeskError::ChainBuild(format!(
                    "chain exceeds {MAX_CHAIN_DEPTH} links"
                )));
            }
            let issuer = state
                .imported
                .iter()
                .chain(trusted.iter())
                .find(|candidate| {
                    matches!(
                        state.objects.get(&candidate.0),
                        Some(SoftObject::Certificate(c)) if c.subject == current.issuer
                    )
                })
                .copied()
                .ok_or_else(|| {
                    SigndeskError::ChainBuild(format!("no issuer for '{}'", current.subject))
                })?;
            certs.push(issuer);
            current = state.certificate(issuer)?;
        }

        Ok(Chain { certs })
    }

    fn verify_chain(&self, chain: &Chain) -> Result<bool> {
        let state = self.lock();
        let Some(root) = chain.certs.last() else {
            return Ok(false);
        };

        let now = Utc::now();
        for handle in &chain.certs {
            if !state.certificate(*handle)?.is_valid_at(now) {
                return Ok(false);
            }
        }

        // The chain terminates in the store's trusted subset.
        let root_cert = state.certificate(*root)?;
        Ok(root_cert.is_self_signed() && state.imported.contains(root))
    }

    fn verify_certificate_chain(&self, _cert: PkiHandle) -> Result<bool> {
        Err(SigndeskError::ChainVerify(
            "software store has no provider-native chain service".into(),
        ))
    }

    fn enum_containers(&self, _provider: ProviderType) -> Result<Vec<RawContainer>> {
        let state = self.lock();
        Ok(state
            .containers
            .iter()
            .map(|c| RawContainer {
                container: c.friendly.clone(),
                unique_name: c.unique.clone(),
                fqcn: c.fqcn.clone(),
            })
            .collect())
    }

    fn certificate_from_container(
        &self,
        name: &str,
        _provider: ProviderType,
    ) -> Result<(PkiHandle, CertificateDetails)> {
        let state = self.lock();
        let container = state
            .containers
            .iter()
            .find(|c| c.unique == name)
            .ok_or_else(|| SigndeskError::Backend(format!("no container '{name}'")))?;
        let cert = state.certificate(container.cert)?;
        Ok((container.cert, cert.details()))
    }
}
