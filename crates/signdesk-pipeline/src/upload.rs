//! Remote collaboration upload client.

use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use signdesk_core::{Result, SignerInfo, SigndeskError};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Uploads signed artifacts to the collaboration endpoint.
#[derive(Clone)]
pub struct UploadClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    url: String,
}

impl UploadClient {
    /// Create a client posting to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let http = HttpClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            inner: Arc::new(ClientInner {
                http,
                url: url.into(),
            }),
        }
    }

    /// Multipart POST of one signed artifact: `extra` as JSON text, the
    /// artifact bytes, the remote document id, and the normalized
    /// signer list as JSON text.
    pub async fn upload_signed(
        &self,
        artifact: &Path,
        extra: &serde_json::Value,
        remote_id: &str,
        signers: &[SignerInfo],
    ) -> Result<()> {
        let path_str = artifact.display().to_string();
        let bytes = tokio::fs::read(artifact)
            .await
            .map_err(|e| SigndeskError::io(&path_str, e))?;
        let filename = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());

        let form = Form::new()
            .text("extra", serde_json::to_string(extra)?)
            .part("file", Part::bytes(bytes).file_name(filename))
            .text("id", remote_id.to_string())
            .text("signers", serde_json::to_string(signers)?);

        debug!(url = %self.inner.url, id = remote_id, "uploading signed artifact");
        let response = self
            .inner
            .http
            .post(&self.inner.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SigndeskError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SigndeskError::Http(format!(
                "upload returned {status} for id {remote_id}"
            )))
        }
    }
}
