//! Ordered-candidate artifact resolution.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::abi::AbiDescriptor;
use crate::error::{ClientError, ClientResult};

/// Transport failure while fetching one candidate location. Never surfaced to
/// the operator on its own; rejections are logged and the scan moves on.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Fetches raw artifact documents. Implementations must bypass any caching
/// layer between the resolver and the artifact, so a stale interface is never
/// revalidated into a fresh load attempt.
#[async_trait]
pub trait AbiTransport: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Fetches artifacts over HTTP with `Cache-Control: no-store`, the transport
/// used when artifacts are served next to a dev chain.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Option<Url>,
}

impl HttpTransport {
    /// With a base URL, relative candidates are joined against it; without
    /// one, every candidate must be an absolute URL.
    pub fn new(base: Option<Url>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
        }
    }

    fn locate(&self, location: &str) -> Result<Url, FetchError> {
        match &self.base {
            Some(base) => base
                .join(location)
                .map_err(|e| FetchError(format!("cannot join {location} onto {base}: {e}"))),
            None => location
                .parse()
                .map_err(|e| FetchError(format!("{location} is not an absolute URL: {e}"))),
        }
    }
}

#[async_trait]
impl AbiTransport for HttpTransport {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let url = self.locate(location)?;
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| FetchError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(FetchError(format!("{url} returned {}", response.status())));
        }
        response.text().await.map_err(|e| FetchError(e.to_string()))
    }
}

/// Reads artifacts from disk, for running against a local build tree without
/// a dev server in front of it.
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Leading slashes are treated as "relative to the root", matching how a
    /// dev server would anchor them, so one candidate list serves both
    /// transports.
    fn locate(&self, location: &str) -> PathBuf {
        self.root.join(location.trim_start_matches('/'))
    }
}

#[async_trait]
impl AbiTransport for FileTransport {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let path = self.locate(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError(format!("{}: {e}", path.display())))
    }
}

/// Scans an ordered list of candidate locations for a usable contract
/// artifact. Every call performs a full scan from the first candidate; the
/// resolver itself holds no descriptor state, so callers decide how long an
/// accepted interface stays in use.
pub struct AbiResolver {
    transport: Arc<dyn AbiTransport>,
    candidates: Vec<String>,
}

impl AbiResolver {
    pub fn new(transport: Arc<dyn AbiTransport>, candidates: Vec<String>) -> Self {
        Self {
            transport,
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// First acceptance wins: earlier candidates shadow later ones even when
    /// several would parse. Exhausting the list is the only failure.
    pub async fn resolve(&self) -> ClientResult<AbiDescriptor> {
        for location in &self.candidates {
            match self.transport.fetch(location).await {
                Ok(body) => match AbiDescriptor::from_artifact_json(location, &body) {
                    Ok(descriptor) => {
                        tracing::info!(
                            location = %location,
                            contract = descriptor.contract_name().unwrap_or("<unnamed>"),
                            entries = descriptor.entry_count(),
                            "Contract ABI loaded"
                        );
                        return Ok(descriptor);
                    }
                    Err(reason) => {
                        tracing::debug!(location = %location, %reason, "Artifact rejected");
                    }
                },
                Err(reason) => {
                    tracing::debug!(location = %location, %reason, "Candidate unreachable");
                }
            }
        }

        tracing::warn!(
            candidates = self.candidates.len(),
            "No candidate location produced a usable artifact"
        );
        Err(ClientError::AbiUnavailable(format!(
            "no usable artifact at any of {} candidate locations",
            self.candidates.len()
        )))
    }
}
