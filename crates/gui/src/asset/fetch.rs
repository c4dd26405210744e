//! Asynchronous asset fetch: one request per viewport session

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::sync::oneshot;

use super::{loader, AssetError, ModelAsset};
use crate::viewport::host::Liveness;

/// Where a model comes from: a file (relative to the assets dir) or an http(s) URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelSource {
    File(PathBuf),
    Url(String),
}

impl ModelSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            ModelSource::Url(s.to_string())
        } else {
            ModelSource::File(PathBuf::from(s.trim_start_matches('/')))
        }
    }

    /// Absolute or assets-relative path for file sources
    pub fn resolve(&self, assets_dir: &Path) -> Option<PathBuf> {
        match self {
            ModelSource::File(p) if p.is_absolute() => Some(p.clone()),
            ModelSource::File(p) => Some(assets_dir.join(p)),
            ModelSource::Url(_) => None,
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::File(p) => write!(f, "{}", p.display()),
            ModelSource::Url(u) => f.write_str(u),
        }
    }
}

pub type AssetResult = Result<ModelAsset, AssetError>;

/// Sending half handed to whoever resolves a fetch
pub struct AssetSender(oneshot::Sender<AssetResult>);

impl AssetSender {
    /// Deliver the result. Returns false if the receiving session is gone.
    pub fn send(self, result: AssetResult) -> bool {
        self.0.send(result).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// Receiving half polled by the session on the UI thread
pub struct PendingAsset(oneshot::Receiver<AssetResult>);

impl PendingAsset {
    pub fn channel() -> (AssetSender, PendingAsset) {
        let (tx, rx) = oneshot::channel();
        (AssetSender(tx), PendingAsset(rx))
    }

    /// Non-blocking poll; `None` while the fetch is still running
    pub fn try_take(&mut self) -> Option<AssetResult> {
        match self.0.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(AssetError::Abandoned)),
        }
    }
}

pub trait AssetFetcher {
    /// Start fetching and decoding `source`. `liveness` lets the worker skip
    /// work for a session that has already been disposed.
    fn fetch(&self, source: &ModelSource, liveness: Liveness) -> PendingAsset;
}

/// Fetches on a tokio runtime: file read or HTTP GET, then glTF decode on a
/// blocking thread.
#[derive(Clone)]
pub struct TokioAssetFetcher {
    runtime: tokio::runtime::Handle,
    client: reqwest::Client,
    assets_dir: PathBuf,
}

impl TokioAssetFetcher {
    pub fn new(runtime: tokio::runtime::Handle, assets_dir: PathBuf) -> Self {
        Self {
            runtime,
            client: reqwest::Client::new(),
            assets_dir,
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }
}

impl AssetFetcher for TokioAssetFetcher {
    fn fetch(&self, source: &ModelSource, liveness: Liveness) -> PendingAsset {
        let (tx, pending) = PendingAsset::channel();
        let source = source.clone();
        let client = self.client.clone();
        let assets_dir = self.assets_dir.clone();

        self.runtime.spawn(async move {
            let result = fetch_and_decode(&client, &assets_dir, &source, &liveness).await;
            if !liveness.is_alive() {
                tracing::debug!("Discarding load of {source}: viewport already disposed");
                return;
            }
            if !tx.send(result) {
                tracing::debug!("Load of {source} finished after its viewport closed");
            }
        });

        pending
    }
}

async fn fetch_and_decode(
    client: &reqwest::Client,
    assets_dir: &Path,
    source: &ModelSource,
    liveness: &Liveness,
) -> AssetResult {
    let bytes = fetch_bytes(client, assets_dir, source).await?;
    if !liveness.is_alive() {
        return Err(AssetError::Abandoned);
    }
    tracing::debug!("Fetched {} bytes for {source}", bytes.len());

    tokio::task::spawn_blocking(move || loader::decode(&bytes))
        .await
        .map_err(|e| AssetError::Decode(e.to_string()))?
}

async fn fetch_bytes(
    client: &reqwest::Client,
    assets_dir: &Path,
    source: &ModelSource,
) -> Result<Vec<u8>, AssetError> {
    match source {
        ModelSource::Url(url) => {
            let http_err = |source| AssetError::Http {
                url: url.clone(),
                source,
            };
            let response = client.get(url).send().await.map_err(http_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(AssetError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            let bytes = response.bytes().await.map_err(http_err)?;
            Ok(bytes.to_vec())
        }
        ModelSource::File(_) => {
            let path = source.resolve(assets_dir).unwrap_or_default();
            tokio::fs::read(&path)
                .await
                .map_err(|source| AssetError::Io { path, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_kinds() {
        assert_eq!(
            ModelSource::parse("https://example.org/skull.glb"),
            ModelSource::Url("https://example.org/skull.glb".into())
        );
        assert_eq!(
            ModelSource::parse("/models/skull.glb"),
            ModelSource::File(PathBuf::from("models/skull.glb"))
        );
    }

    #[test]
    fn test_resolve_relative_to_assets() {
        let src = ModelSource::parse("models/frontal.glb");
        assert_eq!(
            src.resolve(Path::new("/opt/anatomar")),
            Some(PathBuf::from("/opt/anatomar/models/frontal.glb"))
        );
        assert_eq!(ModelSource::parse("http://x/y.glb").resolve(Path::new("/a")), None);
    }

    #[test]
    fn test_pending_reports_abandoned_sender() {
        let (tx, mut pending) = PendingAsset::channel();
        assert!(pending.try_take().is_none());
        drop(tx);
        assert!(matches!(pending.try_take(), Some(Err(AssetError::Abandoned))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let client = reqwest::Client::new();
        let err = rt
            .block_on(fetch_bytes(
                &client,
                Path::new("/nonexistent-anatomar-assets"),
                &ModelSource::parse("models/none.glb"),
            ))
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
