//! Asset fetching and glTF decoding

pub mod fetch;
pub mod loader;
pub mod model;

use std::path::PathBuf;

pub use fetch::{AssetFetcher, ModelSource, PendingAsset, TokioAssetFetcher};
pub use model::ModelAsset;

/// Why an asset could not be delivered to a viewport
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid glTF asset: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("asset decode failed: {0}")]
    Decode(String),
    #[error("asset contains no renderable geometry")]
    Empty,
    #[error("asset load was abandoned before completion")]
    Abandoned,
}
