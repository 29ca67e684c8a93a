use std::path::PathBuf;

use thiserror::Error;

/// Error type for inventory building and caching.
///
/// Authentication failures never surface here -- the builder consumes
/// them in its retry loop. What remains is fatal: transport/TLS errors
/// from the API, cache corruption, and prompt I/O failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] paddock_api::Error),

    /// The cache file was believed fresh but could not be read back.
    #[error("inventory cache {path} is corrupt: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    /// Filesystem failure on the cache file.
    #[error("cache I/O error on {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inventory serialization failure.
    #[error("failed to serialize inventory: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The interactive credential prompt failed (closed stdin, no tty).
    #[error("credential prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}
