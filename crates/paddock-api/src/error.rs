use thiserror::Error;

/// Top-level error type for the `paddock-api` crate.
///
/// Authentication is the only recoverable variant -- the inventory
/// builder reacts to it by invalidating the stored session and
/// re-prompting. Everything else is fatal and carries the endpoint
/// URL so the operator knows which manager failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials or session rejected (HTTP 401/403). Derived from
    /// the status code, never from matching on error text.
    #[error("authentication rejected by {url} (HTTP {status})")]
    Authentication { url: String, status: u16 },

    /// TLS handshake or certificate verification failure.
    #[error("TLS verification failed for {url}: {message}")]
    Tls { url: String, message: String },

    /// HTTP transport error (DNS, connection refused, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Unexpected status from the manager API.
    #[error("API error from {url} (HTTP {status}): {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// Malformed response body, with a preview for debugging.
    #[error("malformed response from {url}: {message}")]
    Deserialization { url: String, message: String },

    /// Filesystem failure while persisting session state.
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if re-authenticating with fresh credentials
    /// might resolve this error.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Classify a `reqwest::Error`: certificate problems become
    /// [`Error::Tls`], everything else [`Error::Transport`].
    ///
    /// Detection walks the source chain looking for a `rustls::Error`
    /// rather than inspecting error text.
    pub(crate) fn from_reqwest(url: &url::Url, err: reqwest::Error) -> Self {
        if is_tls_failure(&err) {
            return Self::Tls {
                url: url.to_string(),
                message: err.to_string(),
            };
        }
        Self::Transport {
            url: url.to_string(),
            source: err,
        }
    }
}

fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if inner.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        // rustls errors often arrive wrapped in an io::Error.
        if let Some(io_err) = inner.downcast_ref::<std::io::Error>() {
            if io_err
                .get_ref()
                .is_some_and(|e| e.downcast_ref::<rustls::Error>().is_some())
            {
                return true;
            }
        }
        source = inner.source();
    }
    false
}
