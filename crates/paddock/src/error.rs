//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / api errors into user-facing diagnostics with
//! actionable help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use paddock_core::CoreError;

/// Exit codes: one per failure class, so the invoking orchestrator
/// can tell them apart.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const AUTH: i32 = 4;
    pub const CONNECTION: i32 = 5;
    pub const CACHE: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("no endpoints configured")]
    #[diagnostic(
        code(paddock::no_endpoints),
        help(
            "Set PADDOCK_URL to a comma-separated list of manager base URLs,\n\
             or add `url = \"https://...\"` to config.toml."
        )
    )]
    NoEndpoints,

    #[error("invalid value for {field}: {reason}")]
    #[diagnostic(code(paddock::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(paddock::config),
        help("Check config.toml and PADDOCK_* environment variables.")
    )]
    Config(Box<figment::Error>),

    // ── Connection ───────────────────────────────────────────────────

    #[error("TLS certificate verification failed for {url}")]
    #[diagnostic(
        code(paddock::tls_error),
        help(
            "The manager is using a certificate this system does not trust.\n\
             Set PADDOCK_CA_CERT to the manager's CA bundle, or set\n\
             PADDOCK_INSECURE=true to skip verification (not recommended)."
        )
    )]
    TlsError {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("could not reach {url}")]
    #[diagnostic(
        code(paddock::connection_failed),
        help("Check that the manager is running and the URL is correct.")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("manager API error: {message}")]
    #[diagnostic(code(paddock::api_error))]
    ApiError { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("could not prompt for credentials")]
    #[diagnostic(
        code(paddock::prompt_failed),
        help(
            "Authentication was rejected and no interactive terminal is\n\
             available to re-prompt. Run paddock from a terminal once to\n\
             establish a session."
        )
    )]
    PromptFailed {
        #[source]
        source: std::io::Error,
    },

    // ── Cache ────────────────────────────────────────────────────────

    #[error("inventory cache {path} is corrupt: {reason}")]
    #[diagnostic(
        code(paddock::cache_corrupt),
        help("Delete the file and re-run with --refresh-cache.")
    )]
    CacheCorrupt { path: String, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    #[diagnostic(code(paddock::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoEndpoints | Self::Validation { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::TlsError { .. } | Self::ConnectionFailed { .. } | Self::ApiError { .. } => {
                exit_code::CONNECTION
            }
            Self::PromptFailed { .. } => exit_code::AUTH,
            Self::CacheCorrupt { .. } => exit_code::CACHE,
            Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => match api {
                paddock_api::Error::Tls { url, message } => CliError::TlsError {
                    url,
                    source: message.into(),
                },
                paddock_api::Error::Transport { url, source } => CliError::ConnectionFailed {
                    url,
                    source: Box::new(source),
                },
                paddock_api::Error::Io(source) => CliError::Io(source),
                other => CliError::ApiError {
                    message: other.to_string(),
                },
            },

            CoreError::CacheCorrupt { path, reason } => CliError::CacheCorrupt {
                path: path.display().to_string(),
                reason,
            },

            CoreError::CacheIo { source, .. } => CliError::Io(source),

            CoreError::Serialize(e) => CliError::Json(e),

            CoreError::Prompt(source) => CliError::PromptFailed { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, exit_code};
    use paddock_core::CoreError;

    #[test]
    fn api_io_maps_to_io_with_general_exit_code() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CliError::from(CoreError::Api(paddock_api::Error::Io(io)));
        assert!(matches!(err, CliError::Io(_)), "got: {err:?}");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn api_authentication_maps_to_api_error() {
        let err = CliError::from(CoreError::Api(paddock_api::Error::Authentication {
            url: "https://mgr.example/api/version".into(),
            status: 401,
        }));
        assert!(matches!(err, CliError::ApiError { .. }), "got: {err:?}");
    }

    #[test]
    fn cache_corrupt_maps_to_cache_exit_code() {
        let err = CliError::from(CoreError::CacheCorrupt {
            path: "/tmp/inventory.json".into(),
            reason: "expected value at line 1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CACHE);
    }
}
