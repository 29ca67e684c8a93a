// Transport configuration for building reqwest::Client instances.
//
// TLS trust, per-request timeout, and the cookie jar that carries the
// manager's session cookie all live here so the client module stays
// focused on request mechanics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

/// Default per-request timeout applied to every outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// TLS verification mode.
///
/// `System` is the default; the permissive mode is an explicit opt-out
/// for managers running self-signed certificates, never a silent
/// fallback.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the platform certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate.
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("paddock/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| {
                    crate::error::Error::Tls {
                        url: path.display().to_string(),
                        message: format!("failed to read CA cert: {e}"),
                    }
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem).map_err(|e| {
                    crate::error::Error::Tls {
                        url: path.display().to_string(),
                        message: format!("invalid CA cert: {e}"),
                    }
                })?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder.build().map_err(|e| crate::error::Error::Tls {
            url: String::new(),
            message: format!("failed to build HTTP client: {e}"),
        })
    }

    /// Create a config with a fresh cookie jar (session continuation
    /// requires one; each authentication attempt starts clean).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}
