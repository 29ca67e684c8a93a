//! Binary-owned configuration: TOML file + `PADDOCK_*` environment.
//!
//! Core never sees these types -- it receives a pre-built
//! `BuilderConfig` and cache/session paths. Everything ambient
//! (endpoints, username, TTL, TLS trust, timeout) is resolved here,
//! once, at startup.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use paddock_api::{TlsMode, TransportConfig};
use paddock_core::cache::DEFAULT_TTL;

use crate::error::CliError;

/// Resolved settings, extracted from defaults → config.toml →
/// `PADDOCK_*` env vars (later sources win).
#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Comma-separated endpoint base URLs. Required.
    pub url: Option<String>,

    /// Username offered to every endpoint.
    #[serde(default = "default_username")]
    pub username: String,

    /// Inventory cache time-to-live, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Skip TLS certificate verification (self-signed managers).
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Force debug-level logging regardless of -v.
    #[serde(default)]
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            username: default_username(),
            cache_ttl: default_cache_ttl(),
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
            debug: false,
        }
    }
}

fn default_username() -> String {
    "admin".into()
}
fn default_cache_ttl() -> u64 {
    DEFAULT_TTL.as_secs()
}
fn default_timeout() -> u64 {
    60
}

impl Settings {
    /// The endpoint list, in the order supplied.
    ///
    /// Order is part of the contract: it decides which cluster keeps
    /// its raw name when names collide.
    pub fn endpoints(&self) -> Result<Vec<Url>, CliError> {
        let raw = self.url.as_deref().ok_or(CliError::NoEndpoints)?;
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse().map_err(|_| CliError::Validation {
                    field: "url (PADDOCK_URL)".into(),
                    reason: format!("invalid endpoint URL: {s}"),
                })
            })
            .collect()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Translate TLS and timeout settings into a `TransportConfig`.
    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
            cookie_jar: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "paddock", "paddock")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| home_fallback(".config").join("config.toml"))
}

/// Per-user state directory: session files and the inventory cache.
pub fn state_dir() -> PathBuf {
    ProjectDirs::from("com", "paddock", "paddock")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback(".local/share"))
}

fn home_fallback(prefix: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(prefix);
    p.push("paddock");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from defaults, config.toml, and `PADDOCK_*` env vars.
///
/// Type errors (non-integer TTL, non-boolean flag) surface through
/// figment with the offending key named.
pub fn load() -> Result<Settings, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("PADDOCK_"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}
