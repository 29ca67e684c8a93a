// Cluster-manager API HTTP client
//
// Wraps `reqwest::Client` with manager-specific URL construction and
// status classification. Authentication is HTTP Basic on the first
// request combined with cookie-based session continuation: the manager
// answers the initial call with a session cookie that the jar replays
// on every subsequent request.

use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::cookie::Jar;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::{ApiVersion, ClusterRecord, HostRecord, HostRef};
use crate::session::Session;
use crate::transport::TransportConfig;

/// Characters kept literal in a cluster-name path segment.
///
/// Matches the manager's quoting convention: everything outside
/// `[A-Za-z0-9_.~-]` is percent-encoded except `:` and `/`, which the
/// API expects verbatim.
const CLUSTER_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/');

/// Username/password pair for HTTP Basic authentication.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// One cluster with its member hostnames, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHosts {
    pub name: String,
    pub hosts: Vec<String>,
}

/// Everything one endpoint reports: its clusters in API order.
#[derive(Debug, Clone, Default)]
pub struct EndpointTopology {
    pub clusters: Vec<ClusterHosts>,
}

/// HTTP client for one cluster-manager endpoint.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_jar: Arc<Jar>,
    credentials: Option<Credentials>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// If the transport config doesn't already include a cookie jar,
    /// one is created automatically (session continuation requires
    /// cookies). Credentials are optional: a client without them can
    /// only succeed on a restored session.
    pub fn new(
        base_url: Url,
        credentials: Option<Credentials>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config
            .cookie_jar
            .clone()
            .unwrap_or_else(|| Arc::new(Jar::default()));
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
            credentials,
        })
    }

    /// The endpoint base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The endpoint hostname, used as the session-store key.
    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or("unknown")
    }

    /// Seed the cookie jar from a previously persisted session.
    pub fn restore_session(&self, session: &Session) {
        session.apply(&self.cookie_jar, &self.base_url);
    }

    /// Capture the current session cookies for persistence.
    pub fn session(&self) -> Option<Session> {
        Session::from_jar(&self.cookie_jar, &self.base_url)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helper ───────────────────────────────────────────────

    /// Send a GET request and deserialize the JSON body.
    ///
    /// `with_auth` attaches the Basic Authorization header; only the
    /// first request of a session carries it, later calls ride the
    /// session cookie. HTTP 401/403 map to [`Error::Authentication`]
    /// -- classification is by status code, never by message text.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, with_auth: bool) -> Result<T, Error> {
        debug!("GET {}", url);

        let mut builder = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");

        if with_auth {
            if let Some(ref creds) = self.credentials {
                builder = builder.basic_auth(&creds.username, Some(creds.password.expose_secret()));
            }
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&url, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message: preview(&body).to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(&url, e))?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            url: url.to_string(),
            message: format!("{e} (body preview: {:?})", preview(&body)),
        })
    }

    // ── API operations ───────────────────────────────────────────────

    /// Discover the API version string.
    ///
    /// `GET /api/version` -- the first call of a session, so it carries
    /// the Authorization header when credentials are present. All later
    /// paths embed the discovered version.
    pub async fn discover_version(&self) -> Result<String, Error> {
        let version: ApiVersion = self.get_json(self.api_url("version")?, true).await?;
        debug!(version = %version.version, "discovered API version");
        Ok(version.version)
    }

    /// Map host identifier to display hostname.
    ///
    /// `GET /api/{version}/hosts`
    pub async fn list_hosts(&self, version: &str) -> Result<HashMap<String, String>, Error> {
        let records: Vec<HostRecord> = self
            .get_json(self.api_url(&format!("{version}/hosts"))?, false)
            .await?;
        Ok(records.into_iter().map(|h| (h.id, h.name)).collect())
    }

    /// List cluster display names in API order.
    ///
    /// `GET /api/{version}/clusters`
    pub async fn list_clusters(&self, version: &str) -> Result<Vec<String>, Error> {
        let records: Vec<ClusterRecord> = self
            .get_json(self.api_url(&format!("{version}/clusters"))?, false)
            .await?;
        Ok(records.into_iter().map(|c| c.name).collect())
    }

    /// List member host identifiers of one cluster, in API order.
    ///
    /// `GET /api/{version}/clusters/{name}/hosts` with the name
    /// percent-encoded, `:` and `/` kept literal.
    pub async fn cluster_host_ids(&self, version: &str, cluster: &str) -> Result<Vec<String>, Error> {
        let segment = encode_cluster_name(cluster);
        let refs: Vec<HostRef> = self
            .get_json(
                self.api_url(&format!("{version}/clusters/{segment}/hosts"))?,
                false,
            )
            .await?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }

    /// Fetch the full topology of this endpoint.
    ///
    /// Version discovery, then hosts, then clusters with membership,
    /// resolving member ids to hostnames. Member ids without a hosts
    /// entry are skipped with a warning. Cluster and member order are
    /// preserved exactly as the API returned them.
    pub async fn fetch_topology(&self) -> Result<EndpointTopology, Error> {
        let version = self.discover_version().await?;
        let hosts = self.list_hosts(&version).await?;

        let mut topology = EndpointTopology::default();
        for cluster in self.list_clusters(&version).await? {
            let mut members = Vec::new();
            for id in self.cluster_host_ids(&version, &cluster).await? {
                match hosts.get(&id) {
                    Some(name) => members.push(name.clone()),
                    None => warn!(cluster, id, "cluster member not in hosts listing, skipping"),
                }
            }
            topology.clusters.push(ClusterHosts {
                name: cluster,
                hosts: members,
            });
        }
        Ok(topology)
    }
}

/// Percent-encode a cluster display name for use as a path segment.
fn encode_cluster_name(name: &str) -> String {
    utf8_percent_encode(name, CLUSTER_SEGMENT).to_string()
}

/// Cap a response body for inclusion in an error message.
///
/// The cut point backs off to the nearest character boundary so a
/// multi-byte response never splits mid-character.
fn preview(body: &str) -> &str {
    const MAX_BYTES: usize = 200;
    if body.len() <= MAX_BYTES {
        return body;
    }
    let mut end = MAX_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::{encode_cluster_name, preview};

    #[test]
    fn spaces_are_encoded() {
        assert_eq!(encode_cluster_name("Prod East"), "Prod%20East");
    }

    #[test]
    fn colon_and_slash_stay_literal() {
        assert_eq!(encode_cluster_name("dc:1/rack2"), "dc:1/rack2");
    }

    #[test]
    fn unreserved_passthrough() {
        assert_eq!(encode_cluster_name("Prod_2.east-1~x"), "Prod_2.east-1~x");
    }

    #[test]
    fn reserved_punctuation_is_encoded() {
        assert_eq!(encode_cluster_name("a&b?c"), "a%26b%3Fc");
    }

    #[test]
    fn short_body_passes_through_preview() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn preview_cuts_ascii_at_the_cap() {
        let body = "x".repeat(300);
        assert_eq!(preview(&body).len(), 200);
    }

    #[test]
    fn preview_backs_off_to_a_character_boundary() {
        // 'é' is two bytes and straddles the 200-byte cap.
        let body = format!("{}é tail", "x".repeat(199));
        let cut = preview(&body);
        assert_eq!(cut, "x".repeat(199));
    }
}
