// The inventory builder: per-endpoint session management and merge.
//
// Endpoints are processed strictly in the order supplied, one at a
// time; each endpoint's clusters merge into the shared inventory as
// soon as that endpoint succeeds, so an authentication retry loop on
// a later endpoint can never discard earlier results.

use paddock_api::{ApiClient, Credentials, SessionStore, TransportConfig};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::prompt::CredentialPrompt;

/// Explicit configuration for one build run; nothing is read from the
/// environment inside the builder.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Endpoints in processing order. Order matters: it decides which
    /// cluster keeps its raw name when names collide across managers.
    pub endpoints: Vec<Url>,
    /// Initial username offered to every endpoint.
    pub username: String,
    pub transport: TransportConfig,
}

/// Authentication progress for one endpoint.
///
/// The retry loop is a state machine rather than unstructured looping
/// so its one deliberate oddity is visible in the type: there is no
/// bound on `CredentialRetry` -- the operator retries until success or
/// aborts the process. Fine for an interactive tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    /// Nothing attempted yet; a stored session may exist.
    Unauthenticated,
    /// An attempt (session or credentials) is in flight.
    Authenticating,
    /// The manager rejected us; collect new credentials.
    CredentialRetry,
    /// Topology fetched, session persisted.
    Authenticated,
}

/// Builds the merged inventory across all configured endpoints.
pub struct InventoryBuilder<P> {
    config: BuilderConfig,
    store: SessionStore,
    prompt: P,
}

impl<P: CredentialPrompt> InventoryBuilder<P> {
    pub fn new(config: BuilderConfig, store: SessionStore, prompt: P) -> Self {
        Self {
            config,
            store,
            prompt,
        }
    }

    /// The prompt implementation this builder asks for credentials.
    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Build the inventory, authenticating against each endpoint in
    /// turn.
    pub async fn build(&self) -> Result<Inventory, CoreError> {
        let mut inventory = Inventory::new();
        for endpoint in &self.config.endpoints {
            self.collect_endpoint(endpoint, &mut inventory).await?;
        }
        Ok(inventory)
    }

    /// Fetch one endpoint's topology and merge it, driving the
    /// authentication retry loop until success or a fatal error.
    async fn collect_endpoint(
        &self,
        endpoint: &Url,
        inventory: &mut Inventory,
    ) -> Result<(), CoreError> {
        let host = endpoint.host_str().unwrap_or("unknown").to_string();
        let mut state = AuthState::Unauthenticated;
        let mut username = self.config.username.clone();
        let mut credentials: Option<Credentials> = None;
        let mut rejections = 0u32;

        loop {
            state = match state {
                AuthState::Unauthenticated => AuthState::Authenticating,

                AuthState::Authenticating => {
                    match self.attempt(endpoint, &host, credentials.clone()).await {
                        Ok(topology) => {
                            for cluster in topology.clusters {
                                let key = inventory.add_cluster(&cluster.name, cluster.hosts);
                                debug!(endpoint = %endpoint, cluster = %key, "merged cluster");
                            }
                            AuthState::Authenticated
                        }
                        Err(e) if e.is_authentication() => {
                            // The stored session (or the credentials we
                            // just tried) are no good; make sure the
                            // session file is never reused.
                            self.store.delete(&host);
                            rejections += 1;
                            warn!(endpoint = %endpoint, "authentication rejected ({e})");
                            AuthState::CredentialRetry
                        }
                        Err(e) => return Err(e.into()),
                    }
                }

                AuthState::CredentialRetry => {
                    if rejections > 1 {
                        username = self
                            .prompt
                            .username(&username)
                            .map_err(CoreError::Prompt)?;
                    }
                    let password = self
                        .prompt
                        .password(endpoint, &username)
                        .map_err(CoreError::Prompt)?;
                    credentials = Some(Credentials {
                        username: username.clone(),
                        password,
                    });
                    AuthState::Authenticating
                }

                AuthState::Authenticated => {
                    info!(endpoint = %endpoint, "endpoint inventoried");
                    return Ok(());
                }
            };
        }
    }

    /// One authentication attempt: fresh client (and fresh cookie
    /// jar), stored session restored only when no credentials are in
    /// play, session persisted on success.
    async fn attempt(
        &self,
        endpoint: &Url,
        host: &str,
        credentials: Option<Credentials>,
    ) -> Result<paddock_api::EndpointTopology, paddock_api::Error> {
        let transport = self.config.transport.clone().with_cookie_jar();
        let has_credentials = credentials.is_some();
        let client = ApiClient::new(endpoint.clone(), credentials, &transport)?;

        if !has_credentials {
            if let Some(session) = self.store.load(host) {
                client.restore_session(&session);
            }
        }

        let topology = client.fetch_topology().await?;

        if let Some(session) = client.session() {
            self.store.save(host, &session)?;
        }
        Ok(topology)
    }
}
