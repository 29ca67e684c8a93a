// paddock-api: async client for the cluster-manager REST API

pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{ApiClient, ClusterHosts, Credentials, EndpointTopology};
pub use error::Error;
pub use session::{Session, SessionStore};
pub use transport::{TlsMode, TransportConfig};
