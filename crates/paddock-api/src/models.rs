// Wire models for the cluster-manager REST API.
//
// All endpoints speak plain JSON: the version document is an object,
// the listing endpoints return arrays. Unknown fields are ignored so
// newer managers don't break deserialization.

use serde::Deserialize;

/// `GET /api/version` response.
#[derive(Debug, Deserialize)]
pub struct ApiVersion {
    pub version: String,
}

/// One entry of `GET /api/{version}/hosts`.
#[derive(Debug, Deserialize)]
pub struct HostRecord {
    /// Server-assigned host identifier.
    pub id: String,
    /// Display hostname.
    pub name: String,
}

/// One entry of `GET /api/{version}/clusters`.
#[derive(Debug, Deserialize)]
pub struct ClusterRecord {
    /// Display name; not guaranteed unique, even within one manager.
    pub name: String,
}

/// One entry of `GET /api/{version}/clusters/{name}/hosts`.
#[derive(Debug, Deserialize)]
pub struct HostRef {
    pub id: String,
}
