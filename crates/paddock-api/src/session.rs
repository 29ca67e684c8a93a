// On-disk session persistence.
//
// One file per endpoint hostname so multiple managers never collide.
// The file holds the session cookies captured from the client's jar;
// it encodes authentication material, so it is written 0600 and
// replaced atomically (temp file + rename). A missing or unreadable
// file is simply "no session" -- the caller falls back to fresh
// authentication.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;

/// Serialized cookie state for one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// `name=value` pairs in the order the jar reported them.
    pub cookies: Vec<String>,
}

impl Session {
    /// Capture the current session cookies from a jar.
    ///
    /// Returns `None` when the jar holds nothing for the endpoint
    /// (e.g. the manager never set a session cookie).
    pub fn from_jar(jar: &Jar, endpoint: &Url) -> Option<Self> {
        let header = jar.cookies(endpoint)?;
        let header = header.to_str().ok()?;
        let cookies: Vec<String> = header
            .split("; ")
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        if cookies.is_empty() {
            return None;
        }
        Some(Self { cookies })
    }

    /// Seed a fresh jar with this session's cookies.
    pub fn apply(&self, jar: &Arc<Jar>, endpoint: &Url) {
        for cookie in &self.cookies {
            jar.add_cookie_str(cookie, endpoint);
        }
    }
}

/// Loads and saves [`Session`]s under a per-user state directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, host: &str) -> PathBuf {
        self.dir.join(format!("session-{host}.json"))
    }

    /// Load the stored session for an endpoint hostname.
    ///
    /// Any failure (missing file, unreadable, unparseable) is treated
    /// as "absent" -- never an error.
    pub fn load(&self, host: &str) -> Option<Session> {
        let path = self.path(host);
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => {
                debug!(host, "restored session from {}", path.display());
                Some(session)
            }
            Err(e) => {
                warn!(host, "discarding unparseable session file: {e}");
                None
            }
        }
    }

    /// Persist a session for an endpoint hostname.
    pub fn save(&self, host: &str, session: &Session) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(host);
        let tmp = path.with_extension("json.tmp");

        write_private(&tmp, &serde_json::to_vec_pretty(session).map_err(|e| {
            Error::Deserialization {
                url: path.display().to_string(),
                message: e.to_string(),
            }
        })?)?;
        fs::rename(&tmp, &path)?;

        debug!(host, "saved session to {}", path.display());
        Ok(())
    }

    /// Remove the stored session for an endpoint hostname.
    ///
    /// Best-effort: called when the manager rejected the session, so a
    /// missing file is already the desired state.
    pub fn delete(&self, host: &str) {
        let path = self.path(host);
        if fs::remove_file(&path).is_ok() {
            debug!(host, "deleted stale session {}", path.display());
        }
    }
}

/// Write `contents` to `path` readable by the owning user only.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sample() -> Session {
        Session {
            cookies: vec!["JSESSIONID=abc123".into()],
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.save("mgr.example.com", &sample()).unwrap();
        let loaded = store.load("mgr.example.com").unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn load_missing_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        assert!(store.load("nowhere.example.com").is_none());
    }

    #[test]
    fn load_corrupt_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        fs::write(dir.path().join("session-bad.example.com.json"), "{not json").unwrap();
        assert!(store.load("bad.example.com").is_none());
    }

    #[test]
    fn sessions_for_different_hosts_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        let a = Session {
            cookies: vec!["sid=a".into()],
        };
        let b = Session {
            cookies: vec!["sid=b".into()],
        };
        store.save("a.example.com", &a).unwrap();
        store.save("b.example.com", &b).unwrap();

        assert_eq!(store.load("a.example.com").unwrap(), a);
        assert_eq!(store.load("b.example.com").unwrap(), b);
    }

    #[test]
    fn delete_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.save("mgr.example.com", &sample()).unwrap();
        store.delete("mgr.example.com");

        assert!(store.load("mgr.example.com").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        store.save("mgr.example.com", &sample()).unwrap();

        let meta = fs::metadata(dir.path().join("session-mgr.example.com.json")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn jar_roundtrip() {
        let url: Url = "https://mgr.example.com".parse().unwrap();
        let jar = Arc::new(Jar::default());
        sample().apply(&jar, &url);

        let captured = Session::from_jar(&jar, &url).unwrap();
        assert_eq!(captured.cookies, vec!["JSESSIONID=abc123".to_string()]);
    }
}
