// The merged inventory document.
//
// Group names map to member hostnames, plus the reserved `_meta`
// entry carrying per-host variables (empty in this tool, but the slot
// is part of the contract with the orchestrator). Groups live in a
// BTreeMap so serialized output is key-sorted and byte-deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Group name reserved for inventory metadata, never a cluster key.
pub const META_KEY: &str = "_meta";

/// One inventory group: the member hostnames of a cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub hosts: Vec<String>,
}

/// The reserved `_meta` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    /// Per-host variables. Always empty here; consumers may extend.
    pub hostvars: serde_json::Map<String, serde_json::Value>,
}

/// The merged group → hosts document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inventory {
    #[serde(flatten)]
    groups: BTreeMap<String, Group>,

    #[serde(rename = "_meta")]
    meta: Meta,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cluster, normalizing the display name and resolving
    /// collisions. Returns the final group key.
    ///
    /// Spaces become hyphens; a taken (or reserved) name gets `-2`
    /// appended, then `-3`, `-4`, ... until a free key is found. The
    /// result is injective over insertion order, so repeated builds
    /// from identical responses produce identical keys.
    pub fn add_cluster(&mut self, display_name: &str, hosts: Vec<String>) -> String {
        let base = display_name.replace(' ', "-");
        let mut key = base.clone();
        let mut suffix = 2u64;
        while key == META_KEY || self.groups.contains_key(&key) {
            key = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.groups.insert(key.clone(), Group { hosts });
        key
    }

    /// Look up a group by its final key.
    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    /// Group keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Serialize to the indented, key-sorted document the
    /// orchestrator consumes.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
