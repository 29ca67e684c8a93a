//! Clap derive structures for the `paddock` binary.
//!
//! The orchestrator's dynamic-inventory contract drives the surface:
//! exactly one of `--list`, `--refresh-cache`, or `--host` per
//! invocation.

use clap::{ArgGroup, Parser};

/// paddock -- dynamic inventory for cluster-manager endpoints
#[derive(Debug, Parser)]
#[command(
    name = "paddock",
    version,
    about = "Emit a merged cluster/host inventory from one or more cluster managers",
    long_about = "Discovers clusters and their member hosts from one or more \
        cluster-management servers and emits them as a dynamic inventory \
        document.\n\n\
        Endpoints and credentials come from config.toml or PADDOCK_* \
        environment variables; authenticated sessions and the inventory \
        cache persist under the per-user state directory.",
    group(ArgGroup::new("mode").required(true))
)]
pub struct Cli {
    /// Print the merged inventory (served from cache while fresh)
    #[arg(long, group = "mode")]
    pub list: bool,

    /// Rebuild the inventory, ignoring any cached copy
    #[arg(long, group = "mode")]
    pub refresh_cache: bool,

    /// Print variables for a single host (always an empty object)
    #[arg(long, value_name = "HOSTNAME", group = "mode")]
    pub host: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
