mod cli;
mod config;
mod error;
mod prompt;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use paddock_api::SessionStore;
use paddock_core::{BuilderConfig, Inventory, InventoryBuilder, InventoryCache};

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::CliError;
use crate::prompt::TerminalPrompt;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, debug: bool) {
    let filter = match (debug, verbosity) {
        (false, 0) => "warn",
        (false, 1) => "info",
        (true, 0 | 1) | (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::load()?;
    init_tracing(cli.verbose, settings.debug);

    // --host never touches the network or the cache: per-host
    // variables are structurally reserved but always empty here.
    if let Some(ref host) = cli.host {
        tracing::debug!(host, "emitting hostvars");
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({}))?);
        return Ok(());
    }

    let cache = InventoryCache::new(
        config::state_dir().join("inventory.json"),
        settings.cache_ttl(),
    );

    let inventory = if cli.refresh_cache {
        tracing::debug!("forced rebuild requested");
        build_and_cache(&settings, &cache).await?
    } else if cli.list && cache.is_fresh() {
        tracing::debug!("serving inventory from cache");
        cache.read()?
    } else {
        build_and_cache(&settings, &cache).await?
    };

    println!("{}", inventory.to_json_pretty()?);
    Ok(())
}

/// Rebuild the inventory from every configured endpoint and replace
/// the cache.
async fn build_and_cache(
    settings: &Settings,
    cache: &InventoryCache,
) -> Result<Inventory, CliError> {
    let builder = InventoryBuilder::new(
        BuilderConfig {
            endpoints: settings.endpoints()?,
            username: settings.username.clone(),
            transport: settings.transport(),
        },
        SessionStore::new(config::state_dir()),
        TerminalPrompt,
    );

    let inventory = builder.build().await?;
    cache.write(&inventory)?;
    Ok(inventory)
}
