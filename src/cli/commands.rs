use crate::{
    api::{build_router, AppContext},
    dispatcher::Dispatcher,
    logging::{init_logging, LogConfig},
    runtime_config::RuntimeConfig,
    server::{AppService, HttpServer},
    store::{MemoryStore, Seed},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface of the jukebox service.
#[derive(Parser, Debug)]
#[command(name = "jukebox", version)]
#[command(about = "Music catalog HTTP service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the catalog API
    Serve {
        /// Address and port to bind
        #[arg(long, env = "JUKEBOX_ADDR", default_value = "0.0.0.0:8080")]
        addr: String,

        /// API versions to mount the operation set under (comma-separated)
        #[arg(
            long,
            env = "JUKEBOX_API_VERSION",
            value_delimiter = ',',
            default_value = "1"
        )]
        api_version: Vec<u32>,

        /// TOML file to load the catalog from; empty catalog when omitted
        #[arg(long, env = "JUKEBOX_SEED")]
        seed: Option<PathBuf>,

        /// Indent JSON responses
        #[arg(long, env = "JUKEBOX_PRETTY_JSON")]
        pretty: bool,
    },
    /// Print the versioned route table and exit
    Routes {
        #[arg(
            long,
            env = "JUKEBOX_API_VERSION",
            value_delimiter = ',',
            default_value = "1"
        )]
        api_version: Vec<u32>,
    },
}

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// Startup failures: logging, seed loading, route registration or binding.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run an already-parsed command line.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            api_version,
            seed,
            pretty,
        } => serve(&addr, &api_version, seed.as_deref(), pretty),
        Commands::Routes { api_version } => {
            for line in route_table(&api_version)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn load_store(seed: Option<&Path>) -> Result<MemoryStore> {
    let Some(path) = seed else {
        return Ok(MemoryStore::new());
    };
    let seed = Seed::load(path)?;
    MemoryStore::from_seed(&seed).with_context(|| format!("applying seed {}", path.display()))
}

fn serve(addr: &str, versions: &[u32], seed: Option<&Path>, pretty: bool) -> Result<()> {
    let log_config = LogConfig::from_env();
    init_logging(&log_config)?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();
    info!(stack_size = runtime.stack_size, "Coroutine runtime configured");

    let store = load_store(seed)?;
    store.log_summary();

    let ctx = AppContext::from_memory(store);
    let router = build_router(&ctx, versions)?;
    router.log_summary();

    let dispatcher = Dispatcher::new(Arc::new(router)).with_redaction(log_config.redact_level);
    let service = AppService::new(Arc::new(dispatcher)).with_pretty_json(pretty);

    let handle = HttpServer(service)
        .start(addr)
        .with_context(|| format!("binding {addr}"))?;
    handle
        .join()
        .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))
}

/// One line per route: `METHOD PATH -> operation(params)`.
///
/// # Errors
///
/// Any registration error for the requested versions.
pub fn route_table(versions: &[u32]) -> Result<Vec<String>> {
    let ctx = AppContext::from_memory(MemoryStore::new());
    let router = build_router(&ctx, versions)?;
    Ok(router
        .routes()
        .iter()
        .map(|entry| {
            let params: Vec<String> = entry
                .operation
                .parameters
                .iter()
                .map(|p| {
                    let optional = if p.nullable { "?" } else { "" };
                    format!("{}: {}{optional}", p.name, p.ty)
                })
                .collect();
            format!(
                "{} {} -> {}({})",
                entry.method,
                entry.path,
                entry.operation.name,
                params.join(", ")
            )
        })
        .collect())
}
