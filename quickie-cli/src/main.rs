//! CLI entry point for quickie

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use quickie_core::cache;
use quickie_core::config::{CacheBackend, Config, ConfigLoader, CorsMode};
use quickie_core::logging::init_logging;
use quickie_core::session::Role;
use quickie_providers::GeminiClient;
use quickie_server::state::HistoryResponse;
use quickie_server::{run_server, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::client::ApiClient;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
const STATUS_PROBE_KEY: &str = "quickie:status-probe";

#[derive(Parser)]
#[command(name = "quickie")]
#[command(about = "Chat backend that proxies prompts to Gemini and keeps per-session history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config.json to the configuration directory
    Init {
        /// Overwrite an existing config.json
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Bind address, overrides server.host
        #[arg(long)]
        host: Option<String>,
        /// Listen port, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one prompt to a running server
    Chat {
        /// Prompt text
        #[arg(short, long)]
        message: String,
        /// Existing session token; a new one is issued when omitted
        #[arg(short, long)]
        session: Option<String>,
        /// Base URL of the server
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Print a session's stored history from a running server
    History {
        /// Session token
        #[arg(short, long)]
        session: String,
        /// Base URL of the server
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Show the effective configuration and probe the cache
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };

    if let Commands::Init { force } = &cli.command {
        return run_init(&loader, *force);
    }

    let config = loader.load()?;
    let _guard = init_logging(&config.logging);
    info!(config_dir = %loader.config_dir().display(), "Loaded configuration");

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Serve { host, port } => run_serve(config, host, port).await,
        Commands::Chat {
            message,
            session,
            server,
        } => run_chat(&config, &server, &message, session.as_deref()).await,
        Commands::History { session, server } => run_history(&config, &server, &session).await,
        Commands::Status => run_status(&loader, &config).await,
    }
}

fn run_init(loader: &ConfigLoader, force: bool) -> Result<()> {
    let path = loader.config_dir().join("config.json");
    if path.exists() && !force {
        println!(
            "{} {} already exists, use --force to overwrite",
            style("!").yellow(),
            path.display()
        );
        return Ok(());
    }

    loader.save(&Config::default())?;
    println!("{} Wrote {}", style("✓").green(), path.display());
    println!("  Set GEMINI_API_KEY (or model.api_key) before running `quickie serve`.");
    Ok(())
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let bind = format!("{}:{}", config.server.host, config.server.port);
    let addr = tokio::net::lookup_host(&bind)
        .await
        .with_context(|| format!("invalid bind address {}", bind))?
        .next()
        .with_context(|| format!("no address resolved for {}", bind))?;

    let model = Arc::new(GeminiClient::from_config(&config.model)?);
    let cache = cache::from_config(&config.cache)?;

    if config.cache.backend == CacheBackend::Memory {
        warn!("Using in-process cache, session history is lost on restart");
    }
    if config.cors.mode == CorsMode::Permissive {
        warn!("CORS is permissive, any origin may call the API");
    }

    info!(
        model = %config.model.model,
        cache = ?config.cache.backend,
        "Starting quickie server"
    );

    let state = AppState::new(config, cache, model);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutting down...");
        let _ = shutdown_tx.send(());
    });

    run_server(state, addr, shutdown_rx).await
}

async fn run_chat(
    config: &Config,
    server: &str,
    message: &str,
    session: Option<&str>,
) -> Result<()> {
    let client = ApiClient::new(server, config.session.header_name.clone());
    let reply = client.chat(message, session).await?;

    println!("{}", reply.response);
    println!();
    println!("{} {}", style("session:").dim(), reply.session_id);
    Ok(())
}

async fn run_history(config: &Config, server: &str, session: &str) -> Result<()> {
    let client = ApiClient::new(server, config.session.header_name.clone());

    match client.history(session).await? {
        HistoryResponse::Found { history } => {
            for turn in history {
                let role = style(format!("{}:", turn.role));
                let role = match turn.role {
                    Role::User => role.cyan().bold(),
                    Role::Assistant => role.green().bold(),
                };
                println!("{} {}", role, turn.text);
            }
        }
        HistoryResponse::Empty { message } => println!("{}", style(message).dim()),
    }
    Ok(())
}

async fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    println!("{}", style("Quickie Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    match config.cors.mode {
        CorsMode::Permissive => println!("  CORS: {}", style("permissive").yellow()),
        CorsMode::Restrictive => println!("  CORS: restrictive ({})", config.cors.allowed_origin),
    }
    println!("  Session TTL: {}s", config.session.ttl_secs);
    println!();

    println!("{}", style("Model:").bold());
    println!("  Model: {}", config.model.model);
    println!("  API base: {}", config.model.api_base);
    let key_status = if config.model.api_key.is_empty() {
        style("not configured").red()
    } else {
        style("configured").green()
    };
    println!("  API key: {}", key_status);
    println!();

    println!("{}", style("Cache:").bold());
    match config.cache.backend {
        CacheBackend::Memory => println!("  Backend: memory"),
        CacheBackend::Redis => println!(
            "  Backend: redis ({}:{}/{})",
            config.cache.host, config.cache.port, config.cache.db
        ),
    }
    let store = cache::from_config(&config.cache)?;
    let reachability = match store.get(STATUS_PROBE_KEY).await {
        Ok(_) => style("reachable".to_string()).green(),
        Err(e) => style(format!("unreachable ({})", e)).red(),
    };
    println!("  Status: {}", reachability);

    Ok(())
}
