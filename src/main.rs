use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod app;
mod clipboard;
mod theme;
mod ui;

use app::{App, AppEvent};
use newshub::config::Config;
use newshub::feed::{ClientSettings, FeedSession, HeadlineClient};
use newshub::proxy::{self, ProxyState, UpstreamClient, UpstreamConfig};
use newshub::storage::LocalStore;

const DEFAULT_LOG_FILTER: &str = "newshub=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(
    name = "newshub",
    about = "Categorized news headlines: a key-holding proxy and a terminal reader"
)]
struct Args {
    /// Config file (default: ~/.config/newshub/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the headline proxy
    Serve {
        /// Listen port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Browse headlines in the terminal
    Browse {
        /// Start in this category instead of the saved one
        #[arg(long)]
        category: Option<String>,

        /// Directory for bookmarks and preferences
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },
    /// Delete all bookmarks, history, and preferences
    ClearData {
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },
}

/// Create the config directory with user-only permissions.
fn ensure_config_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory '{}'", dir.display()))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(dir, perms) {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to read config directory metadata");
            }
        }
    }
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log to stderr, or to `<config dir>/newshub.log` while the TUI owns the
/// terminal.
fn init_tracing(command: &Command) -> Result<()> {
    match command {
        Command::Browse { .. } => {
            let dir = Config::config_dir();
            ensure_config_dir(&dir)?;
            let path = dir.join("newshub.log");
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Command::Serve { .. } | Command::ClearData { .. } => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.command)?;

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;
    config
        .apply_env()
        .context("Invalid configuration in environment")?;
    tracing::debug!(config = ?config, "Effective configuration");

    match args.command {
        Command::Serve { port } => serve(config, port).await,
        Command::Browse { category, data_dir } => browse(config, category, data_dir).await,
        Command::ClearData { data_dir } => clear_data(&config, data_dir),
    }
}

async fn serve(config: Config, port: Option<u16>) -> Result<()> {
    let upstream = UpstreamClient::new(UpstreamConfig {
        base_url: config.upstream_base_url.clone(),
        api_key: config.gnews_api_key.clone().map(SecretString::from),
        timeout: config.request_timeout(),
    })
    .context("Invalid upstream configuration")?;

    if !upstream.has_api_key() {
        tracing::warn!("GNEWS_API_KEY is not set; headline requests will return 500");
    }

    let addr = format!("{}:{}", config.bind_address, port.unwrap_or(config.port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    proxy::serve(listener, ProxyState::new(upstream), shutdown_signal())
        .await
        .context("Proxy server failed")?;
    tracing::info!("Proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

fn open_store(config: &Config, data_dir: Option<PathBuf>) -> Result<LocalStore> {
    let dir = data_dir.unwrap_or_else(|| config.data_dir());
    LocalStore::open(&dir)
        .with_context(|| format!("Failed to open data directory '{}'", dir.display()))
}

async fn browse(config: Config, category: Option<String>, data_dir: Option<PathBuf>) -> Result<()> {
    let store = open_store(&config, data_dir)?;
    let client = HeadlineClient::new(ClientSettings {
        backend_url: config.backend_url.clone(),
        language: config.language.clone(),
        country: config.country.clone(),
        page_size: config.page_size,
        timeout: config.request_timeout(),
    })
    .with_context(|| format!("Invalid backend URL '{}'", config.backend_url))?;

    let session = FeedSession::restore(Arc::new(client), store, category.as_deref());
    let mut app = App::new(session);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    ui::run(&mut app, event_tx, event_rx).await
}

fn clear_data(config: &Config, data_dir: Option<PathBuf>) -> Result<()> {
    let store = open_store(config, data_dir)?;
    if store.clear_all_data() {
        println!("All NewsHub data cleared.");
        Ok(())
    } else {
        anyhow::bail!("Failed to clear some data; see log for details")
    }
}
