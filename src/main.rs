//! Wellshift daemon
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (neutral scoring until a model is configured)
//! wellshift
//!
//! # Use a hosted model
//! WELLSHIFT_SCORER_TOKEN=hf_xxx wellshift
//!
//! # Use a self-hosted classifier
//! wellshift --scorer-endpoint http://localhost:9000/classify --http-port 8000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wellshift::api::{create_router, AppState};
use wellshift::{CheckinService, CheckinStore, Config, ScorerHandle};

#[derive(Parser, Debug)]
#[command(name = "wellshift")]
#[command(about = "Mood check-in service with personal-baseline anomaly detection")]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "WELLSHIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(short, long, env = "WELLSHIFT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, env = "WELLSHIFT_HTTP_PORT")]
    http_port: Option<u16>,

    /// Text-classification endpoint
    #[arg(long, env = "WELLSHIFT_SCORER_ENDPOINT")]
    scorer_endpoint: Option<String>,

    /// Bearer token for the classification endpoint
    #[arg(long, env = "WELLSHIFT_SCORER_TOKEN", hide_env_values = true)]
    scorer_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wellshift=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load config
    let mut config = Config::resolve(cli.config.as_deref(), cli.data_dir.as_deref())
        .context("loading config")?;

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.server.http_port = port;
    }
    if let Some(endpoint) = cli.scorer_endpoint {
        config.scorer.endpoint = Some(endpoint);
    }
    if let Some(token) = cli.scorer_token {
        config.scorer.api_token = Some(token);
    }

    info!(
        data_dir = %config.storage.data_dir.display(),
        http_port = config.server.http_port,
        baseline_window = config.detection.baseline_window,
        "Starting wellshift"
    );

    std::fs::create_dir_all(&config.storage.data_dir)
        .with_context(|| format!("creating {}", config.storage.data_dir.display()))?;

    // Save default config if it doesn't exist
    let config_path = config.config_path();
    if cli.config.is_none() && !config_path.exists() {
        // Tokens stay in the environment, not on disk
        let mut on_disk = config.clone();
        on_disk.scorer.api_token = None;
        on_disk.save(&config_path)?;
        info!(path = %config_path.display(), "Created default config");
    }

    // Sentiment model handle, created once and shared by all requests
    let scorer = ScorerHandle::from_config(&config.scorer);
    match scorer.model() {
        Some(model) => info!(model, "Sentiment model configured"),
        None => warn!("No sentiment model configured; check-ins will score neutral"),
    }

    let store = CheckinStore::open(&config.database_path())?;
    let service = CheckinService::from_config(scorer, store, &config);
    let app = create_router(Arc::new(AppState::new(service)), &config.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.http_port)
        .parse()
        .context("parsing bind address")?;

    info!("HTTP API available at http://{}", addr);
    info!("Endpoints:");
    info!("  POST /checkin   - Submit a check-in");
    info!("  GET  /timeline  - List check-ins");
    info!("  GET  /health    - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
