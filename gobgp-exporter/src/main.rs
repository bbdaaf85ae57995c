//! Prometheus exporter for GoBGP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use gobgp_exporter::config::LogFormat;
use gobgp_exporter::{Exporter, ExporterConfig, ExporterError, HttpServer, docs};

/// Prometheus exporter for GoBGP.
#[derive(Parser, Debug)]
#[command(name = "gobgp-exporter")]
#[command(about = "Export GoBGP router, peer and RIB state as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Path under which to expose metrics (overrides config).
    #[arg(long)]
    metrics_path: Option<String>,

    /// gRPC API address of the GoBGP server (overrides config).
    #[arg(long)]
    gobgp_address: Option<String>,

    /// Minimum interval between collections, in seconds (overrides config).
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Timeout on GoBGP requests, in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Access token for the exporter itself; repeatable (replaces config tokens).
    #[arg(long)]
    auth_token: Vec<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Print the table of exported metrics and exit.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.metrics {
        print!("{}", docs::metrics_table());
        return Ok(());
    }

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // CLI overrides
    if let Some(listen) = args.listen {
        config.http.listen = listen;
    }
    if let Some(path) = args.metrics_path {
        config.http.path = path;
    }
    if let Some(address) = args.gobgp_address {
        config.gobgp.address = address;
    }
    if let Some(interval) = args.poll_interval {
        config.gobgp.poll_interval_secs = interval;
    }
    if let Some(timeout) = args.timeout {
        config.gobgp.timeout_secs = timeout;
    }
    if !args.auth_token.is_empty() {
        config.auth.tokens = args.auth_token;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_logging(&config)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting GoBGP exporter");

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let exporter = Arc::new(Exporter::new(&config).await?);

    let listen_addr: SocketAddr = config
        .http
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    let http_server = HttpServer::new(exporter.clone(), listen_addr, config.http.path.clone());

    // Start HTTP server
    let http_shutdown = shutdown_rx.clone();
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(http_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for tasks to complete
    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    for node in exporter.nodes() {
        info!(
            address = %node.address(),
            failed_requests = node.errors(),
            "Final statistics"
        );
    }

    info!("Exporter stopped");
    Ok(())
}

fn init_logging(config: &ExporterConfig) -> Result<(), ExporterError> {
    let log_level: Level = config.logging.level.parse().unwrap_or(Level::INFO);
    let directive = |d: String| {
        d.parse::<Directive>()
            .map_err(|e| ExporterError::Logging(e.to_string()))
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(directive(format!("gobgp_exporter={}", log_level))?)
        .add_directive(directive(format!("gobgp_api={}", log_level))?)
        .add_directive(directive(format!("h2={}", Level::WARN))?);

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

async fn terminate() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        std::future::pending::<()>().await;
    }
}
