use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use identidock::{
    cache,
    config::{CacheBackend, Config},
    events,
    services::{HttpIdenticonClient, IdenticonService},
    web::{AppState, WebServer},
};

/// How long to wait for queued events to reach the collector on shutdown
const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "identidock")]
#[command(version)]
#[command(about = "Identicon front-end with a cache-aside image store")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Cache store URL (overrides config file)
    #[arg(long, value_name = "URL")]
    cache_url: Option<String>,

    /// Keep images in process memory instead of the cache store
    #[arg(long)]
    memory_cache: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Local log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("identidock={},tower_http=trace", cli.log_level)
    } else {
        format!("identidock={}", cli.log_level)
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()),
    );
    match cli.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }

    let mut config = Config::load_from_file(&cli.config)?;
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(cache_url) = cli.cache_url {
        config.cache.url = cache_url;
    }
    if cli.memory_cache {
        config.cache.backend = CacheBackend::Memory;
    }
    config.validate()?;

    info!("Starting identidock v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Cache: {:?} ({}), generator: {}, collector: {}",
        config.cache.backend,
        config.cache.url,
        config.identicon.base_url,
        if config.event_log.enabled {
            config.event_log.address()
        } else {
            "disabled".to_string()
        }
    );

    let (event_sink, shipper) = events::from_config(&config.event_log);
    let image_cache = cache::from_config(&config.cache)?;
    let generator = Arc::new(HttpIdenticonClient::new(&config.identicon)?);
    let identicons = IdenticonService::new(
        image_cache,
        generator,
        event_sink.clone(),
        config.identicon.size,
    );

    let web_server = WebServer::new(&config, AppState::new(config.clone(), identicons, event_sink))?;

    let (server_ready_tx, server_ready_rx) = tokio::sync::oneshot::channel();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = web_server.serve_with_signal(server_ready_tx).await {
            tracing::error!("Web server failed: {}", e);
        }
    });

    match server_ready_rx.await {
        Ok(Ok(())) => info!("Web server is ready"),
        Ok(Err(bind_error)) => {
            tracing::error!("Failed to bind web server: {}", bind_error);
            return Err(bind_error);
        }
        Err(_) => {
            tracing::error!("Web server task completed without signaling");
            return Err(anyhow::anyhow!("Web server failed to start"));
        }
    }

    if let Err(e) = server_handle.await {
        tracing::error!("Web server task panicked: {}", e);
    }

    // The router, and with it every sink clone, is gone; let the shipper drain
    if let Some(shipper) = shipper {
        match tokio::time::timeout(EVENT_DRAIN_TIMEOUT, shipper).await {
            Ok(Ok(stats)) => info!(
                accepted = stats.accepted,
                delivered = stats.delivered,
                failed = stats.failed,
                dropped = stats.dropped,
                "Event queue drained"
            ),
            Ok(Err(e)) => warn!("Event shipper task failed: {}", e),
            Err(_) => warn!(
                "Gave up on pending events after {}",
                humantime::format_duration(EVENT_DRAIN_TIMEOUT)
            ),
        }
    }

    info!("Shutdown complete");
    Ok(())
}
