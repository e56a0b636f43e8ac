//! Web layer
//!
//! Thin handlers over [`IdenticonService`] plus the request hooks that turn
//! every routed request into start/completion events.
//!
//! # Routes
//!
//! - `GET /` and `POST /`: the name form and its identicon
//! - `GET /monster/{name}`: the PNG for `name`
//! - anything else: `404 Page not found`

use anyhow::Result;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::{config::Config, events::EventSink, services::IdenticonService};

pub mod handlers;
pub mod middleware;
pub mod responses;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identicons: IdenticonService,
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(config: Config, identicons: IdenticonService, events: Arc<dyn EventSink>) -> Self {
        Self {
            config: Arc::new(config),
            identicons,
            events,
        }
    }
}

/// Build the application router.
///
/// Hooks sit outside the panic guard so a panicking handler is still
/// reported as a completed 500.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::home::show_form).post(handlers::home::submit_name),
        )
        .route("/monster/{name}", get(handlers::monster::get_identicon))
        .fallback(handlers::errors::not_found)
        .layer(CatchPanicLayer::custom(responses::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_hooks_middleware,
        ))
        .with_state(state)
}

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, state: AppState) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        Ok(Self {
            app: create_router(state),
            addr,
        })
    }

    /// Serve until SIGTERM/SIGINT, reporting the bind outcome on `ready_signal`
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
    ) -> Result<()> {
        let listener = match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => listener,
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                return Err(anyhow::anyhow!("{}", bind_err_msg));
            }
        };

        let _ = ready_signal.send(Ok(()));
        tracing::info!("Listening on http://{}", self.addr);

        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                    }
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C: {}", e);
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
