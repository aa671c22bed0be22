//! HTTP service: `POST /process-image` plus liveness/readiness probes.
//!
//! The [`Verifier`] is built once and shared through [`AppState`]; each
//! request runs on its own task and owns its decoded image.

pub mod error;
pub mod handlers;

use crate::config::ServerConfig;
use crate::verify::Verifier;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// State shared by all routes.
#[derive(Debug, Clone)]
pub struct AppState {
    pub verifier: Arc<Verifier>,
}

/// Build the router with all middleware attached.
pub fn build_router(verifier: Arc<Verifier>, config: &ServerConfig) -> Router {
    let state = AppState { verifier };

    let mut app = Router::new()
        .route("/process-image", post(handlers::process_image))
        .route("/healthz", get(handlers::healthz))
        .route("/livez", get(handlers::livez))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http());

    if config.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Serve on an already-bound listener until the server stops or Ctrl-C.
pub async fn serve_on(
    listener: TcpListener,
    verifier: Arc<Verifier>,
    config: &ServerConfig,
) -> std::io::Result<()> {
    let app = build_router(verifier, config);
    tokio::select! {
        r = axum::serve(listener, app) => {
            if let Err(ref e) = r {
                warn!("server ended unexpectedly: {:?}", e);
            }
            r
        },
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl+c interrupt, closing server");
            Ok(())
        }
    }
}

/// Bind `config.bind_addr()` and serve.
pub async fn serve(verifier: Arc<Verifier>, config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);
    serve_on(listener, verifier, config).await
}
