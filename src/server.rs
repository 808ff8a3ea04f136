pub mod errors;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use color_eyre::eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::replay::ReplayEngine;
use handlers::{apdu, events, health, status, transcript};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<ReplayEngine>,
    pub transcript_dir: Arc<PathBuf>,
}

/// HTTP endpoint through which a test harness drives the emulated card.
pub struct Server {
    router: Router,
    listener: TcpListener,
    port: u16,
}

impl Server {
    /// Binds the listener and builds the router. Port `0` picks a free port.
    pub async fn new(engine: Arc<ReplayEngine>, config: &Config) -> Result<Self> {
        let trace_layer =
            TraceLayer::new_for_http().make_span_with(|request: &'_ axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("request", method = %request.method(), uri)
            });

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

        let state = AppState {
            engine,
            transcript_dir: Arc::new(config.replay.transcript_dir.clone()),
        };

        let router = Router::new()
            .route("/health", get(health::health_check))
            .route("/transcript", post(transcript::load_inline))
            .route("/transcript/file", post(transcript::load_file))
            .route("/apdu", post(apdu::apdu_handler))
            .route("/deactivate", post(events::deactivate_handler))
            .route("/polling-frames", post(events::polling_frames_handler))
            .route("/log", get(status::log_handler))
            .route("/status", get(status::status_handler))
            .layer(cors_layer)
            .layer(trace_layer)
            .with_state(state);

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .wrap_err_with(|| format!("Binding TCP listener on {addr}"))?;
        let port = listener
            .local_addr()
            .context("Getting local address")?
            .port();

        Ok(Self {
            router,
            listener,
            port,
        })
    }

    /// Port the server is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves requests until the process is stopped.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Replay server listening on port {}", self.port);
        axum::serve(self.listener, self.router)
            .await
            .context("Running server")
    }
}
