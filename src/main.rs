//! Crop Stress Inference Server
//!
//! HTTP API server exposing a pre-trained crop stress classifier over a
//! single prediction endpoint, plus root and health checks.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cropstress_server::routes;
use cropstress_server::state::{AppState, ServerConfig};

/// Crop Stress Inference Server
#[derive(Parser, Debug)]
#[command(name = "cropstress-server")]
#[command(version)]
#[command(about = "HTTP API server for crop stress prediction")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8001")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Directory containing the model artifacts
    #[arg(long, env = "CROPSTRESS_MODELS_DIR")]
    models_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut config = ServerConfig::default();
    if let Some(models_dir) = cli.models_dir {
        config.models_dir = models_dir;
    }

    info!("Crop Stress Classification API v{}", env!("CARGO_PKG_VERSION"));
    info!("Models dir: {:?}", config.models_dir);

    // Load artifacts before accepting traffic. There is no reload path: a
    // degraded store answers every prediction with a failure body until the
    // process is restarted.
    let state = Arc::new(AppState::new(config));
    if !state.store.is_ready() {
        tracing::warn!(
            "One or more model artifacts failed to load; predictions will \
            return 'Model not loaded' until the process is restarted"
        );
    }

    // Permissive CORS. Wildcards are not allowed together with credentials,
    // so origins/methods/headers mirror the request instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = routes::api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
