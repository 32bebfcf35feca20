use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::domain::ports::ScoreStore;
use crate::frameworks::{config, db, seed};
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, InMemoryScoreStore, PostgresScoreStore};
use crate::use_cases::feed::ScoreFeed;

/// One-time process setup: environment, logging, panic reporting. Call this
/// before anything else in main.
pub fn init_runtime() {
    // Load .env if present; ignore absence.
    let _ = dotenvy::dotenv();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!(%info, "panic\n{backtrace}");
    }));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if use_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Binds on the configured port and serves until the process exits.
pub async fn run_with_config() -> io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config::http_port()));
    let listener = TcpListener::bind(addr).await?;
    run(listener).await
}

/// Serves on an already-bound listener. Tests bind to port 0 and hand the
/// listener over to get an ephemeral port.
pub async fn run(listener: TcpListener) -> io::Result<()> {
    let state = build_state().await;
    let app = routes::app(state).layer(cors_layer());
    info!(addr = %listener.local_addr()?, "score server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn build_state() -> AppState {
    let feed = Arc::new(ScoreFeed::new(config::FEED_CHANNEL_CAPACITY));
    let store: Arc<dyn ScoreStore> = match config::database_url() {
        Some(url) => match init_postgres(&url).await {
            Ok(store) => store,
            Err(error) => {
                warn!(%error, "database unavailable, falling back to in-memory store");
                seeded_memory()
            }
        },
        None => {
            info!("DATABASE_URL not set, using seeded in-memory store");
            seeded_memory()
        }
    };
    AppState { store, feed }
}

async fn init_postgres(url: &str) -> Result<Arc<dyn ScoreStore>, String> {
    let pool = db::connect(url).await.map_err(|e| e.to_string())?;
    db::run_migrations(&pool).await.map_err(|e| e.to_string())?;
    info!("using postgres score store");
    Ok(Arc::new(PostgresScoreStore::new(pool)))
}

fn seeded_memory() -> Arc<dyn ScoreStore> {
    Arc::new(InMemoryScoreStore::with_seed(seed::demo_scores(Utc::now())))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::cors_allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
