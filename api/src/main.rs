use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use dotenv::dotenv;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{Env, ServerConfig, StorageBackend},
    store::{MemoryStore, PgStore, Store},
};

mod comments;
mod config;
mod error;
mod json;
mod models;
mod payment;
mod posts;
mod schema;
mod store;
mod users;
mod utils;

#[cfg(test)]
mod test_utils;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Clone)]
pub struct App {
    pub store: Arc<dyn Store>,
    pub http: reqwest::Client,
    pub config: Arc<ServerConfig>,
}

#[tokio::main]
async fn main() -> Result<(), eyre::Error> {
    dotenv().ok();

    let env = Env::from_env();
    init_tracing(&env);

    let config = ServerConfig::new_from_env();

    let store: Arc<dyn Store> = match (&config.storage, &config.database) {
        (StorageBackend::Postgres, Some(db)) => {
            let store = PgStore::connect(&db.url, db.pool_size)?;
            store.ping().await?;
            tracing::info!("Pinged the database, connection is healthy");
            Arc::new(store)
        }
        _ => {
            tracing::warn!("Using the in-memory store, data will be lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let cors = cors_layer(config.cors_allowed_origins.as_deref());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let ctx = App {
        store,
        http: reqwest::Client::new(),
        config: Arc::new(config),
    };

    let app = router(ctx)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("TalkRoute server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

pub fn router(ctx: App) -> Router {
    Router::new()
        .route("/", get(|| async { "TalkRoute server is running..." }))
        .merge(posts::routes::route())
        .merge(comments::routes::route())
        .merge(users::routes::route())
        .merge(payment::route())
        .with_state(ctx)
}

fn init_tracing(env: &Env) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("talkroute=debug,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        Env::Production => registry.with(fmt::layer().json()).init(),
        Env::Dev | Env::Staging => registry.with(fmt::layer()).init(),
    }
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
        None => layer.allow_origin(Any),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(?e, "Failed to install signal handler");
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
