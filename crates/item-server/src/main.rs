//! Item Tracker Server
//!
//! HTTP front end for the item coordinator. PostgreSQL holds the items,
//! Redis (or an in-process map) caches their titles and Elasticsearch
//! serves full-text search.

mod handlers;
mod settings;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use item_core::ports::{SearchIndex, TitleCache};
use item_core::Coordinator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::CacheBackend;
use storage::{Database, ElasticIndex, MemoryTitleCache, RedisTitleCache};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Item Tracker Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = settings::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, cache={:?}, index={}",
        config.bind_address, config.cache_backend, config.search_index
    );

    let durable = Arc::new(
        Database::new(&config.database_url, config.database_max_connections)
            .await
            .context("Failed to initialize database")?,
    );

    let cache: Arc<dyn TitleCache> = match config.cache_backend {
        CacheBackend::Redis => Arc::new(
            RedisTitleCache::new(&config.redis_url)
                .await
                .context("Failed to initialize Redis cache")?,
        ),
        CacheBackend::Memory => {
            info!("Using in-memory title cache");
            Arc::new(MemoryTitleCache::new())
        }
    };

    let index: Arc<dyn SearchIndex> = Arc::new(
        ElasticIndex::new(
            &config.search_url,
            config.search_refresh,
            config.store_timeout(),
        )
        .context("Failed to initialize search client")?,
    );

    let coordinator = Coordinator::new(durable, cache, index)
        .with_cache_key(config.cache_key.clone())
        .with_index_name(config.search_index.clone())
        .with_call_timeout(config.store_timeout());
    coordinator
        .bootstrap()
        .await
        .context("Failed to prepare stores")?;

    let state = AppState {
        coordinator: Arc::new(coordinator),
    };
    let app = router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/items",
            get(handlers::items::list).post(handlers::items::create),
        )
        .route("/search", post(handlers::search::search))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod test_support {
    use super::{router, AppState};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use item_core::testing::{FakeDurableStore, FakeSearchIndex, FakeTitleCache};
    use item_core::Coordinator;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Fake stores shared by every router built from them
    pub struct Stores {
        pub durable: Arc<FakeDurableStore>,
        pub cache: Arc<FakeTitleCache>,
        pub index: Arc<FakeSearchIndex>,
    }

    impl Stores {
        pub fn new() -> Self {
            Self {
                durable: Arc::new(FakeDurableStore::new()),
                cache: Arc::new(FakeTitleCache::new()),
                index: Arc::new(FakeSearchIndex::new()),
            }
        }

        pub fn app(&self) -> Router {
            let coordinator =
                Coordinator::new(self.durable.clone(), self.cache.clone(), self.index.clone());
            router(AppState {
                coordinator: Arc::new(coordinator),
            })
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    pub async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{get, Stores};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(Stores::new().app(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
