use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::{CacheTiers, LocalCache};
use crate::config::AppConfig;
use crate::operations::{OperationRegistry, registry_from_parts};
use crate::{create_product_store, create_shared_cache, routes};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub registry: OperationRegistry,
    pub tiers: CacheTiers,
    pub store_backend: &'static str,
}

pub struct CatalogServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/metrics", get(routes::metrics))
        .route(
            "/api/products",
            get(routes::list_products).post(routes::create_product),
        )
        .route(
            "/api/products/{id}",
            get(routes::get_product)
                .put(routes::update_product)
                .delete(routes::delete_product),
        )
        .with_state(state)
        .layer(middleware::from_fn(crate::middleware::track_metrics))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Connects the store and shared cache, wires the handlers and builds
    /// the router.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be reached or a handler is missing.
    pub async fn build(self) -> anyhow::Result<CatalogServer> {
        crate::metrics::init_metrics();

        let store = create_product_store(&self.config.storage).await?;
        let shared = create_shared_cache(&self.config.redis).await;
        let tiers = CacheTiers::new(Arc::new(LocalCache::new()), shared);
        let store_backend = store.backend_name();
        let registry = registry_from_parts(store, tiers.clone(), &self.config.cache)?;

        let state = AppState {
            registry,
            tiers,
            store_backend,
        };

        Ok(CatalogServer {
            addr: self.addr,
            app: build_app(state, &self.config),
        })
    }
}

impl CatalogServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
