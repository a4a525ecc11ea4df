//! HTTP host for resource modules.
//!
//! Module routers are merged under one `Router`, wrapped with the shared
//! middleware stack and served until a shutdown signal arrives.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
pub mod shutdown;
mod web;

pub use config::{ApiIngressConfig, DEFAULT_BODY_LIMIT_BYTES};

pub const MODULE_NAME: &str = "api_ingress";

pub struct ApiIngress {
    config: ApiIngressConfig,
    timeout: Option<Duration>,
}

impl ApiIngress {
    /// `timeout_sec == 0` disables the per-request timeout.
    pub fn new(config: ApiIngressConfig, timeout_sec: u64) -> Self {
        let timeout = (timeout_sec > 0).then(|| Duration::from_secs(timeout_sec));
        Self { config, timeout }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Add `/health` to the module routes and wrap everything in the middleware stack.
    ///
    /// Outermost to innermost:
    /// SetRequestId -> PropagateRequestId -> push_req_id_to_extensions ->
    /// stamp_problem_request_id -> Trace -> Timeout -> CORS -> BodyLimit
    pub fn build_router(&self, modules: Router) -> Router {
        let x_request_id = request_id::header();

        // `layer` wraps what is already there, so apply innermost first
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(modules)
            .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::stamp_problem_request_id))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind `addr` and serve `router` until `shutdown` resolves.
    pub async fn serve<F>(&self, router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(%addr, "HTTP server bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .context("HTTP server failed")
    }
}
