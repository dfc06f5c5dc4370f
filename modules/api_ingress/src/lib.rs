//! HTTP ingress: owns the axum server, applies global middleware and
//! serves the merged OpenAPI document of every registered module.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::{middleware::from_fn, routing::get, Router};
use modkit::api::OpenApiRegistry;
use modkit::{Module, ModuleCtx, RestHostModule, StatefulModule};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

const STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// REST host module. Collects module routes and OpenAPI fragments during the
/// REST phase and serves them once started.
pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    openapi: Mutex<OpenApi>,
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
    local_addr: Mutex<Option<SocketAddr>>,
    shutdown: CancellationToken,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

fn base_document() -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("SkillSwap API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Peer skill-exchange platform API"))
                .build(),
        )
        .build()
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            openapi: Mutex::new(base_document()),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
            local_addr: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Address the listener is bound to once `start` has run.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Router produced by the REST phase, if it ran.
    pub fn router(&self) -> Option<Router> {
        self.final_router.lock().clone()
    }

    /// Wrap `router` with the global middleware stack.
    ///
    /// Order (outermost first): PropagateRequestId → SetRequestId →
    /// push_req_id_to_extensions → Trace → Timeout → CORS → BodyLimit.
    pub fn apply_middleware(&self, router: Router) -> Router {
        let cfg = self.get_config();
        let x_request_id = request_id::header();

        let mut router = router
            .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router
            .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)))
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(SetRequestIdLayer::new(x_request_id.clone(), request_id::MakeReqId))
            .layer(PropagateRequestIdLayer::new(x_request_id))
    }

    async fn serve(
        listener: tokio::net::TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[async_trait]
impl Module for ApiIngress {
    async fn init(&self, ctx: &ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(bind_addr = %cfg.bind_addr, cors = cfg.cors_enabled, "api_ingress configured");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> Result<Router> {
        tracing::debug!("REST host prepared base router with health check");
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> Result<Router> {
        let doc = self.document();
        tracing::info!(
            paths = doc.paths.paths.len(),
            "rest_finalize: emitting OpenAPI document"
        );
        let doc = Arc::new(serde_json::to_value(&doc)?);

        let router = self.apply_middleware(
            router.route("/openapi.json", get(web::openapi_handler(doc))),
        );
        *self.final_router.lock() = Some(router.clone());
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

impl OpenApiRegistry for ApiIngress {
    fn merge_document(&self, doc: OpenApi) {
        let paths = doc.paths.paths.len();
        self.openapi.lock().merge(doc);
        tracing::debug!(paths, "merged module OpenAPI document");
    }

    fn document(&self) -> OpenApi {
        self.openapi.lock().clone()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl StatefulModule for ApiIngress {
    /// Binds the listener before returning so address errors fail startup.
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cfg.bind_addr, e))?;

        let router = match self.router() {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving health only");
                self.apply_middleware(Router::new().route("/health", get(web::health_check)))
            }
        };

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;
        *self.local_addr.lock() = Some(bound);
        tracing::info!("HTTP server bound on {}", bound);

        let stop = self.shutdown.clone();
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {},
                _ = stop.cancelled() => {},
            }
            token.cancel();
        });

        let handle = tokio::spawn(Self::serve(listener, router, child));
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> Result<()> {
        self.shutdown.cancel();
        let handle = self.server.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(joined) => joined?,
            Err(_) => {
                tracing::warn!("HTTP server did not stop within {:?}", STOP_TIMEOUT);
                Ok(())
            }
        }
    }
}
