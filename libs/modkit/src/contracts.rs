//! Capabilities a module can register with the [`ModuleRegistry`](crate::ModuleRegistry).
//!
//! Every module implements [`Module`]. The rest are opt-in and called by the
//! runner in phase order: `init`, then `migrate`, then the REST wiring
//! (`rest_prepare`, each `register_rest`, `rest_finalize`), then `start`;
//! `stop` runs in reverse registration order on shutdown.

use async_trait::async_trait;
use axum::Router;
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;

pub use crate::api::OpenApiRegistry;

/// Wiring: read config, build services, publish clients to the hub.
/// The schema may not be migrated yet.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Owns tables in the shared database.
#[async_trait]
pub trait DbModule: Send + Sync {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()>;
}

/// Contributes routes and their OpenAPI paths. Synchronous.
pub trait RestfulModule: Send + Sync {
    fn register_rest(
        &self,
        ctx: &ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router>;
}

/// Owns the HTTP listener. Exactly one per registry when any module is
/// restful; the listener itself is only bound in `start`.
pub trait RestHostModule: Send + Sync + 'static {
    /// Host-level routes, added before any module registers.
    fn rest_prepare(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    /// Layers middleware over the merged router and keeps it for serving.
    fn rest_finalize(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    fn as_registry(&self) -> &dyn OpenApiRegistry;
}

/// Background work bound to the run's cancellation token.
#[async_trait]
pub trait StatefulModule: Send + Sync {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()>;
    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()>;
}
