use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::rest::routes;
use crate::config::SkillExchangeConfig;
use crate::contract::client::SkillExchangeApi;
use crate::domain::ports::SessionGuard;
use crate::domain::service::{Repositories, Service, ServiceConfig};
use crate::gateways::local::SkillExchangeLocalClient;
use crate::infra::auth::HmacSessionGuard;
use crate::infra::events::TracingEventPublisher;
use crate::infra::storage::{
    migrations::Migrator, SeaOrmMessagesRepository, SeaOrmRatingsRepository,
    SeaOrmRequestsRepository, SeaOrmUsersRepository,
};

pub const MODULE_NAME: &str = "skill_exchange";

/// The skill exchange module: users, requests, messages and ratings.
#[derive(Default)]
pub struct SkillExchange {
    service: arc_swap::ArcSwapOption<Service>,
    guard: arc_swap::ArcSwapOption<HmacSessionGuard>,
}

impl SkillExchange {
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }

    pub fn session_guard(&self) -> Option<Arc<HmacSessionGuard>> {
        self.guard.load_full()
    }
}

/// Wires the SeaORM repositories and the tracing event publisher into a service.
pub fn build_service(db: DatabaseConnection, cfg: &SkillExchangeConfig) -> Service {
    let repos = Repositories {
        users: Arc::new(SeaOrmUsersRepository::new(db.clone())),
        requests: Arc::new(SeaOrmRequestsRepository::new(db.clone())),
        ratings: Arc::new(SeaOrmRatingsRepository::new(db.clone())),
        messages: Arc::new(SeaOrmMessagesRepository::new(db)),
    };
    let service_config = ServiceConfig {
        max_name_length: cfg.max_name_length,
        max_skill_length: cfg.max_skill_length,
        max_message_length: cfg.max_message_length,
        require_pairing_for_rating: cfg.require_pairing_for_rating,
    };
    Service::new(repos, Arc::new(TracingEventPublisher), service_config)
}

/// Session guard keyed by `session_secret`, or by a random per-process key
/// when none is configured.
pub fn build_session_guard(cfg: &SkillExchangeConfig) -> HmacSessionGuard {
    let ttl = Duration::from_secs(cfg.token_ttl_secs);
    if cfg.session_secret.is_empty() {
        warn!("session_secret is not configured; tokens will not survive a restart");
        let key = [Uuid::new_v4().into_bytes(), Uuid::new_v4().into_bytes()].concat();
        return HmacSessionGuard::new(key, ttl);
    }
    HmacSessionGuard::new(cfg.session_secret.as_bytes(), ttl)
}

#[async_trait]
impl Module for SkillExchange {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing skill_exchange module");

        let cfg: SkillExchangeConfig = ctx.module_config();
        debug!(
            "Loaded skill_exchange config: token_ttl_secs={}, require_pairing_for_rating={}",
            cfg.token_ttl_secs, cfg.require_pairing_for_rating
        );

        let db = ctx.db_required()?;
        let service = Arc::new(build_service(db, &cfg));
        self.guard.store(Some(Arc::new(build_session_guard(&cfg))));
        self.service.store(Some(service.clone()));

        // Local in-process client implementation published to ClientHub
        let api: Arc<dyn SkillExchangeApi> = Arc::new(SkillExchangeLocalClient::new(service));
        ctx.client_hub().register::<dyn SkillExchangeApi>(api);
        info!("SkillExchange API exposed to ClientHub");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for SkillExchange {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running skill_exchange database migrations");
        Migrator::up(db, None).await?;
        info!("skill_exchange database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for SkillExchange {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering skill_exchange REST routes");

        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        let guard: Arc<dyn SessionGuard> = self
            .guard
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Session guard not initialized"))?;

        let router = routes::register_routes(router, openapi, service, guard)?;
        info!("skill_exchange REST routes registered successfully");
        Ok(router)
    }
}
