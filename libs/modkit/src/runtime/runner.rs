//! Drives a [`ModuleRegistry`] through its lifecycle.
//!
//! All phases share one [`ModuleCtx`]. The order is init, db (only with a
//! connection), rest, start; the runner then parks until the cancellation
//! token fires and finishes with stop.

use std::{future::Future, pin::Pin, sync::Arc};

use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown::termination_signal;

pub enum DbOptions {
    /// No database; modules see `ctx.db() == None` and migrations are skipped.
    None,
    Connection(DatabaseConnection),
}

impl DbOptions {
    fn connection(&self) -> Option<&DatabaseConnection> {
        match self {
            DbOptions::None => None,
            DbOptions::Connection(conn) => Some(conn),
        }
    }
}

/// What ends a run.
pub enum ShutdownOptions {
    /// SIGINT / SIGTERM (Ctrl+C, Ctrl+Break, console close on Windows).
    Signals,
    /// The caller cancels this token.
    Token(CancellationToken),
    /// Shutdown starts when the future resolves.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl ShutdownOptions {
    /// The token the run is bound to. For `Signals` and `Future` a watcher
    /// task is spawned that cancels it.
    fn arm(self) -> CancellationToken {
        match self {
            ShutdownOptions::Token(token) => {
                tracing::info!("shutdown: controlled by caller token");
                token
            }
            ShutdownOptions::Signals => {
                let token = CancellationToken::new();
                let trigger = token.clone();
                tokio::spawn(async move {
                    match termination_signal().await {
                        Ok(name) => tracing::info!(signal = name, "shutdown: signal received"),
                        Err(e) => {
                            tracing::warn!(error = %e, "shutdown: signal listener failed, waiting for ctrl_c");
                            if let Err(e) = tokio::signal::ctrl_c().await {
                                tracing::error!(error = %e, "shutdown: ctrl_c listener failed");
                            }
                        }
                    }
                    trigger.cancel();
                });
                token
            }
            ShutdownOptions::Future(done) => {
                let token = CancellationToken::new();
                let trigger = token.clone();
                tokio::spawn(async move {
                    done.await;
                    tracing::info!("shutdown: completion future resolved");
                    trigger.cancel();
                });
                token
            }
        }
    }
}

pub struct RunOptions {
    /// Per-module config sections, looked up by module name.
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
    pub registry: ModuleRegistry,
    /// Keep a clone to resolve module clients once the run is up.
    pub client_hub: Arc<ClientHub>,
}

fn shared_ctx(
    cancel: &CancellationToken,
    hub: Arc<ClientHub>,
    config: Arc<dyn ConfigProvider>,
    db: &DbOptions,
) -> ModuleCtx {
    let builder = ModuleCtxBuilder::new(cancel.clone())
        .with_client_hub(hub)
        .with_config_provider(config);
    match db.connection() {
        Some(conn) => builder.with_db(conn.clone()),
        None => builder,
    }
    .build()
}

/// Runs every phase and returns once the stop phase has completed. The
/// first failing phase aborts the run with its error.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        modules_cfg,
        db,
        shutdown,
        registry,
        client_hub,
    } = opts;
    let cancel = shutdown.arm();
    let ctx = shared_ctx(&cancel, client_hub, modules_cfg, &db);

    tracing::info!("Phase: init");
    registry.run_init_phase(&ctx).await?;

    if let Some(conn) = db.connection() {
        tracing::info!("Phase: db");
        registry.run_db_phase(conn).await?;
    }

    tracing::info!("Phase: rest");
    registry.run_rest_phase(&ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    registry.run_start_phase(cancel.clone()).await?;

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await?;
    Ok(())
}
