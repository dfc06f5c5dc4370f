use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::runtime::{run, DbOptions, RunOptions, ShutdownOptions};
use modkit::{ClientHub, ModuleRegistry};
use runtime::{AppConfig, AppConfigProvider, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use skill_exchange::config::SkillExchangeConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// SkillSwap Server - peer skill exchange platform
#[derive(Parser)]
#[command(name = "skillswap-server")]
#[command(about = "SkillSwap Server - peer skill exchange platform")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Sign a session token for a user id (development helper)
    IssueToken {
        /// User id the token resolves to
        #[arg(long)]
        user: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    bind_ingress_to_server(&mut config, args.port.is_some());

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("SkillSwap Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, &args),
        Commands::IssueToken { user } => issue_token(&config, user),
    }
}

/// Point `modules.api_ingress.bind_addr` at `server.host:server.port`.
/// An explicit `--port` always wins; otherwise an existing bind_addr is kept.
fn bind_ingress_to_server(config: &mut AppConfig, force: bool) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let section = config
        .modules
        .entry(api_ingress::MODULE_NAME.to_string())
        .or_insert_with(|| serde_json::json!({}));
    let Some(obj) = section.as_object_mut() else {
        tracing::warn!("modules.api_ingress is not a mapping; leaving it untouched");
        return;
    };
    if force || !obj.contains_key("bind_addr") {
        obj.insert("bind_addr".to_string(), serde_json::Value::String(addr));
    }
}

/// Detect DB backend from URL scheme (sqlite/postgres).
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim().to_owned();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(&raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Resolve the DSN to connect to: `--mock` forces in-memory SQLite and
/// relative SQLite paths are anchored at `home_dir`.
fn resolve_dsn(config: &AppConfig, args: &CliArgs) -> Result<Option<String>> {
    if args.mock {
        return Ok(Some(MEMORY_DSN.to_string()));
    }
    let Some(db_config) = config.database.as_ref() else {
        return Ok(None);
    };
    let backend = detect_from_dsn(db_config)?;
    let dsn = db_config.url.trim().to_owned();
    if backend == "sqlite" && dsn.starts_with("sqlite://") {
        let base_dir = PathBuf::from(&config.server.home_dir);
        return absolutize_sqlite_dsn(&dsn, &base_dir, true).map(Some);
    }
    Ok(Some(dsn))
}

async fn connect(dsn: &str, db_config: Option<&DatabaseConfig>) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(dsn.to_owned());
    // Every pooled connection to sqlite::memory: would see its own database.
    let max_conns = if dsn == MEMORY_DSN {
        1
    } else {
        db_config.and_then(|c| c.max_conns).unwrap_or(10)
    };
    let acquire_ms = db_config
        .and_then(|c| c.acquire_timeout_ms)
        .unwrap_or(5000);
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_millis(acquire_ms))
        .sqlx_logging(false);

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database '{dsn}'"))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}

fn build_registry() -> Result<ModuleRegistry> {
    let ingress = Arc::new(api_ingress::ApiIngress::default());
    let exchange = Arc::new(skill_exchange::SkillExchange::default());

    let registry = ModuleRegistry::builder()
        .module(api_ingress::MODULE_NAME, &[], ingress.clone())
        .rest_host(api_ingress::MODULE_NAME, ingress.clone())
        .stateful(api_ingress::MODULE_NAME, ingress)
        .module(
            skill_exchange::module::MODULE_NAME,
            &[api_ingress::MODULE_NAME],
            exchange.clone(),
        )
        .db(skill_exchange::module::MODULE_NAME, exchange.clone())
        .rest(skill_exchange::module::MODULE_NAME, exchange)
        .build()?;
    Ok(registry)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    // Modules fall back to defaults on a bad section; refuse to start instead.
    exchange_config(&config)?;

    let db = match resolve_dsn(&config, &args)? {
        Some(dsn) => DbOptions::Connection(connect(&dsn, config.database.as_ref()).await?),
        None => {
            tracing::warn!("No database configuration found, running without database");
            DbOptions::None
        }
    };

    let run_options = RunOptions {
        modules_cfg: Arc::new(AppConfigProvider::new(config)),
        db,
        shutdown: ShutdownOptions::Signals,
        registry: build_registry()?,
        client_hub: Arc::new(ClientHub::new()),
    };

    run(run_options).await
}

fn check_config(config: AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    match resolve_dsn(&config, args)? {
        Some(dsn) => println!("Database: {dsn}"),
        None => println!("Database: not configured"),
    }
    exchange_config(&config)?;
    build_registry()?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

fn exchange_config(config: &AppConfig) -> Result<SkillExchangeConfig> {
    match config.modules.get(skill_exchange::module::MODULE_NAME) {
        Some(raw) => serde_json::from_value(raw.clone())
            .context("Invalid modules.skill_exchange configuration"),
        None => Ok(SkillExchangeConfig::default()),
    }
}

fn issue_token(config: &AppConfig, user: Uuid) -> Result<()> {
    let cfg = exchange_config(config)?;
    if cfg.session_secret.is_empty() {
        return Err(anyhow!(
            "modules.skill_exchange.session_secret must be set to issue tokens"
        ));
    }
    let guard = skill_exchange::module::build_session_guard(&cfg);
    println!("{}", guard.issue(user)?);
    Ok(())
}
