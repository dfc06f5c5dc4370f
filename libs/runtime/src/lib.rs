//! Process-level plumbing shared by binaries: layered configuration,
//! home directory resolution and logging bootstrap.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, ConfigError, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};

use std::collections::HashMap;

/// Read-only view over the per-module configuration bag.
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// `ConfigProvider` backed by a loaded `AppConfig`.
#[derive(Debug, Clone)]
pub struct AppConfigProvider {
    modules: HashMap<String, serde_json::Value>,
}

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self {
            modules: config.modules,
        }
    }
}

impl ConfigProvider for AppConfigProvider {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.modules.get(module_name)
    }
}
