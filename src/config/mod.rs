//! Application configuration
//!
//! Layered from the embedded defaults, `config/local.toml` and `SWITCHYARD_*`
//! environment variables.

mod loader;

pub use loader::{load_config, save_default_backend, LOCAL_CONFIG_PATH};

use serde::{Deserialize, Serialize};
use switchyard_llm::AdapterConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub router: AdapterConfig,
    pub logging: LoggingConfig,
}

/// Log output settings; `RUST_LOG` overrides `filter`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "switchyard=info,switchyard_llm=info".to_string(),
            json: false,
        }
    }
}
