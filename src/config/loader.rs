//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::AppConfig;
use anyhow::{bail, Context, Result};
use ::config::{Config, Environment, File, FileFormat, Map};
use std::fs;
use std::path::Path;
use switchyard_llm::BackendId;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Local overrides, also where `switchyard default` writes
pub const LOCAL_CONFIG_PATH: &str = "config/local.toml";

const ENV_PREFIX: &str = "SWITCHYARD";

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    load_from(Path::new(LOCAL_CONFIG_PATH), None)
}

/// `env` replaces the process environment when given
fn load_from(local: &Path, env: Option<Map<String, String>>) -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. Local overrides (optional)
        .add_source(File::from(local).format(FileFormat::Toml).required(false))
        // 3. Environment variables (highest priority)
        // SWITCHYARD_ROUTER__DEFAULT_BACKEND: single `_` after the prefix
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Persist the default backend into a local config file, keeping the rest
pub fn save_default_backend(path: &Path, backend: BackendId) -> Result<()> {
    let mut doc: toml::Table = if path.exists() {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    let router = doc
        .entry("router")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(router) = router else {
        bail!("`router` in {} is not a table", path.display());
    };
    router.insert(
        "default_backend".to_string(),
        toml::Value::String(backend.as_str().to_string()),
    );

    let content = toml::to_string_pretty(&doc).context("Failed to serialize config")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use switchyard_llm::RoutingTable;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("switchyard-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("local.toml")
    }

    fn no_env() -> Option<Map<String, String>> {
        Some(Map::new())
    }

    #[test]
    fn test_embedded_defaults_match_library_defaults() {
        let config = load_from(Path::new("does/not/exist.toml"), no_env()).unwrap();
        assert_eq!(config.router.routing, RoutingTable::default());
        assert_eq!(config.router.attempt_timeout_ms, 60_000);
        assert_eq!(config.router.default_backend, None);
        assert!(config.router.backends.is_empty());
        assert_eq!(config.logging.filter, "switchyard=info,switchyard_llm=info");
    }

    #[test]
    fn test_env_overrides_files() {
        let env = Map::from([
            (
                "SWITCHYARD_ROUTER__DEFAULT_BACKEND".to_string(),
                "groq".to_string(),
            ),
            (
                "SWITCHYARD_ROUTER__ATTEMPT_TIMEOUT_MS".to_string(),
                "5000".to_string(),
            ),
        ]);
        let config = load_from(Path::new("does/not/exist.toml"), Some(env)).unwrap();
        assert_eq!(config.router.default_backend, Some(BackendId::Groq));
        assert_eq!(config.router.attempt_timeout_ms, 5_000);
    }

    #[test]
    fn test_local_file_merges_over_defaults() {
        let path = scratch("merge");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"
[router.routing.fallback_chains]
groq = ["openai"]

[router.backends.deepseek]
model = "deepseek-reasoner"
"#,
        )
        .unwrap();

        let config = load_from(&path, no_env()).unwrap();
        let routing = &config.router.routing;
        assert_eq!(routing.fallback_chain(BackendId::Groq), &[BackendId::OpenAi]);
        // untouched chains keep their defaults
        assert_eq!(
            routing.fallback_chain(BackendId::OpenAi),
            RoutingTable::default().fallback_chain(BackendId::OpenAi)
        );
        assert_eq!(
            config.router.backends[&BackendId::DeepSeek].model.as_deref(),
            Some("deepseek-reasoner")
        );
    }

    #[test]
    fn test_save_default_backend_round_trip() {
        let path = scratch("save");
        save_default_backend(&path, BackendId::Anthropic).unwrap();
        let config = load_from(&path, no_env()).unwrap();
        assert_eq!(config.router.default_backend, Some(BackendId::Anthropic));

        // existing settings survive
        fs::write(
            &path,
            "[router]\ndefault_backend = \"groq\"\nattempt_timeout_ms = 1234\n",
        )
        .unwrap();
        save_default_backend(&path, BackendId::Gemini).unwrap();
        let config = load_from(&path, no_env()).unwrap();
        assert_eq!(config.router.default_backend, Some(BackendId::Gemini));
        assert_eq!(config.router.attempt_timeout_ms, 1_234);
    }

    #[test]
    fn test_save_rejects_non_table_router() {
        let path = scratch("reject");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "router = 3\n").unwrap();
        assert!(save_default_backend(&path, BackendId::Groq).is_err());
    }
}
