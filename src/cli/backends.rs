//! `providers`, `route`, `validate` and `default` commands

use super::build_adapter;
use crate::config::{save_default_backend, AppConfig, LOCAL_CONFIG_PATH};
use anyhow::{bail, Result};
use std::path::Path;
use switchyard_llm::{BackendChoice, BackendId, BackendStatus, Role};
use tracing::{info, warn};

fn status_table(statuses: &[BackendStatus]) -> String {
    let mut out = format!("{:<10} {:<11} {:<8} {}\n", "BACKEND", "REGISTERED", "DEFAULT", "MODEL");
    for status in statuses {
        out.push_str(&format!(
            "{:<10} {:<11} {:<8} {}\n",
            status.id.as_str(),
            if status.registered { "yes" } else { "no" },
            if status.is_default { "*" } else { "" },
            status.model.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub fn providers(config: &AppConfig) -> Result<()> {
    let adapter = build_adapter(config)?;
    print!("{}", status_table(&adapter.backends()));
    Ok(())
}

pub fn route(config: &AppConfig, role: Role, prompt: &str) -> Result<()> {
    let adapter = build_adapter(config)?;
    let decision = adapter.route(BackendChoice::Auto, role, prompt);
    let complexity = decision
        .complexity
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    println!(
        "backend: {}\nreason: {}\ncomplexity: {}",
        decision.backend, decision.reason, complexity
    );
    Ok(())
}

pub async fn validate(config: &AppConfig, backend: BackendId) -> Result<()> {
    let adapter = build_adapter(config)?;
    if adapter.validate(backend).await? {
        println!("{backend}: credential OK");
        Ok(())
    } else {
        bail!("{backend}: credential rejected (see log for the provider message)")
    }
}

pub fn set_default(config: &AppConfig, backend: BackendId) -> Result<()> {
    match build_adapter(config) {
        Ok(adapter) => {
            if let Err(e) = adapter.set_default(backend) {
                warn!("{e}; saving anyway, it takes effect once a credential is set");
            }
        }
        Err(e) => warn!("{e:#}"),
    }

    save_default_backend(Path::new(LOCAL_CONFIG_PATH), backend)?;
    info!(backend = %backend, path = LOCAL_CONFIG_PATH, "Default backend saved");
    println!("Default backend set to {backend}");
    Ok(())
}
