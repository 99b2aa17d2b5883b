//! `ask` and `stream` commands

use super::{build_adapter, RequestArgs};
use crate::config::AppConfig;
use anyhow::Result;
use futures::StreamExt;
use std::io::Write;
use switchyard_llm::CompletionResult;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cancel the token on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                debug!("Interrupt received, cancelling request");
                child.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
    token
}

fn summary(result: &CompletionResult) -> String {
    let usage = &result.usage;
    let mut line = format!(
        "[{} · {} · {} in / {} out tokens (est.) · ${:.6}",
        result.backend, result.model, usage.input_tokens, usage.output_tokens, usage.estimated_cost
    );
    if result.used_fallback() {
        let tried: Vec<&str> = result.attempts.iter().map(|id| id.as_str()).collect();
        line.push_str(&format!(" · fallback via {}", tried.join(" -> ")));
    }
    line.push(']');
    line
}

pub async fn ask(config: &AppConfig, args: RequestArgs) -> Result<()> {
    let adapter = build_adapter(config)?;
    let request = args.into_request()?.with_cancellation(cancel_on_ctrl_c());

    let result = adapter.complete(&request).await?;
    println!("{}", result.text);
    eprintln!("{}", summary(&result));
    Ok(())
}

pub async fn stream(config: &AppConfig, args: RequestArgs) -> Result<()> {
    let adapter = build_adapter(config)?;
    let request = args.into_request()?.with_cancellation(cancel_on_ctrl_c());

    let mut fragments = adapter.stream(&request)?;
    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.next().await {
        let text = fragment?;
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}
