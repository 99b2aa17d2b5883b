//! CLI module for Switchyard
//!
//! Provides commands:
//! - `ask` / `stream`: routed completions
//! - `providers`: backend availability
//! - `route`: routing decision without a network call
//! - `validate`: credential diagnostics
//! - `default`: persist the default backend

use crate::config::AppConfig;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use switchyard_llm::{
    BackendChoice, BackendId, ChatOptions, CompletionRequest, Credentials, Role, UnifiedAdapter,
};

pub mod backends;
pub mod request;

/// Switchyard CLI
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Route prompts across text-generation backends")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One-shot completion with fallback
    Ask(RequestArgs),
    /// Stream a completion (single attempt)
    Stream(RequestArgs),
    /// List backends and whether they are registered
    Providers,
    /// Show which backend a prompt would be routed to
    Route {
        /// Task role
        #[arg(short, long, default_value = "coder")]
        role: Role,
        /// Task text
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Check a backend's credential with a minimal real call
    Validate {
        /// Backend to check
        backend: BackendId,
    },
    /// Persist the default backend to config/local.toml
    Default {
        /// New default backend
        backend: BackendId,
    },
}

/// Arguments shared by `ask` and `stream`
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Task role
    #[arg(short, long, default_value = "coder")]
    pub role: Role,
    /// Backend name or `auto`
    #[arg(short, long, default_value = "auto")]
    pub backend: BackendChoice,
    /// Context placed ahead of the task
    #[arg(long, conflicts_with = "context_file")]
    pub context: Option<String>,
    /// Read context from a file
    #[arg(long)]
    pub context_file: Option<PathBuf>,
    /// Model override
    #[arg(short, long)]
    pub model: Option<String>,
    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Task text
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,
}

impl RequestArgs {
    /// Build the library request
    pub fn into_request(self) -> Result<CompletionRequest> {
        let context = match (self.context, self.context_file) {
            (Some(text), _) => Some(text),
            (None, Some(path)) => Some(
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            ),
            (None, None) => None,
        };

        let options = ChatOptions {
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let mut request = CompletionRequest::new(self.role, self.prompt.join(" "))
            .with_backend(self.backend)
            .with_options(options);
        if let Some(context) = context {
            request = request.with_context(context);
        }
        Ok(request)
    }
}

/// Build the adapter from configuration and environment credentials
pub fn build_adapter(config: &AppConfig) -> Result<UnifiedAdapter> {
    UnifiedAdapter::new(&config.router, &Credentials::from_env())
        .context("Failed to initialize backends")
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Some(Commands::Ask(args)) => request::ask(&config, args).await,
        Some(Commands::Stream(args)) => request::stream(&config, args).await,
        Some(Commands::Providers) => backends::providers(&config),
        Some(Commands::Route { role, prompt }) => backends::route(&config, role, &prompt.join(" ")),
        Some(Commands::Validate { backend }) => backends::validate(&config, backend).await,
        Some(Commands::Default { backend }) => backends::set_default(&config, backend),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_arguments_parse() {
        let cli = Cli::try_parse_from([
            "switchyard",
            "ask",
            "--role",
            "Reviewer",
            "--backend",
            "claude",
            "--max-tokens",
            "256",
            "check",
            "this",
            "diff",
        ])
        .unwrap();

        let Some(Commands::Ask(args)) = cli.command else {
            panic!("expected ask");
        };
        let request = args.into_request().unwrap();
        assert_eq!(request.role, Role::Reviewer);
        assert_eq!(request.backend, BackendChoice::Backend(BackendId::Anthropic));
        assert_eq!(request.prompt, "check this diff");
        assert_eq!(request.options.max_tokens, Some(256));
        assert!(request.context.is_none());
    }

    #[test]
    fn test_backend_defaults_to_auto() {
        let cli = Cli::try_parse_from(["switchyard", "stream", "hello"]).unwrap();
        let Some(Commands::Stream(args)) = cli.command else {
            panic!("expected stream");
        };
        assert_eq!(args.backend, BackendChoice::Auto);
        assert_eq!(args.role, Role::Coder);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(Cli::try_parse_from(["switchyard", "ask", "--role", "poet", "hi"]).is_err());
    }

    #[test]
    fn test_context_flags_conflict() {
        let result = Cli::try_parse_from([
            "switchyard",
            "ask",
            "--context",
            "a",
            "--context-file",
            "b.txt",
            "hi",
        ]);
        assert!(result.is_err());
    }
}
