//! Anthropic - Claude Messages API client
//!
//! This module implements the Anthropic backend using reqwest.

mod convert;
mod provider;
mod stream;
mod types;


pub use provider::AnthropicProvider;
pub use types::API_VERSION;
