//! OpenAI-compatible chat completions client
//!
//! Serves OpenAI, DeepSeek and Groq; they differ only in base URL, default
//! model and price table.

mod provider;
mod types;


pub use provider::OpenAiCompatProvider;
