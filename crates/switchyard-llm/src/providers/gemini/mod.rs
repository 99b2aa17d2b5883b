//! Google Gemini - Generative Language API client

mod provider;
mod types;


pub use provider::GeminiProvider;
