//! Switchyard LLM - provider routing and resilience layer
//!
//! This crate picks one of several interchangeable text-generation backends
//! for each request and recovers from backend failures:
//! - Backends: OpenAI, Anthropic, Gemini, DeepSeek, Groq behind one [`Backend`] trait
//! - Registry: clients for every well-formed credential
//! - Router: explicit override, complexity shortlists, role preferences
//! - Resilience: per-attempt timeout, cancellation, fallback chains
//! - Usage: approximate token counts and cost per call, session totals
//! - Streaming: single-attempt fragment streams
//!
//! [`UnifiedAdapter`] ties these together for the IDE shell.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod backend;
pub mod completion;
pub mod complexity;
pub mod config;
pub mod credentials;
pub mod error;
pub mod message;
pub mod providers;
pub mod registry;
pub mod resilience;
pub mod role;
pub mod router;
pub mod sse;
pub mod streaming;
pub mod testing;
pub mod usage;
pub mod util;

pub use adapter::{BackendStatus, UnifiedAdapter};
pub use backend::{Backend, BackendChoice, BackendId, FragmentStream, ModelInfo};
pub use completion::{ChatOptions, CompletionRequest, CompletionResult};
pub use complexity::{Complexity, ComplexityEstimator, KeywordEstimator};
pub use config::AdapterConfig;
pub use credentials::{credential_shape_ok, Credentials};
pub use error::{BackendError, Error, ErrorCategory, Result};
pub use message::{Message, MessageRole};
pub use providers::BackendSettings;
pub use registry::Registry;
pub use resilience::ResilienceController;
pub use role::{Role, RoleCatalogue};
pub use router::{RouteDecision, RouteReason, Router, RoutingTable};
pub use streaming::TextStream;
pub use usage::{BackendUsage, UsageRecord, UsageStats, UsageTracker};

// Re-export for callers that build requests with cancellation
pub use tokio_util::sync::CancellationToken;
