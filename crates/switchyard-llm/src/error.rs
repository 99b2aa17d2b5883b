//! Error types for switchyard-llm
//!
//! Two layers: [`BackendError`] describes one failed attempt against one
//! backend, [`Error`] is what callers of the routing layer see.

use crate::backend::BackendId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Coarse category of a failed backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Credential rejected (401, "authentication", "invalid x-api-key")
    InvalidCredential,
    /// Credential valid but not allowed (403)
    AccessForbidden,
    /// Rate limited or out of quota (429, "rate limit", "quota")
    RateLimitOrQuota,
    /// Provider-side failure (5xx)
    ServerError,
    /// Connection refused, host not found, timeout
    NetworkError,
    /// Anything else
    Unknown,
}

const INVALID_CREDENTIAL_PATTERNS: &[&str] = &[
    "authentication",
    "invalid x-api-key",
    "invalid api key",
    "incorrect api key",
    "api key not valid",
    "unauthorized",
];

const FORBIDDEN_PATTERNS: &[&str] = &["forbidden", "permission denied"];

const RATE_LIMIT_PATTERNS: &[&str] = &["rate limit", "rate_limit", "quota", "too many requests"];

const SERVER_PATTERNS: &[&str] = &["internal server error", "service unavailable", "overloaded"];

const NETWORK_PATTERNS: &[&str] = &[
    "connection refused",
    "econnrefused",
    "host not found",
    "enotfound",
    "dns error",
    "failed to lookup address",
    "timed out",
    "timeout",
    "etimedout",
    "connection reset",
];

impl ErrorCategory {
    /// Classify a failure from its HTTP status (if any) and message.
    ///
    /// The status code wins when it is one of the recognised codes; otherwise
    /// the message is searched for known substrings, in category order.
    #[must_use]
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        match status {
            Some(401) => return Self::InvalidCredential,
            Some(403) => return Self::AccessForbidden,
            Some(429) => return Self::RateLimitOrQuota,
            Some(500..=599) => return Self::ServerError,
            _ => {}
        }

        let lower = message.to_lowercase();
        let matches = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

        if matches(INVALID_CREDENTIAL_PATTERNS) {
            Self::InvalidCredential
        } else if matches(FORBIDDEN_PATTERNS) {
            Self::AccessForbidden
        } else if matches(RATE_LIMIT_PATTERNS) {
            Self::RateLimitOrQuota
        } else if matches(SERVER_PATTERNS) {
            Self::ServerError
        } else if matches(NETWORK_PATTERNS) {
            Self::NetworkError
        } else {
            Self::Unknown
        }
    }

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::AccessForbidden => "access_forbidden",
            Self::RateLimitOrQuota => "rate_limit_or_quota",
            Self::ServerError => "server_error",
            Self::NetworkError => "network_error",
            Self::Unknown => "unknown",
        }
    }

    /// Short advice for a human reading the final error
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "check the API key for this backend",
            Self::AccessForbidden => "the API key lacks access to this model or endpoint",
            Self::RateLimitOrQuota => "rate limit or quota exhausted, retry later or add credit",
            Self::ServerError => "the provider is having problems, retry later",
            Self::NetworkError => "check network connectivity and proxy settings",
            Self::Unknown => "inspect the provider message",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed attempt against one backend
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{backend} failed [{category}]{}: {message}", status_suffix(.status))]
pub struct BackendError {
    /// Backend that failed
    pub backend: BackendId,
    /// Derived category
    pub category: ErrorCategory,
    /// HTTP status, when the failure came from an HTTP response
    pub status: Option<u16>,
    /// Provider message (credentials scrubbed)
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl BackendError {
    /// Create an error, classifying it from status and message
    #[must_use]
    pub fn new(backend: BackendId, status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            backend,
            category: ErrorCategory::classify(status, &message),
            status,
            message,
        }
    }

    /// Error for a non-success HTTP response
    #[must_use]
    pub fn http(backend: BackendId, status: u16, message: impl Into<String>) -> Self {
        Self::new(backend, Some(status), message)
    }

    /// Error for a transport-level reqwest failure
    #[must_use]
    pub fn transport(backend: BackendId, err: &reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() || err.is_connect() {
            return Self {
                backend,
                category: ErrorCategory::NetworkError,
                status: None,
                message,
            };
        }
        Self::new(backend, err.status().map(|s| s.as_u16()), message)
    }

    /// Error for an attempt that exceeded its deadline
    #[must_use]
    pub fn timeout(backend: BackendId, after: Duration) -> Self {
        Self {
            backend,
            category: ErrorCategory::NetworkError,
            status: None,
            message: format!("timed out after {}ms", after.as_millis()),
        }
    }

    /// Error for a successful response without any text
    #[must_use]
    pub fn empty_response(backend: BackendId) -> Self {
        Self {
            backend,
            category: ErrorCategory::Unknown,
            status: None,
            message: "empty response".to_string(),
        }
    }

    /// Error for a response body that could not be decoded
    #[must_use]
    pub fn invalid_response(backend: BackendId, detail: impl fmt::Display) -> Self {
        Self {
            backend,
            category: ErrorCategory::Unknown,
            status: None,
            message: format!("invalid response: {detail}"),
        }
    }
}

/// Routing layer error type
#[derive(Debug, Error)]
pub enum Error {
    /// No backend credential passed validation
    #[error(
        "no provider configured: set at least one of OPENAI_API_KEY, ANTHROPIC_API_KEY, \
         GEMINI_API_KEY, DEEPSEEK_API_KEY or GROQ_API_KEY"
    )]
    NoProviderConfigured,

    /// A specific backend was requested but is not registered
    #[error("backend not registered: {0}")]
    NotRegistered(BackendId),

    /// A single attempt failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Every reachable alternate failed
    #[error(
        "all providers exhausted (first choice {origin}, tried {}): last error: {last}; hint: {}; registered backends: {}",
        join_ids(.attempted),
        .last.category.hint(),
        join_ids(.registered)
    )]
    AllProvidersExhausted {
        /// Backend the router originally chose
        origin: BackendId,
        /// Backends attempted, in order
        attempted: Vec<BackendId>,
        /// Backends registered at the time of failure
        registered: Vec<BackendId>,
        /// Final failure
        last: BackendError,
    },

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

fn join_ids(ids: &[BackendId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(BackendId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Category of the underlying backend failure, if there is one
    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Backend(e) => Some(e.category),
            Self::AllProvidersExhausted { last, .. } => Some(last.category),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
