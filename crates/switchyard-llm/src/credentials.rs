//! Backend credentials
//!
//! A credential is an opaque string; the only check applied is a cheap
//! backend-specific shape test. Shape failures are skipped, never errors.

use crate::backend::BackendId;
use crate::util::mask_api_key;
use std::collections::BTreeMap;
use std::fmt;

/// Map of backend to credential
#[derive(Clone, Default)]
pub struct Credentials {
    keys: BTreeMap<BackendId, String>,
}

// Security: keys never appear in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (id, key) in &self.keys {
            map.entry(&id.as_str(), &mask_api_key(key));
        }
        map.finish()
    }
}

impl Credentials {
    /// Empty credential set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read credentials from the conventional environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    ///
    /// For each backend the first non-blank variable in
    /// [`BackendId::env_vars`] wins.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credentials = Self::new();
        for id in BackendId::ALL {
            if let Some(key) = id
                .env_vars()
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
            {
                credentials.insert(id, key);
            }
        }
        credentials
    }

    /// Set a backend's credential; blank strings remove it
    pub fn insert(&mut self, id: BackendId, key: impl Into<String>) {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            self.keys.remove(&id);
        } else {
            self.keys.insert(id, key);
        }
    }

    /// Builder form of [`Credentials::insert`]
    #[must_use]
    pub fn with(mut self, id: BackendId, key: impl Into<String>) -> Self {
        self.insert(id, key);
        self
    }

    /// Credential for a backend
    #[must_use]
    pub fn get(&self, id: BackendId) -> Option<&str> {
        self.keys.get(&id).map(String::as_str)
    }

    /// Iterate over present credentials
    pub fn iter(&self) -> impl Iterator<Item = (BackendId, &str)> {
        self.keys.iter().map(|(id, key)| (*id, key.as_str()))
    }

    /// Whether no credential is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Minimum length for prefix-checked keys
const MIN_KEY_LENGTH: usize = 20;

/// Exact length of a Google API key
const GOOGLE_KEY_LENGTH: usize = 39;

/// Cheap format check for a backend's credential
#[must_use]
pub fn credential_shape_ok(id: BackendId, key: &str) -> bool {
    let key = key.trim();
    match id {
        BackendId::OpenAi | BackendId::DeepSeek => {
            key.starts_with("sk-") && key.len() >= MIN_KEY_LENGTH
        }
        BackendId::Anthropic => key.starts_with("sk-ant-") && key.len() >= MIN_KEY_LENGTH,
        BackendId::Gemini => key.starts_with("AIza") && key.len() == GOOGLE_KEY_LENGTH,
        BackendId::Groq => key.starts_with("gsk_") && key.len() >= MIN_KEY_LENGTH,
    }
}
