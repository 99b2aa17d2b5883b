//! Provider registry
//!
//! Built once from credentials and immutable afterwards. Only backends whose
//! credential passes the shape check are registered.

use crate::backend::{Backend, BackendId};
use crate::credentials::{credential_shape_ok, Credentials};
use crate::error::{Error, Result};
use crate::providers::{self, BackendSettings};
use crate::util::mask_api_key;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registered backends plus the construction-time default
pub struct Registry {
    backends: BTreeMap<BackendId, Arc<dyn Backend>>,
    order: Vec<BackendId>,
    default_backend: BackendId,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("backends", &self.ids())
            .field("default_backend", &self.default_backend)
            .finish()
    }
}

impl Registry {
    /// Register a client for every credential that passes its shape check.
    ///
    /// Fails with [`Error::NoProviderConfigured`] when nothing is registered.
    pub fn from_credentials(
        credentials: &Credentials,
        settings: &BTreeMap<BackendId, BackendSettings>,
        preferred_default: Option<BackendId>,
        priority: &[BackendId],
    ) -> Result<Self> {
        let fallback_settings = BackendSettings::default();
        let mut backends = Vec::new();

        for (id, key) in credentials.iter() {
            if !credential_shape_ok(id, key) {
                warn!(
                    backend = %id,
                    key = %mask_api_key(key),
                    "Credential has unexpected format, skipping backend"
                );
                continue;
            }
            let backend_settings = settings.get(&id).unwrap_or(&fallback_settings);
            let backend = providers::build(id, key, backend_settings)?;
            info!(
                backend = %id,
                model = %backend.default_model(),
                key = %mask_api_key(key),
                "Registered backend"
            );
            backends.push(backend);
        }

        Self::from_backends(backends, preferred_default, priority)
    }

    /// Build a registry from ready-made clients
    pub fn from_backends(
        backends: impl IntoIterator<Item = Arc<dyn Backend>>,
        preferred_default: Option<BackendId>,
        priority: &[BackendId],
    ) -> Result<Self> {
        let backends: BTreeMap<BackendId, Arc<dyn Backend>> =
            backends.into_iter().map(|b| (b.id(), b)).collect();

        let default_backend = preferred_default
            .filter(|id| backends.contains_key(id))
            .or_else(|| priority.iter().copied().find(|id| backends.contains_key(id)))
            .or_else(|| backends.keys().next().copied())
            .ok_or(Error::NoProviderConfigured)?;

        if let Some(preferred) = preferred_default.filter(|p| *p != default_backend) {
            warn!(
                preferred = %preferred,
                using = %default_backend,
                "Preferred default backend is not registered"
            );
        }
        // priority order first, then anything the priority list leaves out
        let mut order: Vec<BackendId> = Vec::with_capacity(backends.len());
        for id in priority.iter().chain(backends.keys()) {
            if backends.contains_key(id) && !order.contains(id) {
                order.push(*id);
            }
        }
        debug!(backends = ?order, default = %default_backend, "Registry built");

        Ok(Self {
            backends,
            order,
            default_backend,
        })
    }

    /// Whether a backend is registered
    #[must_use]
    pub fn has(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }

    /// Registered client for a backend
    pub fn get(&self, id: BackendId) -> Result<Arc<dyn Backend>> {
        self.backends
            .get(&id)
            .cloned()
            .ok_or(Error::NotRegistered(id))
    }

    /// Registered backend ids, in the priority order given at construction
    #[must_use]
    pub fn ids(&self) -> Vec<BackendId> {
        self.order.clone()
    }

    /// Default chosen at construction
    #[must_use]
    pub fn default_backend(&self) -> BackendId {
        self.default_backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    const PRIORITY: [BackendId; 5] = [
        BackendId::OpenAi,
        BackendId::Anthropic,
        BackendId::Gemini,
        BackendId::DeepSeek,
        BackendId::Groq,
    ];

    fn mock(id: BackendId) -> Arc<dyn Backend> {
        Arc::new(MockBackend::new(id))
    }

    #[test]
    fn test_empty_registry_fails() {
        let result = Registry::from_backends(Vec::new(), None, &PRIORITY);
        assert!(matches!(result, Err(Error::NoProviderConfigured)));
    }

    #[test]
    fn test_no_valid_credentials_fails() {
        let credentials = Credentials::new()
            .with(BackendId::OpenAi, "not-a-key")
            .with(BackendId::Groq, "sk-wrong-prefix-for-groq");
        let result = Registry::from_credentials(&credentials, &BTreeMap::new(), None, &PRIORITY);
        assert!(matches!(result, Err(Error::NoProviderConfigured)));
    }

    #[test]
    fn test_invalid_shapes_are_skipped() {
        let credentials = Credentials::new()
            .with(BackendId::OpenAi, "bogus")
            .with(BackendId::Groq, "gsk_abcdefghijklmnopqrstuvwxyz");
        let registry =
            Registry::from_credentials(&credentials, &BTreeMap::new(), None, &PRIORITY).unwrap();

        assert!(registry.has(BackendId::Groq));
        assert!(!registry.has(BackendId::OpenAi));
        assert_eq!(registry.ids(), vec![BackendId::Groq]);
        assert_eq!(registry.default_backend(), BackendId::Groq);
    }

    #[test]
    fn test_settings_reach_the_client() {
        let credentials =
            Credentials::new().with(BackendId::DeepSeek, "sk-abcdefghijklmnopqrstuvwxyz");
        let mut settings = BTreeMap::new();
        settings.insert(
            BackendId::DeepSeek,
            BackendSettings {
                model: Some("deepseek-reasoner".to_string()),
                ..Default::default()
            },
        );
        let registry = Registry::from_credentials(&credentials, &settings, None, &PRIORITY).unwrap();
        let backend = registry.get(BackendId::DeepSeek).unwrap();
        assert_eq!(backend.default_model(), "deepseek-reasoner");
    }

    #[test]
    fn test_get_unregistered() {
        let registry = Registry::from_backends([mock(BackendId::Gemini)], None, &PRIORITY).unwrap();
        assert!(matches!(
            registry.get(BackendId::Anthropic),
            Err(Error::NotRegistered(BackendId::Anthropic))
        ));
    }

    #[test]
    fn test_default_prefers_caller_choice() {
        let registry = Registry::from_backends(
            [mock(BackendId::OpenAi), mock(BackendId::Groq)],
            Some(BackendId::Groq),
            &PRIORITY,
        )
        .unwrap();
        assert_eq!(registry.default_backend(), BackendId::Groq);
    }

    #[test]
    fn test_default_falls_back_to_priority() {
        let registry = Registry::from_backends(
            [mock(BackendId::Groq), mock(BackendId::Gemini)],
            Some(BackendId::Anthropic),
            &PRIORITY,
        )
        .unwrap();
        assert_eq!(registry.default_backend(), BackendId::Gemini);

        // priority list that names nothing registered
        let registry =
            Registry::from_backends([mock(BackendId::Groq)], None, &[BackendId::OpenAi]).unwrap();
        assert_eq!(registry.default_backend(), BackendId::Groq);
    }

    #[test]
    fn test_ids_follow_the_priority_list() {
        let backends = [
            mock(BackendId::OpenAi),
            mock(BackendId::Groq),
            mock(BackendId::Gemini),
        ];
        let registry = Registry::from_backends(
            backends,
            None,
            &[BackendId::Groq, BackendId::OpenAi],
        )
        .unwrap();

        // gemini is missing from the priority list and comes last
        assert_eq!(
            registry.ids(),
            vec![BackendId::Groq, BackendId::OpenAi, BackendId::Gemini]
        );
        assert_eq!(registry.default_backend(), BackendId::Groq);
    }
}
