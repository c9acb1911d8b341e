//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::ai::{AiClient, ImageClient};
use crate::config::BackofficeConfig;
use crate::middleware::RateLimiter;
use crate::services::auth::{Argon2PasswordHasher, AuthService, TokenService};
use crate::services::{CredentialResolver, Gateway};
use crate::storage::{FileStorage, StorageError};
use crate::store::Store;
use crate::store::sync::SyncManager;
use crate::whatsapp::WhatsAppClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; owns every injected component so nothing
/// lives in module-level globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BackofficeConfig,
    store: Store,
    sync: SyncManager,
    auth: AuthService,
    rate_limiter: RateLimiter,
    credentials: CredentialResolver,
    ai: AiClient,
    image: ImageClient,
    whatsapp: WhatsAppClient,
    storage: FileStorage,
}

impl AppState {
    /// Builds the full component graph from configuration.
    ///
    /// Must run inside a Tokio runtime: collection subscriptions and the
    /// readiness timeout are spawned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub fn new(config: BackofficeConfig) -> Result<Self, StorageError> {
        Self::with_store(config, Store::new())
    }

    /// Builds state over an existing store (used by tests and the CLI to
    /// pre-seed documents).
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub fn with_store(config: BackofficeConfig, store: Store) -> Result<Self, StorageError> {
        let sync = SyncManager::start(&store, Duration::from_secs(config.ready_timeout_secs));

        let tokens = TokenService::new(&config.jwt_secret);
        let auth = AuthService::new(
            store.clone(),
            tokens,
            Arc::new(Argon2PasswordHasher::new()),
        );

        let rate_limiter = RateLimiter::new(config.rate_limit);
        let credentials = CredentialResolver::new(store.clone(), &config);

        let gateway = Gateway::new();
        let ai = AiClient::new(gateway.clone(), config.ai.model.clone());
        let image = ImageClient::new(gateway.clone(), config.image.model.clone());
        let whatsapp = WhatsAppClient::new(
            gateway,
            config.whatsapp.api_base.clone(),
            config.whatsapp.phone_number_id.clone(),
        );

        let storage = FileStorage::new(&config.data_dir, config.base_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                sync,
                auth,
                rate_limiter,
                credentials,
                ai,
                image,
                whatsapp,
                storage,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &BackofficeConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the sync manager.
    #[must_use]
    pub fn sync(&self) -> &SyncManager {
        &self.inner.sync
    }

    /// Get a reference to the auth service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// Get a reference to the credential resolver.
    #[must_use]
    pub fn credentials(&self) -> &CredentialResolver {
        &self.inner.credentials
    }

    /// Get a reference to the AI chat/planning client.
    #[must_use]
    pub fn ai(&self) -> &AiClient {
        &self.inner.ai
    }

    /// Get a reference to the image-generation client.
    #[must_use]
    pub fn image(&self) -> &ImageClient {
        &self.inner.image
    }

    /// Get a reference to the WhatsApp client.
    #[must_use]
    pub fn whatsapp(&self) -> &WhatsAppClient {
        &self.inner.whatsapp
    }

    /// Get a reference to the upload storage.
    #[must_use]
    pub fn storage(&self) -> &FileStorage {
        &self.inner.storage
    }
}
