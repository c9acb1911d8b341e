//! Integration test harness for the Meridian Voyages back-office.
//!
//! Each test boots the full application - store, sync manager, router,
//! middleware - on an ephemeral port and drives it over HTTP with
//! reqwest. No external services are required: the document store is
//! in-process and provider endpoints are never called (provider tests
//! assert the validation and configuration failure paths).

use std::path::PathBuf;

use secrecy::SecretString;
use serde_json::{Value, json};

use meridian_backoffice::config::{AiConfig, BackofficeConfig, ImageConfig, RateLimitConfig, WhatsAppConfig};
use meridian_backoffice::seed::seed_system_roles;
use meridian_backoffice::services::auth::CreateUserInput;
use meridian_backoffice::state::AppState;
use meridian_core::{BuiltinRole, Email, UserId};

/// Password used for every account the harness creates.
pub const TEST_PASSWORD: &str = "fJ8kQ2mxZ7pW4nR9vB1c";

/// A running back-office instance bound to an ephemeral port.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub state: AppState,
    data_dir: PathBuf,
}

impl TestContext {
    /// Boots a fresh instance with the default rate limit.
    ///
    /// # Panics
    ///
    /// Panics on any setup failure; tests cannot proceed without a
    /// running instance.
    pub async fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig::default()).await
    }

    /// Boots a fresh instance with a custom rate limit.
    ///
    /// # Panics
    ///
    /// Panics on any setup failure.
    pub async fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        let data_dir =
            std::env::temp_dir().join(format!("meridian-it-{}", UserId::generate()));

        let config = BackofficeConfig {
            host: "127.0.0.1".parse().expect("loopback"),
            port: 0,
            base_url: "http://localhost".to_owned(),
            jwt_secret: SecretString::from("kQ2m8fJx7ZpW4nR9vB1cT6yH3aD5gE0u".to_owned()),
            primary_admin_email: "admin@meridianvoyages.travel".to_owned(),
            primary_admin_password: None,
            data_dir: data_dir.clone(),
            ai: AiConfig {
                api_key: None,
                model: "claude-sonnet-4-20250514".to_owned(),
            },
            image: ImageConfig {
                api_key: None,
                model: "gpt-image-1".to_owned(),
            },
            whatsapp: WhatsAppConfig {
                api_base: "http://127.0.0.1:1/v19.0".to_owned(),
                phone_number_id: None,
                access_token: None,
            },
            rate_limit,
            ready_timeout_secs: 10,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let state = AppState::new(config).expect("application state");
        seed_system_roles(state.store());

        let app = meridian_backoffice::app(&state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            state,
            data_dir,
        }
    }

    /// Creates an account with the given roles directly in the store.
    pub fn create_account(&self, email: &str, roles: Vec<BuiltinRole>) -> UserId {
        let (user, _) = self
            .state
            .auth()
            .create_user(CreateUserInput {
                email: Email::parse(email).expect("valid email"),
                name: format!("Test {email}"),
                phone_numbers: vec![],
                roles,
                custom_role_ids: vec![],
                direct_permissions: vec![],
                password: Some(TEST_PASSWORD.to_owned()),
            })
            .expect("create account");
        user.id
    }

    /// Signs an account in over HTTP and returns its bearer token.
    ///
    /// # Panics
    ///
    /// Panics when the login is rejected.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request");
        assert!(
            response.status().is_success(),
            "login failed: {}",
            response.status()
        );

        let body: Value = response.json().await.expect("login body");
        body["data"]["token"]
            .as_str()
            .expect("token in response")
            .to_owned()
    }

    /// Shorthand: create an account and sign it in.
    pub async fn token_for(&self, email: &str, roles: Vec<BuiltinRole>) -> String {
        self.create_account(email, roles);
        self.login(email, TEST_PASSWORD).await
    }

    /// An admin account token.
    pub async fn admin_token(&self) -> String {
        self.token_for(
            "admin@meridianvoyages.travel",
            vec![BuiltinRole::Admin],
        )
        .await
    }

    /// An agent account token.
    pub async fn agent_token(&self) -> String {
        self.token_for("agent@meridianvoyages.travel", vec![BuiltinRole::Agent])
            .await
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}
