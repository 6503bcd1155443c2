//! Fixtures shared by the handler and service tests.

use actix_web::cookie::Cookie;
use actix_web::web;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AsciiDocSettings, DocumentLimits, SessionSettings};
use crate::database::memory::MemoryStore;
use crate::models::LinkedAccount;
use crate::services::account_providers::AccountProvider;
use crate::services::auth_service::find_or_create_user;
use crate::services::{AccountProviders, AsciiDocConverter, SessionManager};
use crate::state::AppState;

pub const TEST_MAX_TEXT: usize = 50;
pub const TEST_MAX_TITLE: usize = 20;

/// The only token [`FakeProvider`] accepts for `user_id`.
pub fn token_for(user_id: &str) -> String {
    format!("token-for-{}", user_id)
}

pub struct FakeProvider;

#[async_trait]
impl AccountProvider for FakeProvider {
    async fn is_token_valid(&self, user_id: &str, auth_token: &str) -> bool {
        auth_token == token_for(user_id)
    }
}

pub fn fake_providers() -> AccountProviders {
    AccountProviders::default()
        .with_provider("google", FakeProvider)
        .with_provider("github", FakeProvider)
}

/// App state over an in-memory store, small limits and `cat` as the converter.
pub fn test_state() -> (web::Data<AppState>, Arc<MemoryStore>) {
    test_state_with_limits(DocumentLimits {
        max_source_text_size: TEST_MAX_TEXT,
        max_title_size: TEST_MAX_TITLE,
    })
}

pub fn test_state_with_limits(limits: DocumentLimits) -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        store: store.clone(),
        providers: fake_providers(),
        sessions: SessionManager::new(&SessionSettings {
            secret: "test-secret".into(),
            ttl_days: 1,
            cookie_secure: false,
        }),
        converter: AsciiDocConverter::new(&AsciiDocSettings {
            command: "cat".into(),
            args: Vec::new(),
            timeout: Duration::from_secs(5),
        }),
        limits,
    };

    (web::Data::new(state), store)
}

/// Signs in as the Google identity `provider_user_id`, returning the local
/// user ID and a session cookie.
pub async fn sign_in(state: &AppState, provider_user_id: &str) -> (String, Cookie<'static>) {
    let account = LinkedAccount {
        account_provider_type: "google".into(),
        provider_user_id: provider_user_id.into(),
        data: serde_json::Value::Null,
    };
    let user = find_or_create_user(state.store.as_ref(), vec![account])
        .await
        .expect("sign in");
    let token = state
        .sessions
        .start(state.store.as_ref(), &user.user_id)
        .await
        .expect("start session");

    (user.user_id, state.sessions.cookie(token))
}

/// Builds the API service around `state` (a `web::Data<AppState>`).
macro_rules! test_app {
    ($state:expr) => {{
        let state: actix_web::web::Data<$crate::state::AppState> = $state.clone();
        let limits = state.limits;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(state)
                .configure(move |cfg| $crate::api::configure(cfg, limits)),
        )
        .await
    }};
}

pub(crate) use test_app;
