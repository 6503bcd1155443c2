// ==================== ACCOUNT PROVIDERS ====================
// Verifies tokens the browser obtained from a third-party login before the
// identity is linked to a local user.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;

const GOOGLE_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Whether `auth_token` was issued by this provider to `user_id`.
    ///
    /// Network or provider failures count as an invalid token.
    async fn is_token_valid(&self, user_id: &str, auth_token: &str) -> bool;
}

/// Providers keyed by `account_provider_type`.
#[derive(Clone, Default)]
pub struct AccountProviders {
    providers: HashMap<String, Arc<dyn AccountProvider>>,
}

impl AccountProviders {
    pub fn from_settings(settings: &Settings) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        if settings.google_client_id.is_none() {
            log::warn!("⚠️  GOOGLE_CLIENT_ID not set, Google token audience will not be checked");
        }

        Ok(Self::default()
            .with_provider(
                "google",
                GoogleProvider {
                    http: http.clone(),
                    client_id: settings.google_client_id.clone(),
                },
            )
            .with_provider("github", GitHubProvider { http }))
    }

    pub fn with_provider<P>(mut self, provider_type: &str, provider: P) -> Self
    where
        P: AccountProvider + 'static,
    {
        self.providers.insert(provider_type.to_string(), Arc::new(provider));
        self
    }

    pub fn get(&self, provider_type: &str) -> Option<&Arc<dyn AccountProvider>> {
        self.providers.get(provider_type)
    }
}

// ==================== GOOGLE ====================

/// Response of Google's tokeninfo endpoint (fields we check)
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    sub: Option<String>,
    aud: Option<String>,
    azp: Option<String>,
}

impl GoogleTokenInfo {
    fn matches(&self, user_id: &str, client_id: Option<&str>) -> bool {
        if self.sub.as_deref() != Some(user_id) {
            return false;
        }
        match client_id {
            Some(client_id) => {
                self.aud.as_deref() == Some(client_id) || self.azp.as_deref() == Some(client_id)
            }
            None => true,
        }
    }
}

pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: Option<String>,
}

#[async_trait]
impl AccountProvider for GoogleProvider {
    async fn is_token_valid(&self, user_id: &str, auth_token: &str) -> bool {
        let url = format!(
            "{}?access_token={}",
            GOOGLE_TOKENINFO_URL,
            urlencoding::encode(auth_token)
        );

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("⚠️  Google tokeninfo request failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            log::info!("🔒 Google rejected token for {} ({})", user_id, response.status());
            return false;
        }

        match response.json::<GoogleTokenInfo>().await {
            Ok(info) => info.matches(user_id, self.client_id.as_deref()),
            Err(e) => {
                log::warn!("⚠️  Failed to parse Google tokeninfo: {}", e);
                false
            }
        }
    }
}

// ==================== GITHUB ====================

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
}

pub struct GitHubProvider {
    http: reqwest::Client,
}

#[async_trait]
impl AccountProvider for GitHubProvider {
    async fn is_token_valid(&self, user_id: &str, auth_token: &str) -> bool {
        let response = match self
            .http
            .get(GITHUB_USER_URL)
            .header("Authorization", format!("Bearer {}", auth_token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("⚠️  GitHub user request failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            log::info!("🔒 GitHub rejected token for {} ({})", user_id, response.status());
            return false;
        }

        match response.json::<GitHubUser>().await {
            Ok(user) => user.id.to_string() == user_id,
            Err(e) => {
                log::warn!("⚠️  Failed to parse GitHub user: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_info(sub: &str, aud: &str, azp: &str) -> GoogleTokenInfo {
        GoogleTokenInfo {
            sub: Some(sub.into()),
            aud: Some(aud.into()),
            azp: Some(azp.into()),
        }
    }

    #[test]
    fn test_google_token_must_belong_to_user() {
        let info = token_info("123", "client", "client");
        assert!(info.matches("123", None));
        assert!(!info.matches("456", None));
    }

    #[test]
    fn test_google_token_audience_checked_when_configured() {
        let info = token_info("123", "other-app", "other-app");
        assert!(!info.matches("123", Some("client")));

        let info = token_info("123", "other-app", "client");
        assert!(info.matches("123", Some("client")));
    }

    #[test]
    fn test_google_token_without_subject() {
        let info = GoogleTokenInfo { sub: None, aud: None, azp: None };
        assert!(!info.matches("123", None));
    }

    #[test]
    fn test_registry_lookup() {
        let settings = Settings::from_lookup(|key| match key {
            "DATABASE_URL" => Some("mongodb://localhost/test".to_string()),
            _ => None,
        })
        .unwrap();
        let providers = AccountProviders::from_settings(&settings).unwrap();

        assert!(providers.get("google").is_some());
        assert!(providers.get("github").is_some());
        assert!(providers.get("myspace").is_none());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_google_rejects_garbage_token() {
        let provider = GoogleProvider {
            http: reqwest::Client::new(),
            client_id: None,
        };
        assert!(!provider.is_token_valid("123", "not-a-token").await);
    }
}
