use serde::{Deserialize, Serialize};

use crate::database::{InsertOutcome, Store};
use crate::models::{LinkedAccount, User};
use crate::services::account_providers::AccountProviders;
use crate::utils::AppError;

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AuthRequest {
    pub accounts: Option<Vec<AccountAssertion>>,
}

/// One identity the browser signed in with.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AccountAssertion {
    pub account_provider_type: Option<String>,
    /// The user's ID with the account provider
    pub user_id: Option<String>,
    /// Token obtained from the provider
    pub auth_token: Option<String>,
    /// Extra profile data from the provider; format depends on the provider
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    /// Our site's user ID
    pub user_id: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Verifies every assertion with its provider, then finds or creates the user.
///
/// Assertions are checked in order; the first bad one decides the error.
pub async fn authenticate(
    store: &dyn Store,
    providers: &AccountProviders,
    request: &AuthRequest,
) -> Result<User, AppError> {
    let assertions = match &request.accounts {
        Some(accounts) if !accounts.is_empty() => accounts,
        _ => return Err(AppError::InvalidRequest("no accounts".into())),
    };

    let mut accounts = Vec::with_capacity(assertions.len());

    for assertion in assertions {
        let (provider_type, user_id, auth_token) = match (
            non_empty(&assertion.account_provider_type),
            non_empty(&assertion.user_id),
            non_empty(&assertion.auth_token),
        ) {
            (Some(p), Some(u), Some(t)) => (p, u, t),
            _ => return Err(AppError::InvalidRequest("incomplete account".into())),
        };

        let provider = providers.get(provider_type).ok_or_else(|| {
            AppError::InvalidRequest(format!("unknown account provider '{}'", provider_type))
        })?;

        if !provider.is_token_valid(user_id, auth_token).await {
            return Err(AppError::InvalidToken(format!("{}:{}", provider_type, user_id)));
        }

        accounts.push(LinkedAccount {
            account_provider_type: provider_type.to_string(),
            provider_user_id: user_id.to_string(),
            data: assertion.data.clone(),
        });
    }

    // All accounts valid
    find_or_create_user(store, accounts).await
}

/// Returns the user linked to any of `accounts`, linking the rest to it,
/// or creates a new user holding all of them.
///
/// When the identities belong to several users, the oldest one wins and
/// identities already linked elsewhere stay where they are.
pub async fn find_or_create_user(store: &dyn Store, accounts: Vec<LinkedAccount>) -> Result<User, AppError> {
    // A concurrent first login may create the user between our lookup and insert
    for _ in 0..2 {
        let existing = store.find_users_by_accounts(&accounts).await?;

        if let Some(mut user) = existing.first().cloned() {
            let others = &existing[1..];
            for account in &accounts {
                let linked_elsewhere = others.iter().any(|other| other.has_account(account));
                if !linked_elsewhere {
                    user.link_account(account.clone());
                }
            }
            user.last_login = chrono::Utc::now().timestamp();
            store.replace_user(&user).await?;

            log::info!("✅ Found existing user: {}", user.user_id);
            return Ok(user);
        }

        let user = User::new(accounts.clone());
        match store.insert_user(&user).await? {
            InsertOutcome::Inserted => {
                log::info!("✅ Created new user: {}", user.user_id);
                return Ok(user);
            }
            InsertOutcome::Duplicate => {
                log::debug!("🔁 User created concurrently, looking up again");
            }
        }
    }

    Err(AppError::Internal("could not find or create user".into()))
}
