use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// An external identity linked to a local user.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LinkedAccount {
    /// Provider key, e.g. "google" or "github"
    pub account_provider_type: String,
    /// The user's ID at the provider
    pub provider_user_id: String,
    /// Profile payload sent by the client after login; format depends on the provider
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LinkedAccount {
    pub fn matches(&self, other: &LinkedAccount) -> bool {
        self.account_provider_type == other.account_provider_type
            && self.provider_user_id == other.provider_user_id
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,  // PRIMARY IDENTIFIER
    pub accounts: Vec<LinkedAccount>,
    pub created_at: i64,
    pub last_login: i64,
}

impl User {
    pub fn new(accounts: Vec<LinkedAccount>) -> Self {
        let now = chrono::Utc::now().timestamp();
        User {
            _id: None,
            user_id: ObjectId::new().to_hex(),
            accounts,
            created_at: now,
            last_login: now,
        }
    }

    pub fn has_account(&self, account: &LinkedAccount) -> bool {
        self.accounts.iter().any(|linked| linked.matches(account))
    }

    /// Links `account`, or refreshes its `data` if it is already linked.
    pub fn link_account(&mut self, account: LinkedAccount) {
        match self.accounts.iter_mut().find(|linked| linked.matches(&account)) {
            Some(linked) => linked.data = account.data,
            None => self.accounts.push(account),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(provider: &str, id: &str, data: serde_json::Value) -> LinkedAccount {
        LinkedAccount {
            account_provider_type: provider.into(),
            provider_user_id: id.into(),
            data,
        }
    }

    #[test]
    fn test_link_account_adds_and_refreshes() {
        let mut user = User::new(vec![account("google", "1", json!({"name": "Old"}))]);

        user.link_account(account("google", "1", json!({"name": "New"})));
        assert_eq!(user.accounts.len(), 1);
        assert_eq!(user.accounts[0].data["name"], "New");

        user.link_account(account("github", "1", json!(null)));
        assert_eq!(user.accounts.len(), 2);
        assert!(user.has_account(&account("github", "1", json!(null))));
        assert!(!user.has_account(&account("github", "2", json!(null))));
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        let a = User::new(vec![]);
        let b = User::new(vec![]);
        assert_ne!(a.user_id, b.user_id);
    }
}
