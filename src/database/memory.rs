//! In-process store with the same uniqueness rules as the MongoDB indexes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{DocumentRepository, InsertOutcome, SessionRepository, Store, UserRepository};
use crate::models::{LinkedAccount, Session, User, UserDocument};
use crate::utils::AppError;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    documents: Mutex<HashMap<String, UserDocument>>,
    sessions: Mutex<HashMap<String, Session>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::DatabaseError("memory store poisoned".into()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_users_by_accounts(&self, accounts: &[LinkedAccount]) -> Result<Vec<User>, AppError> {
        let users = lock(&self.users)?;
        let mut found: Vec<User> = users
            .iter()
            .filter(|user| accounts.iter().any(|account| user.has_account(account)))
            .cloned()
            .collect();
        found.sort_by_key(|user| user.created_at);
        Ok(found)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let users = lock(&self.users)?;
        Ok(users.iter().find(|user| user.user_id == user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<InsertOutcome, AppError> {
        let mut users = lock(&self.users)?;
        let taken = users.iter().any(|existing| {
            existing.user_id == user.user_id
                || user.accounts.iter().any(|account| existing.has_account(account))
        });
        if taken {
            return Ok(InsertOutcome::Duplicate);
        }
        users.push(user.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn replace_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = lock(&self.users)?;
        if let Some(existing) = users.iter_mut().find(|existing| existing.user_id == user.user_id) {
            *existing = user.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn insert_document(&self, document: &UserDocument) -> Result<InsertOutcome, AppError> {
        let mut documents = lock(&self.documents)?;
        if documents.contains_key(&document.document_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        documents.insert(document.document_id.clone(), document.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_document(&self, document_id: &str) -> Result<Option<UserDocument>, AppError> {
        Ok(lock(&self.documents)?.get(document_id).cloned())
    }

    async fn replace_document(&self, document: &UserDocument) -> Result<bool, AppError> {
        let mut documents = lock(&self.documents)?;
        match documents.get_mut(&document.document_id) {
            Some(existing) => {
                *existing = document.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool, AppError> {
        Ok(lock(&self.documents)?.remove(document_id).is_some())
    }

    async fn list_documents_by_owner(&self, owner_id: &str) -> Result<Vec<UserDocument>, AppError> {
        let documents = lock(&self.documents)?;
        let mut owned: Vec<UserDocument> = documents
            .values()
            .filter(|document| document.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert_session(&self, session: &Session) -> Result<(), AppError> {
        lock(&self.sessions)?.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        Ok(lock(&self.sessions)?.get(session_id).cloned())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        lock(&self.sessions)?.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        lock(&self.documents).map(|_| ())
    }
}
