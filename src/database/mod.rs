// Storage seams: handlers and services only see these traits.
// `MongoDB` is the production implementation.

mod mongo;
#[cfg(test)]
pub mod memory;

pub use mongo::MongoDB;

use async_trait::async_trait;

use crate::models::{LinkedAccount, Session, User, UserDocument};
use crate::utils::AppError;

/// Result of an insert guarded by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same unique key already exists
    Duplicate,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Users linked to any of `accounts`, oldest first.
    async fn find_users_by_accounts(&self, accounts: &[LinkedAccount]) -> Result<Vec<User>, AppError>;

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn insert_user(&self, user: &User) -> Result<InsertOutcome, AppError>;

    async fn replace_user(&self, user: &User) -> Result<(), AppError>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert_document(&self, document: &UserDocument) -> Result<InsertOutcome, AppError>;

    async fn find_document(&self, document_id: &str) -> Result<Option<UserDocument>, AppError>;

    /// Returns false when no document with that ID exists any more.
    async fn replace_document(&self, document: &UserDocument) -> Result<bool, AppError>;

    /// Returns false when nothing was deleted.
    async fn delete_document(&self, document_id: &str) -> Result<bool, AppError>;

    /// Documents owned by `owner_id`, most recently updated first.
    async fn list_documents_by_owner(&self, owner_id: &str) -> Result<Vec<UserDocument>, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<(), AppError>;

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, AppError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), AppError>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait Store: UserRepository + DocumentRepository + SessionRepository {
    /// Round trip to the backing database.
    async fn ping(&self) -> Result<(), AppError>;
}
