use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;
use std::time::Duration;

use super::{DocumentRepository, InsertOutcome, SessionRepository, Store, UserRepository};
use crate::models::{LinkedAccount, Session, User, UserDocument};
use crate::utils::AppError;

const USERS: &str = "users";
const DOCUMENTS: &str = "documents";
const SESSIONS: &str = "sessions";

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        // Database name comes from the URI path
        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| "asciidoc_editor".to_string());

        let client = Client::with_options(client_options)?;

        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the API relies on; unique ones back the ID retry loops.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        self.ensure_index(USERS, doc! { "user_id": 1 }, Some(unique())).await?;
        self.ensure_index(
            USERS,
            doc! { "accounts.account_provider_type": 1, "accounts.provider_user_id": 1 },
            Some(unique()),
        )
        .await?;

        self.ensure_index(DOCUMENTS, doc! { "document_id": 1 }, Some(unique())).await?;
        self.ensure_index(DOCUMENTS, doc! { "owner_id": 1, "updated_at": -1 }, None).await?;

        self.ensure_index(SESSIONS, doc! { "session_id": 1 }, Some(unique())).await?;
        // Expired sessions are purged by MongoDB itself
        self.ensure_index(
            SESSIONS,
            doc! { "expires_at": 1 },
            Some(IndexOptions::builder().expire_after(Duration::from_secs(0)).build()),
        )
        .await?;

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    async fn ensure_index(
        &self,
        collection: &str,
        keys: Document,
        options: Option<IndexOptions>,
    ) -> Result<(), Box<dyn Error>> {
        let label = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
        let index = IndexModel::builder().keys(keys).options(options).build();

        match self.collection::<Document>(collection).create_index(index).await {
            Ok(_) => {
                log::info!("   ✅ Index ready: {}", label);
                Ok(())
            }
            Err(e) => {
                log::error!("   ❌ Failed to create index {}: {}", label, e);
                Err(Box::new(e))
            }
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

fn insert_outcome(result: mongodb::error::Result<mongodb::results::InsertOneResult>) -> Result<InsertOutcome, AppError> {
    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::Duplicate),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl UserRepository for MongoDB {
    async fn find_users_by_accounts(&self, accounts: &[LinkedAccount]) -> Result<Vec<User>, AppError> {
        if accounts.is_empty() {
            return Ok(Vec::new());
        }

        let clauses: Vec<Document> = accounts
            .iter()
            .map(|account| {
                doc! {
                    "accounts": {
                        "$elemMatch": {
                            "account_provider_type": &account.account_provider_type,
                            "provider_user_id": &account.provider_user_id,
                        }
                    }
                }
            })
            .collect();

        let cursor = self
            .collection::<User>(USERS)
            .find(doc! { "$or": clauses })
            .sort(doc! { "created_at": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "user_id": user_id })
            .await?)
    }

    async fn insert_user(&self, user: &User) -> Result<InsertOutcome, AppError> {
        insert_outcome(self.collection::<User>(USERS).insert_one(user).await)
    }

    async fn replace_user(&self, user: &User) -> Result<(), AppError> {
        self.collection::<User>(USERS)
            .replace_one(doc! { "user_id": &user.user_id }, user)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for MongoDB {
    async fn insert_document(&self, document: &UserDocument) -> Result<InsertOutcome, AppError> {
        insert_outcome(
            self.collection::<UserDocument>(DOCUMENTS)
                .insert_one(document)
                .await,
        )
    }

    async fn find_document(&self, document_id: &str) -> Result<Option<UserDocument>, AppError> {
        Ok(self
            .collection::<UserDocument>(DOCUMENTS)
            .find_one(doc! { "document_id": document_id })
            .await?)
    }

    async fn replace_document(&self, document: &UserDocument) -> Result<bool, AppError> {
        let result = self
            .collection::<UserDocument>(DOCUMENTS)
            .replace_one(doc! { "document_id": &document.document_id }, document)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool, AppError> {
        let result = self
            .collection::<UserDocument>(DOCUMENTS)
            .delete_one(doc! { "document_id": document_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_documents_by_owner(&self, owner_id: &str) -> Result<Vec<UserDocument>, AppError> {
        let cursor = self
            .collection::<UserDocument>(DOCUMENTS)
            .find(doc! { "owner_id": owner_id })
            .sort(doc! { "updated_at": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl SessionRepository for MongoDB {
    async fn insert_session(&self, session: &Session) -> Result<(), AppError> {
        self.collection::<Session>(SESSIONS).insert_one(session).await?;
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        Ok(self
            .collection::<Session>(SESSIONS)
            .find_one(doc! { "session_id": session_id })
            .await?)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        self.collection::<Session>(SESSIONS)
            .delete_one(doc! { "session_id": session_id })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_document_id_is_unique() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/asciidoc_editor_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let mut document = UserDocument::new("owner");
        document.document_id = crate::utils::new_document_id();
        document.visibility = Visibility::Private;
        document.text = "= Title".into();

        assert_eq!(db.insert_document(&document).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(db.insert_document(&document).await.unwrap(), InsertOutcome::Duplicate);
        assert!(db.replace_document(&document).await.unwrap());
        assert!(db.delete_document(&document.document_id).await.unwrap());
        assert!(!db.replace_document(&document).await.unwrap());
        db.ping().await.unwrap();
    }
}
