// ==================== USER DOCUMENTS ====================
// Create / read / overwrite / delete with visibility checks.
// Missing documents map to InvalidDocumentId, permission failures to NotAuthenticated.

use serde::Serialize;

use crate::config::DocumentLimits;
use crate::database::{InsertOutcome, Store};
use crate::models::{DocumentPayload, DocumentSummary, UserDocument};
use crate::utils::{is_valid_document_id, AppError};

/// Give up after this many consecutive ID collisions.
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CreateDocumentResponse {
    pub success: bool,
    pub document_id: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListDocumentsResponse {
    pub success: bool,
    pub documents: Vec<DocumentSummary>,
    pub total: usize,
}

/// Rejects a missing `text` or one longer than the configured maximum (in characters).
pub fn require_text<'a>(text: Option<&'a str>, limits: &DocumentLimits) -> Result<&'a str, AppError> {
    let text = text.ok_or_else(|| AppError::InvalidRequest("missing text".into()))?;

    if text.chars().count() > limits.max_source_text_size {
        return Err(AppError::InvalidRequest(format!(
            "text longer than {} characters",
            limits.max_source_text_size
        )));
    }

    Ok(text)
}

async fn load(store: &dyn Store, document_id: &str) -> Result<UserDocument, AppError> {
    if !is_valid_document_id(document_id) {
        return Err(AppError::InvalidDocumentId(document_id.to_string()));
    }

    store
        .find_document(document_id)
        .await?
        .ok_or_else(|| AppError::InvalidDocumentId(document_id.to_string()))
}

/// Saves a new document owned by `owner_id` and returns its ID.
///
/// `next_id` is called for every attempt; a collision with an existing ID
/// is retried with a fresh one.
pub async fn create_document<F>(
    store: &dyn Store,
    owner_id: &str,
    payload: &DocumentPayload,
    limits: &DocumentLimits,
    mut next_id: F,
) -> Result<String, AppError>
where
    F: FnMut() -> String,
{
    require_text(payload.text.as_deref(), limits)?;

    let mut document = UserDocument::new(owner_id);
    document.apply_payload(payload, limits.max_title_size)?;

    for _ in 0..MAX_ID_ATTEMPTS {
        document.document_id = next_id();

        match store.insert_document(&document).await? {
            InsertOutcome::Inserted => {
                log::info!("✅ Document {} created by {}", document.document_id, owner_id);
                return Ok(document.document_id);
            }
            InsertOutcome::Duplicate => {
                log::debug!("🔁 Document ID {} taken, retrying", document.document_id);
            }
        }
    }

    Err(AppError::Internal(format!(
        "no free document ID after {} attempts",
        MAX_ID_ATTEMPTS
    )))
}

pub async fn get_document(store: &dyn Store, user_id: &str, document_id: &str) -> Result<UserDocument, AppError> {
    let document = load(store, document_id).await?;

    if !document.is_readable_by(Some(user_id)) {
        log::warn!("⚠️ {} may not read document {}", user_id, document_id);
        return Err(AppError::NotAuthenticated);
    }

    Ok(document)
}

/// Overwrites title, text and visibility of an existing document.
pub async fn save_document(
    store: &dyn Store,
    user_id: &str,
    document_id: &str,
    payload: &DocumentPayload,
    limits: &DocumentLimits,
) -> Result<(), AppError> {
    require_text(payload.text.as_deref(), limits)?;

    let mut document = load(store, document_id).await?;

    if !document.is_writable_by(Some(user_id)) {
        log::warn!("⚠️ {} may not write document {}", user_id, document_id);
        return Err(AppError::NotAuthenticated);
    }

    document.apply_payload(payload, limits.max_title_size)?;

    if !store.replace_document(&document).await? {
        // Deleted concurrently
        return Err(AppError::InvalidDocumentId(document_id.to_string()));
    }

    Ok(())
}

pub async fn delete_document(store: &dyn Store, user_id: &str, document_id: &str) -> Result<(), AppError> {
    let document = load(store, document_id).await?;

    if !document.is_writable_by(Some(user_id)) {
        log::warn!("⚠️ {} may not delete document {}", user_id, document_id);
        return Err(AppError::NotAuthenticated);
    }

    if !store.delete_document(document_id).await? {
        // Deleted concurrently
        return Err(AppError::InvalidDocumentId(document_id.to_string()));
    }

    Ok(())
}

pub async fn list_documents(store: &dyn Store, owner_id: &str) -> Result<ListDocumentsResponse, AppError> {
    let documents: Vec<DocumentSummary> = store
        .list_documents_by_owner(owner_id)
        .await?
        .into_iter()
        .map(DocumentSummary::from)
        .collect();

    Ok(ListDocumentsResponse {
        success: true,
        total: documents.len(),
        documents,
    })
}
