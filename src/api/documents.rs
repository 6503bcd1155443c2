use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::api::SuccessResponse;
use crate::models::{DocumentJson, DocumentPayload};
use crate::services::document_service::{self, CreateDocumentResponse, ListDocumentsResponse};
use crate::services::CurrentUser;
use crate::state::AppState;
use crate::utils::{new_document_id, AppError};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GetDocumentResponse {
    pub success: bool,
    #[serde(flatten)]
    pub document: DocumentJson,
}

/// GET /api/v1/documents - The signed-in user's documents, newest edits first
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    tag = "Documents",
    responses(
        (status = 200, description = "Own documents (without text)", body = ListDocumentsResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_documents(
    state: web::Data<AppState>,
    user: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /documents - Listing for user {}", user.user_id);

    let response = document_service::list_documents(state.store.as_ref(), &user.user_id).await?;

    log::info!("✅ Listed {} documents", response.total);
    Ok(HttpResponse::Ok().json(response))
}

/// PUT /api/v1/documents - Create a document
#[utoipa::path(
    put,
    path = "/api/v1/documents",
    tag = "Documents",
    request_body = DocumentPayload,
    responses(
        (status = 200, description = "Document created, or an error payload", body = CreateDocumentResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_document(
    state: web::Data<AppState>,
    user: web::ReqData<CurrentUser>,
    payload: web::Json<DocumentPayload>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 PUT /documents - Creating for user {}", user.user_id);

    let document_id = document_service::create_document(
        state.store.as_ref(),
        &user.user_id,
        &payload,
        &state.limits,
        new_document_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(CreateDocumentResponse {
        success: true,
        document_id,
    }))
}

/// GET /api/v1/documents/{document_id} - Fetch a document
#[utoipa::path(
    get,
    path = "/api/v1/documents/{document_id}",
    tag = "Documents",
    params(("document_id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "The document, or an error payload", body = GetDocumentResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_document(
    state: web::Data<AppState>,
    user: web::ReqData<CurrentUser>,
    document_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("📄 GET /documents/{} - user {}", document_id, user.user_id);

    let document = document_service::get_document(state.store.as_ref(), &user.user_id, &document_id).await?;

    Ok(HttpResponse::Ok().json(GetDocumentResponse {
        success: true,
        document: document.into(),
    }))
}

/// POST /api/v1/documents/{document_id} - Overwrite title, text and visibility
#[utoipa::path(
    post,
    path = "/api/v1/documents/{document_id}",
    tag = "Documents",
    params(("document_id" = String, Path, description = "Document ID")),
    request_body = DocumentPayload,
    responses(
        (status = 200, description = "Document saved, or an error payload", body = SuccessResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn save_document(
    state: web::Data<AppState>,
    user: web::ReqData<CurrentUser>,
    document_id: web::Path<String>,
    payload: web::Json<DocumentPayload>,
) -> Result<HttpResponse, AppError> {
    log::info!("💾 POST /documents/{} - Saving for user {}", document_id, user.user_id);

    document_service::save_document(
        state.store.as_ref(),
        &user.user_id,
        &document_id,
        &payload,
        &state.limits,
    )
    .await?;

    log::info!("✅ Document {} saved", document_id);
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}

/// DELETE /api/v1/documents/{document_id} - Delete a document
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{document_id}",
    tag = "Documents",
    params(("document_id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted, or an error payload", body = SuccessResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_document(
    state: web::Data<AppState>,
    user: web::ReqData<CurrentUser>,
    document_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /documents/{} - user {}", document_id, user.user_id);

    document_service::delete_document(state.store.as_ref(), &user.user_id, &document_id).await?;

    log::info!("✅ Document {} deleted", document_id);
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
