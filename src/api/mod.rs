pub mod asciidoc;
pub mod auth;
pub mod documents;
pub mod health;
pub mod swagger;

use actix_web::web;
use serde::Serialize;

use crate::config::DocumentLimits;
use crate::middleware::RequireSession;
use crate::utils::AppError;

/// Body of operations that return nothing but success.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        SuccessResponse { success: true }
    }
}

/// Any body that is not JSON of the expected shape, or is too large, is an invalid request.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            log::warn!("⚠️ Rejected body for {} {}: {}", req.method(), req.path(), err);
            AppError::InvalidRequest(err.to_string()).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig, limits: DocumentLimits) {
    cfg.app_data(json_config(limits.json_payload_limit()))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .route("/auth", web::post().to(auth::auth))
                .route("/asciidoc-to-html", web::post().to(asciidoc::asciidoc_to_html))
                .service(
                    web::resource("/logout")
                        .wrap(RequireSession)
                        .route(web::post().to(auth::logout)),
                )
                // Every document operation requires a signed-in user
                .service(
                    web::scope("/documents")
                        .wrap(RequireSession)
                        .route("", web::get().to(documents::list_documents))
                        .route("", web::put().to(documents::create_document))
                        .route("/{document_id}", web::get().to(documents::get_document))
                        .route("/{document_id}", web::post().to(documents::save_document))
                        .route("/{document_id}", web::delete().to(documents::delete_document)),
                ),
        );
}
