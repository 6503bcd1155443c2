use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::services::SESSION_COOKIE_NAME;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AsciiDoc Editor API",
        version = "1.0.0",
        description = "Backend for the browser AsciiDoc editor.\n\n**Authentication:** sign in with `POST /api/v1/auth`; the response sets a session cookie that document endpoints require.\n\n**Errors:** client errors are HTTP 200 with `{\"success\": false, \"error_message\": ...}`."
    ),
    paths(
        // Auth
        crate::api::auth::auth,
        crate::api::auth::logout,

        // Documents
        crate::api::documents::list_documents,
        crate::api::documents::create_document,
        crate::api::documents::get_document,
        crate::api::documents::save_document,
        crate::api::documents::delete_document,

        // AsciiDoc
        crate::api::asciidoc::asciidoc_to_html,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::AuthRequest,
            crate::services::auth_service::AccountAssertion,
            crate::services::auth_service::AuthResponse,
            crate::models::DocumentPayload,
            crate::models::DocumentJson,
            crate::models::DocumentSummary,
            crate::models::Visibility,
            crate::api::documents::GetDocumentResponse,
            crate::services::document_service::CreateDocumentResponse,
            crate::services::document_service::ListDocumentsResponse,
            crate::api::asciidoc::AsciiDocRequest,
            crate::services::asciidoc_service::AsciiDocResponse,
            crate::api::SuccessResponse,
            crate::utils::ErrorResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Sign in with provider identities and sign out."),
        (name = "Documents", description = "Create, read, save and delete AsciiDoc documents."),
        (name = "AsciiDoc", description = "Server-side AsciiDoc to HTML rendering."),
        (name = "Health", description = "Health check."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Set by POST /api/v1/auth",
                ))),
            );
        }
    }
}
