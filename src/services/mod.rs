pub mod account_providers;
pub mod asciidoc_service;
pub mod auth_service;
pub mod document_service;
pub mod session_service;

pub use account_providers::AccountProviders;
pub use asciidoc_service::AsciiDocConverter;
pub use session_service::{CurrentUser, SessionManager, SESSION_COOKIE_NAME};
