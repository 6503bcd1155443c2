use std::sync::Arc;

use crate::config::{DocumentLimits, Settings};
use crate::database::Store;
use crate::services::{AccountProviders, AsciiDocConverter, SessionManager};

/// Shared by every worker; registered once as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub providers: AccountProviders,
    pub sessions: SessionManager,
    pub converter: AsciiDocConverter,
    pub limits: DocumentLimits,
}

impl AppState {
    pub fn new(settings: &Settings, store: Arc<dyn Store>, providers: AccountProviders) -> Self {
        AppState {
            store,
            providers,
            sessions: SessionManager::new(&settings.session),
            converter: AsciiDocConverter::new(&settings.asciidoc),
            limits: settings.limits,
        }
    }
}
