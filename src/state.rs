//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::services::credential_service::CredentialService;
use crate::services::summary_service::SummaryService;
use crate::store::SharedCredentialStore;

/// Cloned into each request by Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub summaries: Arc<SummaryService>,
}

impl AppState {
    pub fn new(store: SharedCredentialStore, summaries: SummaryService) -> Self {
        Self {
            credentials: Arc::new(CredentialService::new(store)),
            summaries: Arc::new(summaries),
        }
    }
}
