//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{ShortenerSettings, UrlService};
use crate::domain::repositories::UrlRepository;

/// Handles shared by all request handlers.
///
/// Holds the resolver over an explicit store handle; there is no global
/// database connection.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService<dyn UrlRepository>>,
}

impl AppState {
    /// Builds the state around a store.
    pub fn new(repository: Arc<dyn UrlRepository>, settings: ShortenerSettings) -> Self {
        Self {
            url_service: Arc::new(UrlService::new(repository, settings)),
        }
    }
}
