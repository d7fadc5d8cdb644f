pub mod capabilities;
pub mod config;
pub mod logging;
pub mod provider;
pub mod screens;
pub mod session;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::capabilities::Capabilities;
use crate::config::Config;
use crate::provider::{ContentService, GeminiProvider};
use crate::session::LearnerSession;
use crate::store::{FileBackend, StateStore};

/// Everything a front end needs: the live session and content access.
pub struct AppRuntime {
    pub session: LearnerSession,
    pub content: ContentService,
}

pub fn content_service(config: &Config) -> ContentService {
    if config.wants_provider() {
        info!(model = %config.gemini.text_model, "using Gemini content provider");
        ContentService::new(Arc::new(GeminiProvider::new(config.gemini.clone())))
    } else {
        info!(offline = config.offline, "no content provider configured, serving offline content");
        ContentService::offline()
    }
}

pub fn create_runtime(config: &Config, capabilities: Capabilities) -> AppRuntime {
    let backend = Arc::new(FileBackend::new(config.data_dir.clone()));
    let store = StateStore::new(backend, config.unlock_policy);
    let session = LearnerSession::open_today(store, capabilities);
    AppRuntime { session, content: content_service(config) }
}
