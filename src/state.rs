use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::router::IntentRouter;
use crate::services::session::SessionStore;

pub struct AppState {
    pub config: AppConfig,
    pub router: Arc<IntentRouter>,
    pub sessions: SessionStore,
}
