//! Shared application state handed to every handler.

use std::sync::Arc;

use bazaar_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig, mailer: Arc<dyn Mailer>) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.token_lifetime_secs);

        AppState {
            db,
            jwt: Arc::new(jwt),
            mailer,
            config: Arc::new(config),
        }
    }
}
