//! # Bazaar API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browser / client ───► HTTP (8080) ───► handlers ───► SQLite (WAL)     │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                     Mailer (log)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use bazaar_api::mailer::{LogMailer, Mailer};
use bazaar_api::{routes, ApiConfig, AppState};
use bazaar_db::{Database, DbConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load()?;
    bazaar_api::init_tracing(&config.log_level);

    info!("Starting Bazaar API server...");

    if config.uses_dev_secret() {
        warn!("Using the built-in development JWT secret; set BAZAAR_JWT_SECRET in production");
    }

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.max_connections),
    )
    .await?;
    info!(path = %config.database_path, "Database ready");

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.mail_from.clone()));
    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer);

    info!(address = %bind_address, "Listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
