//! The `labsite` server binary: load configuration, initialise logging,
//! open the database, seed the first administrator and serve.

mod bootstrap;
mod config;
mod logging;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use api::{ApiConfig, AppState, UploadConfig};
use authz::PolicyEngine;
use database::Database;
use notify::Mailer;
use user::TokenService;

use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _guard = logging::init_logging(&config.data_dir)?;

    let database_path = config
        .database_path
        .to_str()
        .context("database path is not valid UTF-8")?;
    let db = Arc::new(Database::open(database_path).await?);

    bootstrap::ensure_default_admin(&db, &config).await?;

    let state = AppState {
        db,
        tokens: Arc::new(TokenService::new(
            &config.token_secret,
            config.token_lifetime_days,
        )),
        policy: Arc::new(PolicyEngine::new()?),
        mailer: Arc::new(Mailer::new(config.mail.clone())),
        uploads: Arc::new(UploadConfig::new(&config.upload_root)),
    };

    api::start_server(state, ApiConfig::new().with_port(config.port))
        .await
        .map_err(|e| anyhow!("server error: {e}"))
}
