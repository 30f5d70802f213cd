//! First-run seeding: a fresh database gets one administrator account so
//! the dashboard is reachable at all. The configured password defaults to
//! the same fixed value as an admin reset and must be changed after the
//! first login.

use anyhow::Result;
use tracing::{info, warn};

use database::Database;
use entities::Role;
use user::{AccountStore, NewAccount};

use crate::config::AppConfig;

pub async fn ensure_default_admin(db: &Database, config: &AppConfig) -> Result<()> {
    let store = AccountStore::new(db);

    let has_admin = store.list(None).await?.iter().any(|u| u.admin);
    if has_admin {
        return Ok(());
    }

    store
        .create(NewAccount {
            username: config.admin_username.clone(),
            password: config.admin_password.clone(),
            name: config.admin_username.clone(),
            name_en: config.admin_username.clone(),
            admin: true,
            role: Role::Faculty,
            supervisor_id: None,
            interests: None,
            introduction: None,
            email: None,
            homepage: None,
        })
        .await?;

    info!("Seeded administrator account '{}'", config.admin_username);
    warn!("The seeded administrator uses the configured bootstrap password; change it after first login");
    Ok(())
}
