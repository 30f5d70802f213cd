//! Process configuration: read once from the environment at startup (with
//! `.env` support for development) and injected into the services. Nothing
//! here is consulted again at runtime.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use notify::MailConfig;

/// The development signing secret. Startup refuses it outside of
/// `LABSITE_DEV=1` so a deployment cannot silently run with a known key.
const DEV_TOKEN_SECRET: &str = "labsite-dev-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub upload_root: PathBuf,
    pub data_dir: PathBuf,
    pub token_secret: String,
    pub token_lifetime_days: i64,
    pub mail: MailConfig,
    pub admin_username: String,
    pub admin_password: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = PathBuf::from(var_or("LABSITE_DATA_DIR", "data"));
        let dev_mode = var_or("LABSITE_DEV", "0") == "1";

        let token_secret = match env::var("LABSITE_TOKEN_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if dev_mode => DEV_TOKEN_SECRET.to_string(),
            _ => bail!("LABSITE_TOKEN_SECRET must be set (or run with LABSITE_DEV=1)"),
        };

        let port = var_or("LABSITE_PORT", "12475").parse()?;
        let token_lifetime_days = var_or("LABSITE_TOKEN_DAYS", "1").parse()?;

        let mail = MailConfig {
            smtp_host: var_or("LABSITE_SMTP_HOST", "localhost"),
            smtp_port: var_or("LABSITE_SMTP_PORT", "1025").parse()?,
            smtp_username: var_or("LABSITE_SMTP_USERNAME", ""),
            smtp_password: var_or("LABSITE_SMTP_PASSWORD", ""),
            from_email: var_or("LABSITE_MAIL_FROM", "noreply@labsite.local"),
            activity_list: var_or("LABSITE_ACTIVITY_LIST", "lab-all@labsite.local"),
        };

        Ok(Self {
            port,
            database_path: env::var("LABSITE_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("labsite.db")),
            upload_root: env::var("LABSITE_UPLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("uploads")),
            data_dir,
            token_secret,
            token_lifetime_days,
            mail,
            admin_username: var_or("LABSITE_ADMIN_USERNAME", "admin"),
            admin_password: var_or("LABSITE_ADMIN_PASSWORD", "123456"),
        })
    }
}
