//! Schema creation. Every statement is idempotent so `run` can execute on
//! every startup.

use tracing::info;

use crate::{Database, Result};

const SCHEMA: &[&str] = &[
    // Accounts. `photo` defaults to the shared placeholder avatar.
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        name_en TEXT NOT NULL,
        supervisor_id TEXT REFERENCES users(id) ON DELETE SET NULL,
        admin INTEGER NOT NULL DEFAULT 0,
        role INTEGER NOT NULL DEFAULT 0,
        interests TEXT,
        introduction TEXT,
        email TEXT,
        homepage TEXT,
        photo TEXT NOT NULL DEFAULT '/img/no_avatar.png',
        graduate INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS groups (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        category INTEGER NOT NULL DEFAULT 0,
        parent_id TEXT REFERENCES groups(id) ON DELETE SET NULL
    )
    "#,
    // Membership set: deleting either side removes the reference with it.
    r#"
    CREATE TABLE IF NOT EXISTS user_groups (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, group_id)
    )
    "#,
    // Sub-records owned by exactly one account. The owner column makes
    // detach and delete a single statement, so orphans cannot arise.
    r#"
    CREATE TABLE IF NOT EXISTS publications (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        venue TEXT NOT NULL,
        kind INTEGER NOT NULL DEFAULT 0,
        date TIMESTAMP NOT NULL,
        authors TEXT NOT NULL,
        page TEXT,
        vol TEXT,
        issue TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS educations (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        start TIMESTAMP NOT NULL,
        end_date TIMESTAMP,
        school TEXT NOT NULL,
        major TEXT NOT NULL,
        degree INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS awards (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT,
        date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS news (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        title_en TEXT NOT NULL,
        content TEXT NOT NULL,
        content_en TEXT NOT NULL,
        date TIMESTAMP NOT NULL,
        visit_count INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS achievements (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        title_en TEXT NOT NULL,
        content TEXT NOT NULL,
        content_en TEXT NOT NULL,
        date TIMESTAMP NOT NULL,
        visit_count INTEGER NOT NULL DEFAULT 0
    )
    "#,
    // No FK on author: posts outlive their authors, and the views expand the
    // author as optional.
    r#"
    CREATE TABLE IF NOT EXISTS blogs (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author_id TEXT NOT NULL,
        group_id TEXT REFERENCES groups(id) ON DELETE SET NULL,
        date TIMESTAMP NOT NULL,
        visit_count INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        size INTEGER NOT NULL,
        path TEXT NOT NULL,
        date TIMESTAMP NOT NULL,
        publisher_id TEXT REFERENCES users(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blog_attachments (
        blog_id TEXT NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
        file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        PRIMARY KEY (blog_id, file_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        introduction TEXT,
        size INTEGER NOT NULL,
        path TEXT NOT NULL,
        date TIMESTAMP NOT NULL,
        uploader_id TEXT REFERENCES users(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS images (
        id TEXT PRIMARY KEY,
        path TEXT NOT NULL UNIQUE,
        date TIMESTAMP NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_publications_owner ON publications(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_educations_owner ON educations(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_awards_owner ON awards(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_blogs_author ON blogs(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_blogs_group ON blogs(group_id)",
    "CREATE INDEX IF NOT EXISTS idx_news_date ON news(date)",
    "CREATE INDEX IF NOT EXISTS idx_achievements_date ON achievements(date)",
];

/// Create every table and index.
pub async fn run(db: &Database) -> Result<()> {
    info!("Running database migrations");

    for statement in SCHEMA {
        sqlx::query(statement).execute(db.pool()).await?;
    }

    info!("Database migrations completed");
    Ok(())
}
