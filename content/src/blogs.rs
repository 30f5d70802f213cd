//! Activity posts and their attachments.
//!
//! A post and the file records behind its attachments are created in one
//! transaction; a partial failure rolls everything back instead of leaving
//! orphaned file rows behind.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use database::Database;
use entities::{AccountSummary, Blog, FileSummary, GroupSummary};

use crate::error::{ContentError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub group_id: Option<String>,
}

/// An uploaded attachment about to become a file record.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub name: String,
    pub size: i64,
    pub path: String,
}

/// Dashboard list row: own posts (or all, for admins) with author and
/// attachment names expanded.
#[derive(Debug, Serialize)]
pub struct BlogListItem {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub author: Option<AccountSummary>,
    pub attachments: Vec<FileSummary>,
}

/// Public activity list row with the group name expanded.
#[derive(Debug, Serialize, FromRow)]
pub struct PublicBlogListItem {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
}

/// A single post with every reference expanded.
#[derive(Debug, Serialize)]
pub struct BlogView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub author: Option<AccountSummary>,
    pub group: Option<GroupSummary>,
    pub attachments: Vec<FileSummary>,
}

#[derive(FromRow)]
struct BlogListRow {
    id: String,
    title: String,
    date: DateTime<Utc>,
    author_id: String,
    author_name: Option<String>,
    author_name_en: Option<String>,
}

#[derive(FromRow)]
struct BlogDetailRow {
    id: String,
    title: String,
    content: String,
    date: DateTime<Utc>,
    author_id: String,
    author_name: Option<String>,
    author_name_en: Option<String>,
    group_id: Option<String>,
    group_name: Option<String>,
}

pub struct BlogStore<'a> {
    db: &'a Database,
}

impl<'a> BlogStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a post plus its attachments atomically. The author always
    /// comes from the validated caller, never from the payload.
    pub async fn create(
        &self,
        author_id: &str,
        new: NewBlog,
        attachments: Vec<NewAttachment>,
    ) -> Result<Blog> {
        let mut tx = self.db.pool().begin().await?;

        let blog_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO blogs (id, title, content, author_id, group_id, date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&blog_id)
        .bind(&new.title)
        .bind(&new.content)
        .bind(author_id)
        .bind(&new.group_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for attachment in &attachments {
            let file_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO files (id, name, size, path, date, publisher_id)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&file_id)
            .bind(&attachment.name)
            .bind(attachment.size)
            .bind(&attachment.path)
            .bind(Utc::now())
            .bind(author_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO blog_attachments (blog_id, file_id) VALUES (?, ?)")
                .bind(&blog_id)
                .bind(&file_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(
            "Created blog {} with {} attachment(s)",
            blog_id,
            attachments.len()
        );

        let blog = sqlx::query_as("SELECT * FROM blogs WHERE id = ?")
            .bind(&blog_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(blog)
    }

    /// Update a post's fields and append any newly uploaded attachments, in
    /// one transaction.
    pub async fn update(
        &self,
        id: &str,
        update: BlogUpdate,
        new_attachments: Vec<NewAttachment>,
        uploader_id: &str,
    ) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE blogs SET
                title = COALESCE(?, title),
                content = COALESCE(?, content),
                group_id = COALESCE(?, group_id)
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.group_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound("blog"));
        }

        for attachment in &new_attachments {
            let file_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO files (id, name, size, path, date, publisher_id)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&file_id)
            .bind(&attachment.name)
            .bind(attachment.size)
            .bind(&attachment.path)
            .bind(Utc::now())
            .bind(uploader_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO blog_attachments (blog_id, file_id) VALUES (?, ?)")
                .bind(id)
                .bind(&file_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Dashboard list: everyone sees their own posts, admins see all.
    pub async fn dashboard_list(&self, caller_id: &str, admin: bool) -> Result<Vec<BlogListItem>> {
        let rows = sqlx::query_as::<_, BlogListRow>(
            r#"
            SELECT b.id, b.title, b.date, b.author_id,
                   u.name AS author_name, u.name_en AS author_name_en
            FROM blogs b
            LEFT JOIN users u ON u.id = b.author_id
            WHERE ?1 OR b.author_id = ?2
            ORDER BY b.date DESC
            "#,
        )
        .bind(admin)
        .bind(caller_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut attachments = self.attachments_by_blog().await?;

        Ok(rows
            .into_iter()
            .map(|row| BlogListItem {
                attachments: attachments.remove(&row.id).unwrap_or_default(),
                author: row.author_name.map(|name| AccountSummary {
                    id: row.author_id.clone(),
                    name,
                    name_en: row.author_name_en.clone().unwrap_or_default(),
                }),
                id: row.id,
                title: row.title,
                date: row.date,
            })
            .collect())
    }

    /// Public activity list, optionally restricted to one group.
    pub async fn public_list(&self, group_id: Option<&str>) -> Result<Vec<PublicBlogListItem>> {
        Ok(sqlx::query_as(
            r#"
            SELECT b.id, b.title, b.date, b.group_id, g.name AS group_name
            FROM blogs b
            LEFT JOIN groups g ON g.id = b.group_id
            WHERE ?1 IS NULL OR b.group_id = ?1
            ORDER BY b.date DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(self.db.pool())
        .await?)
    }

    /// One post with author, group and attachment summaries expanded.
    pub async fn get(&self, id: &str) -> Result<BlogView> {
        let row = sqlx::query_as::<_, BlogDetailRow>(
            r#"
            SELECT b.id, b.title, b.content, b.date, b.author_id,
                   u.name AS author_name, u.name_en AS author_name_en,
                   b.group_id, g.name AS group_name
            FROM blogs b
            LEFT JOIN users u ON u.id = b.author_id
            LEFT JOIN groups g ON g.id = b.group_id
            WHERE b.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(ContentError::NotFound("blog"))?;

        let attachments = sqlx::query_as::<_, FileSummary>(
            r#"
            SELECT f.id, f.name
            FROM files f
            JOIN blog_attachments ba ON ba.file_id = f.id
            WHERE ba.blog_id = ?
            ORDER BY f.name
            "#,
        )
        .bind(id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(BlogView {
            author: row.author_name.map(|name| AccountSummary {
                id: row.author_id.clone(),
                name,
                name_en: row.author_name_en.clone().unwrap_or_default(),
            }),
            group: match (row.group_id, row.group_name) {
                (Some(id), Some(name)) => Some(GroupSummary { id, name }),
                _ => None,
            },
            id: row.id,
            title: row.title,
            content: row.content,
            date: row.date,
            attachments,
        })
    }

    /// Latest posts for the homepage.
    pub async fn latest(&self, limit: i64) -> Result<Vec<crate::ContentTeaser>> {
        Ok(sqlx::query_as(
            "SELECT id, title, date FROM blogs ORDER BY date DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?)
    }

    /// Delete a post. Attachment references go with it; the file records and
    /// stored bytes stay, as files have their own lifecycle.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound("blog"));
        }
        Ok(())
    }

    async fn attachments_by_blog(&self) -> Result<HashMap<String, Vec<FileSummary>>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT ba.blog_id, f.id, f.name
            FROM blog_attachments ba
            JOIN files f ON f.id = ba.file_id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut map: HashMap<String, Vec<FileSummary>> = HashMap::new();
        for (blog_id, file_id, file_name) in rows {
            map.entry(blog_id).or_default().push(FileSummary {
                id: file_id,
                name: file_name,
            });
        }
        Ok(map)
    }
}
