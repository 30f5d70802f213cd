//! Public downloads: datasets, papers, books. Uploads arrive as a batch with
//! one introduction per file; the batch persists atomically or not at all.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use database::Database;
use entities::Document;

use crate::error::{ContentError, Result};

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub introduction: Option<String>,
    pub size: i64,
    pub path: String,
}

/// Public list row with the uploader's name expanded.
#[derive(Debug, Serialize, FromRow)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub introduction: Option<String>,
    pub size: i64,
    pub date: DateTime<Utc>,
    pub uploader_name: Option<String>,
    pub uploader_name_en: Option<String>,
}

pub struct DocumentStore<'a> {
    db: &'a Database,
}

impl<'a> DocumentStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Persist a whole upload batch in one transaction.
    pub async fn create_many(
        &self,
        uploader_id: &str,
        docs: Vec<NewDocument>,
    ) -> Result<Vec<Document>> {
        let mut tx = self.db.pool().begin().await?;
        let mut ids = Vec::with_capacity(docs.len());

        for doc in &docs {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO documents (id, name, introduction, size, path, date, uploader_id)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&doc.name)
            .bind(&doc.introduction)
            .bind(doc.size)
            .bind(&doc.path)
            .bind(Utc::now())
            .bind(uploader_id)
            .execute(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        info!("Stored {} document(s)", ids.len());

        let mut stored = Vec::with_capacity(ids.len());
        for id in ids {
            stored.push(self.find(&id).await?);
        }
        Ok(stored)
    }

    pub async fn find(&self, id: &str) -> Result<Document> {
        sqlx::query_as("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("document"))
    }

    pub async fn list(&self) -> Result<Vec<DocumentView>> {
        Ok(sqlx::query_as(
            r#"
            SELECT d.id, d.name, d.introduction, d.size, d.date,
                   u.name AS uploader_name, u.name_en AS uploader_name_en
            FROM documents d
            LEFT JOIN users u ON u.id = d.uploader_id
            ORDER BY d.date DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?)
    }

    /// Remove the record, returning the row for the caller's best-effort
    /// unlink of the stored bytes.
    pub async fn delete(&self, id: &str) -> Result<Document> {
        let doc = self.find(id).await?;
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        info!("Deleted document {} ({})", doc.name, id);
        Ok(doc)
    }
}
