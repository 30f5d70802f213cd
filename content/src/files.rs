//! Private file records. Files are created as blog attachments but have
//! their own lifecycle: they can be downloaded and deleted standalone.

use tracing::info;

use database::Database;
use entities::FileRecord;

use crate::error::{ContentError, Result};

pub struct FileStore<'a> {
    db: &'a Database,
}

impl<'a> FileStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: &str) -> Result<FileRecord> {
        sqlx::query_as("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("file"))
    }

    /// Remove the record and any attachment reference to it, returning the
    /// row so the caller can unlink the stored bytes. The delete is complete
    /// once the record is gone; the unlink is the caller's best effort.
    pub async fn delete(&self, id: &str) -> Result<FileRecord> {
        let file = self.find(id).await?;

        let mut tx = self.db.pool().begin().await?;
        sqlx::query("DELETE FROM blog_attachments WHERE file_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted file {} ({})", file.name, id);
        Ok(file)
    }
}
