//! Homepage carousel images.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use database::Database;
use entities::CarouselImage;

use crate::error::{ContentError, Result};

pub struct ImageStore<'a> {
    db: &'a Database,
}

impl<'a> ImageStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register a batch of uploaded image paths in one transaction.
    pub async fn add_many(&self, paths: Vec<String>) -> Result<Vec<CarouselImage>> {
        let mut tx = self.db.pool().begin().await?;
        let mut ids = Vec::with_capacity(paths.len());

        for path in &paths {
            let id = Uuid::new_v4().to_string();
            sqlx::query("INSERT INTO images (id, path, date) VALUES (?, ?, ?)")
                .bind(&id)
                .bind(path)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            ids.push(id);
        }

        tx.commit().await?;
        info!("Registered {} carousel image(s)", ids.len());

        let mut images = Vec::with_capacity(ids.len());
        for id in ids {
            images.push(self.find(&id).await?);
        }
        Ok(images)
    }

    pub async fn find(&self, id: &str) -> Result<CarouselImage> {
        sqlx::query_as("SELECT * FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("image"))
    }

    pub async fn list(&self) -> Result<Vec<CarouselImage>> {
        Ok(
            sqlx::query_as("SELECT * FROM images ORDER BY date DESC")
                .fetch_all(self.db.pool())
                .await?,
        )
    }

    /// Newest images for the homepage carousel.
    pub async fn latest(&self, limit: i64) -> Result<Vec<CarouselImage>> {
        Ok(
            sqlx::query_as("SELECT * FROM images ORDER BY date DESC LIMIT ?")
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?,
        )
    }

    /// Remove the record, returning the row for the best-effort unlink.
    pub async fn delete(&self, id: &str) -> Result<CarouselImage> {
        let image = self.find(id).await?;
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        info!("Deleted carousel image {}", id);
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("images.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn add_list_delete_round_trip() {
        let (_dir, db) = test_db().await;
        let store = ImageStore::new(&db);

        let images = store
            .add_many(vec![
                "/images/one.jpg".to_string(),
                "/images/two.jpg".to_string(),
            ])
            .await
            .unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.delete(&images[0].id).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(matches!(
            store.delete(&images[0].id).await,
            Err(ContentError::NotFound("image"))
        ));
    }
}
