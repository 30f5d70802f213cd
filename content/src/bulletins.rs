//! News and achievements share one shape: a bilingual title/content pair, a
//! publish date and a visit counter. The store is parameterised over the
//! table so both families go through the same code path.

use std::marker::PhantomData;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use database::Database;
use entities::{Achievement, News};

use crate::error::{ContentError, Result};
use crate::Lang;

/// Create payload: every field of the bilingual pair is required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBulletin {
    pub title: String,
    pub title_en: String,
    pub content: String,
    pub content_en: String,
}

/// Partial update: only submitted fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulletinUpdate {
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub content: Option<String>,
    pub content_en: Option<String>,
}

/// Public list row: title picked by language, counter included.
#[derive(Debug, Serialize, FromRow)]
pub struct ContentListItem {
    pub id: String,
    pub title: String,
    pub date: chrono::DateTime<Utc>,
    pub visit_count: i64,
}

/// Teaser row used by the dashboard list and the homepage top-N.
#[derive(Debug, Serialize, FromRow)]
pub struct ContentTeaser {
    pub id: String,
    pub title: String,
    pub date: chrono::DateTime<Utc>,
}

pub struct BulletinStore<'a, T> {
    db: &'a Database,
    table: &'static str,
    kind: &'static str,
    _marker: PhantomData<T>,
}

pub type NewsStore<'a> = BulletinStore<'a, News>;
pub type AchievementStore<'a> = BulletinStore<'a, Achievement>;

impl<'a> BulletinStore<'a, News> {
    pub fn news(db: &'a Database) -> Self {
        Self {
            db,
            table: "news",
            kind: "news item",
            _marker: PhantomData,
        }
    }
}

impl<'a> BulletinStore<'a, Achievement> {
    pub fn achievements(db: &'a Database) -> Self {
        Self {
            db,
            table: "achievements",
            kind: "achievement",
            _marker: PhantomData,
        }
    }
}

impl<'a, T> BulletinStore<'a, T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    /// Insert a new item with the publish date set server-side and the
    /// counter at zero.
    pub async fn create(&self, new: NewBulletin) -> Result<T> {
        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO {} (id, title, title_en, content, content_en, date) \
             VALUES (?, ?, ?, ?, ?, ?)",
            self.table
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(&new.title)
            .bind(&new.title_en)
            .bind(&new.content)
            .bind(&new.content_en)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?;

        info!("Created {} {}", self.kind, id);
        self.admin_get(&id).await
    }

    pub async fn update(&self, id: &str, update: BulletinUpdate) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET \
                title = COALESCE(?, title), \
                title_en = COALESCE(?, title_en), \
                content = COALESCE(?, content), \
                content_en = COALESCE(?, content_en) \
             WHERE id = ?",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(&update.title)
            .bind(&update.title_en)
            .bind(&update.content)
            .bind(&update.content_en)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound(self.kind));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound(self.kind));
        }
        Ok(())
    }

    /// Dashboard list: titles and dates, newest first.
    pub async fn admin_list(&self) -> Result<Vec<ContentTeaser>> {
        let sql = format!(
            "SELECT id, title, date FROM {} ORDER BY date DESC",
            self.table
        );
        Ok(sqlx::query_as(&sql).fetch_all(self.db.pool()).await?)
    }

    /// Dashboard single fetch. Does not touch the visit counter.
    pub async fn admin_get(&self, id: &str) -> Result<T> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", self.table);
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound(self.kind))
    }

    /// Public list, newest first. Never changes the visit counter.
    pub async fn public_list(&self, lang: Lang) -> Result<Vec<ContentListItem>> {
        let sql = format!(
            "SELECT id, CASE WHEN ?1 = 'en' THEN title_en ELSE title END AS title, \
                    date, visit_count \
             FROM {} ORDER BY date DESC",
            self.table
        );
        Ok(sqlx::query_as(&sql)
            .bind(lang.as_sql())
            .fetch_all(self.db.pool())
            .await?)
    }

    /// Public single fetch: bumps the visit counter atomically as part of the
    /// same statement, so concurrent fetches never lose increments.
    pub async fn visit(&self, id: &str) -> Result<T> {
        let sql = format!(
            "UPDATE {} SET visit_count = visit_count + 1 WHERE id = ? RETURNING *",
            self.table
        );
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound(self.kind))
    }

    /// Most-visited teasers for the homepage.
    pub async fn top(&self, limit: i64, lang: Lang) -> Result<Vec<ContentTeaser>> {
        let sql = format!(
            "SELECT id, CASE WHEN ?1 = 'en' THEN title_en ELSE title END AS title, date \
             FROM {} ORDER BY visit_count DESC LIMIT ?2",
            self.table
        );
        Ok(sqlx::query_as(&sql)
            .bind(lang.as_sql())
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (dir, db)
    }

    fn bulletin(title: &str) -> NewBulletin {
        NewBulletin {
            title: title.to_string(),
            title_en: format!("{title} (en)"),
            content: "正文".to_string(),
            content_en: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn create_starts_with_zero_visits() {
        let (_dir, db) = test_db().await;
        let store = NewsStore::news(&db);
        let news = store.create(bulletin("落成")).await.unwrap();
        assert_eq!(news.visit_count, 0);
    }

    #[tokio::test]
    async fn visit_increments_list_does_not() {
        let (_dir, db) = test_db().await;
        let store = NewsStore::news(&db);
        let news = store.create(bulletin("落成")).await.unwrap();

        let listed = store.public_list(Lang::Zh).await.unwrap();
        assert_eq!(listed[0].visit_count, 0);

        let seen = store.visit(&news.id).await.unwrap();
        assert_eq!(seen.visit_count, 1);

        let listed = store.public_list(Lang::Zh).await.unwrap();
        assert_eq!(listed[0].visit_count, 1);
    }

    #[tokio::test]
    async fn concurrent_visits_never_lose_increments() {
        let (_dir, db) = test_db().await;
        let store = NewsStore::news(&db);
        let news = store.create(bulletin("并发")).await.unwrap();

        let (a, b) = tokio::join!(store.visit(&news.id), store.visit(&news.id));
        a.unwrap();
        b.unwrap();

        let after = store.admin_get(&news.id).await.unwrap();
        assert_eq!(after.visit_count, 2);
    }

    #[tokio::test]
    async fn public_list_selects_language() {
        let (_dir, db) = test_db().await;
        let store = AchievementStore::achievements(&db);
        store.create(bulletin("获奖")).await.unwrap();

        let zh = store.public_list(Lang::Zh).await.unwrap();
        assert_eq!(zh[0].title, "获奖");
        let en = store.public_list(Lang::En).await.unwrap();
        assert_eq!(en[0].title, "获奖 (en)");
    }

    #[tokio::test]
    async fn update_is_partial_and_delete_is_checked() {
        let (_dir, db) = test_db().await;
        let store = NewsStore::news(&db);
        let news = store.create(bulletin("原标题")).await.unwrap();

        store
            .update(
                &news.id,
                BulletinUpdate {
                    title: Some("新标题".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store.admin_get(&news.id).await.unwrap();
        assert_eq!(updated.title, "新标题");
        assert_eq!(updated.content, "正文");

        store.delete(&news.id).await.unwrap();
        assert!(matches!(
            store.delete(&news.id).await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn top_orders_by_visit_count() {
        let (_dir, db) = test_db().await;
        let store = NewsStore::news(&db);
        let quiet = store.create(bulletin("quiet")).await.unwrap();
        let busy = store.create(bulletin("busy")).await.unwrap();

        store.visit(&busy.id).await.unwrap();
        store.visit(&busy.id).await.unwrap();
        store.visit(&quiet.id).await.unwrap();

        let top = store.top(3, Lang::Zh).await.unwrap();
        assert_eq!(top[0].title, "busy");
    }
}
