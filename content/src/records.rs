//! Per-member sub-records: publications, educations, awards.
//!
//! Each record row carries its owner, so attaching is a single insert and
//! detaching a single delete: the standalone record and the owner's list can
//! never diverge. Callers authorize against the stored owner before
//! detaching.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use database::Database;
use entities::{Award, DegreeType, Education, Publication, PublicationKind};

use crate::error::{ContentError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct NewPublication {
    pub title: String,
    pub venue: String,
    #[serde(default)]
    pub kind: PublicationKind,
    pub date: DateTime<Utc>,
    pub authors: String,
    pub page: Option<String>,
    pub vol: Option<String>,
    pub issue: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEducation {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub school: String,
    pub major: String,
    pub degree: Option<DegreeType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAward {
    pub name: Option<String>,
    pub date: Option<String>,
}

pub struct RecordStore<'a> {
    db: &'a Database,
}

impl<'a> RecordStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn add_publication(&self, owner_id: &str, new: NewPublication) -> Result<Publication> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO publications (id, owner_id, title, venue, kind, date, authors, page, vol, issue)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&new.title)
        .bind(&new.venue)
        .bind(new.kind)
        .bind(new.date)
        .bind(&new.authors)
        .bind(&new.page)
        .bind(&new.vol)
        .bind(&new.issue)
        .execute(self.db.pool())
        .await?;

        info!("Attached publication {} to account {}", id, owner_id);
        self.publication(&id).await
    }

    pub async fn add_education(&self, owner_id: &str, new: NewEducation) -> Result<Education> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO educations (id, owner_id, start, end_date, school, major, degree)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(new.start)
        .bind(new.end)
        .bind(&new.school)
        .bind(&new.major)
        .bind(new.degree)
        .execute(self.db.pool())
        .await?;

        info!("Attached education {} to account {}", id, owner_id);
        self.education(&id).await
    }

    pub async fn add_award(&self, owner_id: &str, new: NewAward) -> Result<Award> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO awards (id, owner_id, name, date) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(owner_id)
            .bind(&new.name)
            .bind(&new.date)
            .execute(self.db.pool())
            .await?;

        info!("Attached award {} to account {}", id, owner_id);
        self.award(&id).await
    }

    pub async fn publication(&self, id: &str) -> Result<Publication> {
        sqlx::query_as("SELECT * FROM publications WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("publication"))
    }

    pub async fn education(&self, id: &str) -> Result<Education> {
        sqlx::query_as("SELECT * FROM educations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("education"))
    }

    pub async fn award(&self, id: &str) -> Result<Award> {
        sqlx::query_as("SELECT * FROM awards WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("award"))
    }

    /// Detach and delete in one statement: the reference and the record go
    /// together. The caller has already authorized against the owner.
    pub async fn remove_publication(&self, id: &str) -> Result<()> {
        self.remove("publications", "publication", id).await
    }

    pub async fn remove_education(&self, id: &str) -> Result<()> {
        self.remove("educations", "education", id).await
    }

    pub async fn remove_award(&self, id: &str) -> Result<()> {
        self.remove("awards", "award", id).await
    }

    async fn remove(&self, table: &str, kind: &'static str, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound(kind));
        }
        Ok(())
    }
}
