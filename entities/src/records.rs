//! Row types, one per table. Fields mirror the columns created by the
//! `database` crate migrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::enums::{DegreeType, GroupCategory, PublicationKind, Role};

/// A lab member's login and profile record.
///
/// The password hash never leaves the process: it is skipped on
/// serialisation, and read projections elsewhere exclude the column entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub name_en: String,
    pub supervisor_id: Option<String>,
    pub admin: bool,
    pub role: Role,
    pub interests: Option<String>,
    pub introduction: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
    pub photo: String,
    pub graduate: bool,
}

/// A member group: seminar groups for students, title tiers for faculty.
/// `parent_id` allows one level of nesting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub category: GroupCategory,
    pub parent_id: Option<String>,
}

/// Bilingual news item shown on the public site.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct News {
    pub id: String,
    pub title: String,
    pub title_en: String,
    pub content: String,
    pub content_en: String,
    pub date: DateTime<Utc>,
    pub visit_count: i64,
}

/// Bilingual research-achievement announcement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub title_en: String,
    pub content: String,
    pub content_en: String,
    pub date: DateTime<Utc>,
    pub visit_count: i64,
}

/// An activity post: lab news from members, possibly a group-meeting summary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub group_id: Option<String>,
    pub date: DateTime<Utc>,
    pub visit_count: i64,
}

/// A privately stored upload, usually a blog attachment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub size: i64,
    pub path: String,
    pub date: DateTime<Utc>,
    pub publisher_id: Option<String>,
}

/// A publicly downloadable document (dataset, paper, book).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub introduction: Option<String>,
    pub size: i64,
    pub path: String,
    pub date: DateTime<Utc>,
    pub uploader_id: Option<String>,
}

/// A homepage carousel image.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CarouselImage {
    pub id: String,
    pub path: String,
    pub date: DateTime<Utc>,
}

/// A publication owned by exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Publication {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    /// Conference or journal name.
    pub venue: String,
    pub kind: PublicationKind,
    pub date: DateTime<Utc>,
    pub authors: String,
    pub page: Option<String>,
    pub vol: Option<String>,
    pub issue: Option<String>,
}

/// An education entry owned by exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Education {
    pub id: String,
    pub owner_id: String,
    pub start: DateTime<Utc>,
    #[sqlx(rename = "end_date")]
    pub end: Option<DateTime<Utc>>,
    pub school: String,
    pub major: String,
    pub degree: Option<DegreeType>,
}

/// An award owned by exactly one account. Both fields are free-form text and
/// optional; award data arrives in too many shapes to constrain further.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Award {
    pub id: String,
    pub owner_id: String,
    pub name: Option<String>,
    pub date: Option<String>,
}
