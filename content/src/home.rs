//! Public aggregate views. Each section is fetched concurrently and a
//! failed section degrades to an empty list rather than failing the page.

use serde::Serialize;
use tracing::warn;

use database::Database;
use entities::{CarouselImage, Group};

use crate::blogs::{BlogStore, PublicBlogListItem};
use crate::bulletins::{AchievementStore, ContentTeaser, NewsStore};
use crate::images::ImageStore;
use crate::{Lang, Result};

/// The homepage: three most-visited news and achievements, the newest
/// carousel images and the latest activity posts.
#[derive(Debug, Serialize)]
pub struct HomePage {
    pub top_news: Vec<ContentTeaser>,
    pub slides: Vec<CarouselImage>,
    pub achievements: Vec<ContentTeaser>,
    pub latest_blogs: Vec<ContentTeaser>,
}

/// The public activity page: posts (optionally one group's) plus the group
/// list for the filter control.
#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub blogs: Vec<PublicBlogListItem>,
    pub groups: Vec<Group>,
}

const HOME_SECTION_LIMIT: i64 = 3;

fn section<T>(result: Result<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Failed to retrieve the {} section: {}", what, e);
        Vec::new()
    })
}

pub async fn home_page(db: &Database, lang: Lang) -> HomePage {
    let news = NewsStore::news(db);
    let images = ImageStore::new(db);
    let achievements = AchievementStore::achievements(db);
    let blogs = BlogStore::new(db);

    let (top_news, slides, top_achievements, latest_blogs) = tokio::join!(
        news.top(HOME_SECTION_LIMIT, lang),
        images.latest(HOME_SECTION_LIMIT),
        achievements.top(HOME_SECTION_LIMIT, lang),
        blogs.latest(HOME_SECTION_LIMIT),
    );

    HomePage {
        top_news: section(top_news, "top news"),
        slides: section(slides, "homepage images"),
        achievements: section(top_achievements, "top achievements"),
        latest_blogs: section(latest_blogs, "latest blogs"),
    }
}

pub async fn activity_page(db: &Database, group_id: Option<&str>) -> ActivityPage {
    let blogs = BlogStore::new(db);

    let (blog_list, group_list) = tokio::join!(blogs.public_list(group_id), all_groups(db));

    ActivityPage {
        blogs: section(blog_list, "blog list"),
        groups: section(group_list, "group list"),
    }
}

async fn all_groups(db: &Database) -> Result<Vec<Group>> {
    Ok(sqlx::query_as("SELECT * FROM groups ORDER BY name")
        .fetch_all(db.pool())
        .await?)
}
