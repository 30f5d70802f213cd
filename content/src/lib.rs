//! Resource managers for the site's content: groups, news, achievements,
//! activity posts and their attachments, public documents, carousel images
//! and the per-member sub-records. Each store applies one entity family's
//! operations and keeps its cross-entity references consistent.

pub mod blogs;
pub mod bulletins;
pub mod documents;
pub mod error;
pub mod files;
pub mod groups;
pub mod home;
pub mod images;
pub mod records;

use serde::Deserialize;

pub use blogs::{BlogListItem, BlogStore, BlogUpdate, BlogView, NewAttachment, NewBlog, PublicBlogListItem};
pub use bulletins::{
    AchievementStore, BulletinStore, BulletinUpdate, ContentListItem, ContentTeaser, NewBulletin,
    NewsStore,
};
pub use documents::{DocumentStore, DocumentView, NewDocument};
pub use error::{ContentError, Result};
pub use files::FileStore;
pub use groups::{GroupStore, GroupUpdate, GroupView, NewGroup};
pub use home::{activity_page, home_page, ActivityPage, HomePage};
pub use images::ImageStore;
pub use records::{NewAward, NewEducation, NewPublication, RecordStore};

/// Which language the public projections should select. The underlying rows
/// always carry both; this only picks the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    fn as_sql(self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }
}
