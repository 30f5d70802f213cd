//! Typed records for every entity family of the lab website.
//!
//! Each entity is an explicit record with its required and optional fields
//! stated in the type and validated at the boundary. Ordinal enumerations
//! keep their wire values stable (see [`Role`], [`GroupCategory`]).

pub mod error;

mod enums;
mod records;
mod summaries;

pub use enums::{DegreeType, GroupCategory, PublicationKind, Role};
pub use error::EntityError;
pub use records::{
    Account, Achievement, Award, Blog, CarouselImage, Document, Education, FileRecord, Group,
    News, Publication,
};
pub use summaries::{AccountSummary, FileSummary, GroupSummary};

/// The avatar path assigned to accounts that never uploaded a photo.
/// Deleting such an account must not unlink the shared placeholder file.
pub const DEFAULT_AVATAR: &str = "/img/no_avatar.png";
