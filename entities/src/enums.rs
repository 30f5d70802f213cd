//! Ordinal enumerations shared across the data model.
//!
//! Every enum serialises as its bare integer, keeping the established wire
//! values stable. Database columns store the same ordinal.

use serde::{Deserialize, Serialize};

use crate::error::EntityError;

macro_rules! ordinal_enum {
    ($(#[$doc:meta])* $name:ident { $($(#[$vdoc:meta])* $variant:ident = $ord:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(into = "i64", try_from = "i64")]
        #[repr(i64)]
        pub enum $name {
            $($(#[$vdoc])* $variant = $ord),+
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                value as i64
            }
        }

        impl TryFrom<i64> for $name {
            type Error = EntityError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match value {
                    $($ord => Ok($name::$variant),)+
                    other => Err(EntityError::InvalidOrdinal {
                        kind: stringify!($name),
                        value: other,
                    }),
                }
            }
        }
    };
}

ordinal_enum! {
    /// The degree a member is working towards. Faculty is the supervisor tier
    /// used by the member directory and the admin user filter.
    Role {
        Undergraduate = 0,
        Master = 1,
        Doctoral = 2,
        Faculty = 3,
    }
}

ordinal_enum! {
    /// Whether a group collects students (seminar groups) or faculty.
    GroupCategory {
        Student = 0,
        Faculty = 1,
    }
}

ordinal_enum! {
    /// Venue kind of a publication.
    PublicationKind {
        Conference = 0,
        Journal = 1,
    }
}

ordinal_enum! {
    /// Degree earned in an education entry. High-school entries leave it unset.
    DegreeType {
        Bachelor = 0,
        Master = 1,
        Doctorate = 2,
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Undergraduate
    }
}

impl Default for GroupCategory {
    fn default() -> Self {
        GroupCategory::Student
    }
}

impl Default for PublicationKind {
    fn default() -> Self {
        PublicationKind::Conference
    }
}
