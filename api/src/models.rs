//! Request and response bodies owned by the API layer. Store-level
//! projections (profile views, list rows) are returned as-is from their
//! crates; these are the wrappers and inputs specific to the HTTP surface.

use serde::{Deserialize, Serialize};

use content::Lang;
use entities::Role;
use user::{FacultyCard, StudentCard};

/// Login body. Fields are optional so an incomplete body can be answered
/// with a clean 400 rather than a deserialization failure.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Signup body. Deliberately not the admin create payload: a self-service
/// signup can never set the admin flag or another account's role shortcuts.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub supervisor_id: Option<String>,
    pub interests: Option<String>,
    pub introduction: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Create-or-update body used by the admin upsert routes: an `id` makes it
/// an update of the submitted fields, no `id` a create.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Upsert<N, U> {
    Update {
        id: String,
        #[serde(flatten)]
        fields: U,
    },
    Create(N),
}

/// Common `?id=` query.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Language selection for the public routes.
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    #[serde(default)]
    pub lang: Lang,
}

/// Query for the public content routes: optional item id plus language.
#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub id: Option<String>,
    #[serde(default)]
    pub lang: Lang,
}

/// Query for the activity routes: optional item id, optional group filter.
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub id: Option<String>,
    pub gid: Option<String>,
}

/// Query for the admin user list.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub category: Option<String>,
}

/// Query for the group routes: optional user whose groups to list.
#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemberDirectory {
    pub teachers: Vec<FacultyCard>,
    pub students: Vec<StudentCard>,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub photo: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
