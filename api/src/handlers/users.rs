//! Admin user management.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use authz::types::{Action, Resource};
use entities::DEFAULT_AVATAR;
use user::{AccountStore, AdminAccountUpdate, AdminUserView, NewAccount, UserCategory};

use crate::error::ApiResult;
use crate::extract::{authorize, AuthUser};
use crate::handlers::require_id;
use crate::models::{IdQuery, Upsert, UserListQuery};
use crate::uploads;
use crate::AppState;

/// GET /api/user?category= — the user list, optionally students
/// (role below faculty) or supervisors only.
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<AdminUserView>>> {
    authorize(
        &state,
        &claims,
        Action::ManageUsers,
        &Resource::collection("Account"),
    )?;

    let category = match query.category.as_deref() {
        Some("student") => Some(UserCategory::Student),
        Some("supervisor") => Some(UserCategory::Supervisor),
        _ => None,
    };

    let users = AccountStore::new(&state.db).list(category).await?;
    Ok(Json(users))
}

/// POST /api/user — create a new account, or update the submitted fields of
/// an existing one when the body carries an id.
pub async fn upsert_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<Upsert<NewAccount, AdminAccountUpdate>>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ManageUsers,
        &Resource::collection("Account"),
    )?;

    let store = AccountStore::new(&state.db);
    match body {
        Upsert::Create(new) => {
            let account = store.create(new).await?;
            Ok(Json(account).into_response())
        }
        Upsert::Update { id, fields } => {
            store.admin_update(&id, fields).await?;
            Ok(StatusCode::OK.into_response())
        }
    }
}

/// DELETE /api/user?id= — remove an account. Its avatar file is unlinked
/// best-effort afterwards, unless it is the shared placeholder.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::ManageUsers,
        &Resource::new("Account", &id),
    )?;

    let account = AccountStore::new(&state.db).delete(&id).await?;

    if account.photo != DEFAULT_AVATAR {
        uploads::unlink_best_effort(&state.uploads.resolve(&account.photo)).await;
    }

    Ok(StatusCode::OK)
}
