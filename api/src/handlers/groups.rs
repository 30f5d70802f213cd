//! Group routes: reads are open to any authenticated member, mutation is
//! admin-only.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use authz::types::{Action, Resource};
use content::{GroupStore, GroupUpdate, NewGroup};

use crate::error::ApiResult;
use crate::extract::{authorize, AuthUser};
use crate::handlers::require_id;
use crate::models::{GroupQuery, IdQuery, Upsert};
use crate::AppState;

/// GET /api/group?uid= — all groups with parent names expanded, or one
/// member's groups. Asking for a missing member is NotFound, distinct from
/// an empty membership set.
pub async fn get_groups(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<GroupQuery>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ReadGroups,
        &Resource::collection("Group"),
    )?;

    let store = GroupStore::new(&state.db);
    match query.uid {
        None => Ok(Json(store.list().await?).into_response()),
        Some(uid) => Ok(Json(store.groups_of_user(&uid).await?).into_response()),
    }
}

/// POST /api/group — create, or update when the body carries an id. The
/// group name stays unique either way.
pub async fn upsert_group(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<Upsert<NewGroup, GroupUpdate>>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ManageGroups,
        &Resource::collection("Group"),
    )?;

    let store = GroupStore::new(&state.db);
    match body {
        Upsert::Create(new) => {
            let group = store.create(new).await?;
            Ok(Json(group).into_response())
        }
        Upsert::Update { id, fields } => {
            store.update(&id, fields).await?;
            Ok(StatusCode::OK.into_response())
        }
    }
}

/// DELETE /api/group?id= — remove a group together with every membership
/// reference to it.
pub async fn delete_group(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::ManageGroups,
        &Resource::new("Group", &id),
    )?;

    GroupStore::new(&state.db).delete(&id).await?;
    Ok(StatusCode::OK)
}
