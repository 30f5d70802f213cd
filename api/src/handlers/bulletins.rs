//! Admin news and achievement routes. Both families share the bulletin
//! shape, so the handlers delegate to the same implementations; the admin
//! single fetch never touches the visit counter.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use authz::types::{Action, Resource};
use content::{AchievementStore, BulletinStore, BulletinUpdate, NewBulletin, NewsStore};

use crate::error::ApiResult;
use crate::extract::{authorize, AuthUser};
use crate::handlers::require_id;
use crate::models::{IdQuery, Upsert};
use crate::AppState;

async fn list_impl<T>(store: BulletinStore<'_, T>, id: Option<String>) -> ApiResult<Response>
where
    T: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Unpin,
{
    match id {
        None => Ok(Json(store.admin_list().await?).into_response()),
        Some(id) => Ok(Json(store.admin_get(&id).await?).into_response()),
    }
}

async fn upsert_impl<T>(
    store: BulletinStore<'_, T>,
    body: Upsert<NewBulletin, BulletinUpdate>,
) -> ApiResult<Response>
where
    T: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Unpin,
{
    match body {
        Upsert::Create(new) => Ok(Json(store.create(new).await?).into_response()),
        Upsert::Update { id, fields } => {
            store.update(&id, fields).await?;
            Ok(StatusCode::OK.into_response())
        }
    }
}

/// GET /api/news?id=
pub async fn news_list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ManageNews,
        &Resource::collection("News"),
    )?;
    list_impl(NewsStore::news(&state.db), query.id).await
}

/// POST /api/news
pub async fn news_upsert(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<Upsert<NewBulletin, BulletinUpdate>>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ManageNews,
        &Resource::collection("News"),
    )?;
    upsert_impl(NewsStore::news(&state.db), body).await
}

/// DELETE /api/news?id=
pub async fn news_delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::ManageNews,
        &Resource::new("News", &id),
    )?;
    NewsStore::news(&state.db).delete(&id).await?;
    Ok(StatusCode::OK)
}

/// GET /api/achievement?id=
pub async fn achievement_list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ManageAchievements,
        &Resource::collection("Achievement"),
    )?;
    list_impl(AchievementStore::achievements(&state.db), query.id).await
}

/// POST /api/achievement
pub async fn achievement_upsert(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<Upsert<NewBulletin, BulletinUpdate>>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ManageAchievements,
        &Resource::collection("Achievement"),
    )?;
    upsert_impl(AchievementStore::achievements(&state.db), body).await
}

/// DELETE /api/achievement?id=
pub async fn achievement_delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::ManageAchievements,
        &Resource::new("Achievement", &id),
    )?;
    AchievementStore::achievements(&state.db).delete(&id).await?;
    Ok(StatusCode::OK)
}
