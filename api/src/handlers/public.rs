//! The public site: aggregate pages and content reads, no token required.
//! The one exception is the browser file download, gated by the `api-token`
//! cookie carrying a valid session token.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use content::{
    activity_page, home_page, AchievementStore, BlogStore, DocumentStore, FileStore, NewsStore,
};
use user::AccountStore;

use crate::error::{ApiError, ApiResult};
use crate::extract::TOKEN_COOKIE;
use crate::handlers::{require_id, send_file};
use crate::models::{ActivityQuery, ContentQuery, IdQuery, LangQuery, MemberDirectory};
use crate::AppState;

/// GET / — homepage aggregate: top news and achievements, newest carousel
/// images and latest activity posts.
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> impl IntoResponse {
    Json(home_page(&state.db, query.lang).await)
}

/// GET /member — the member directory, faculty and students.
pub async fn member(State(state): State<AppState>) -> impl IntoResponse {
    let (teachers, students) = AccountStore::new(&state.db).member_directory().await;
    Json(MemberDirectory { teachers, students })
}

/// GET /showmember?id= — one member's public page.
pub async fn show_member(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    let id = require_id(query.id)?;
    let view = AccountStore::new(&state.db).public_profile(&id).await?;
    Ok(Json(view).into_response())
}

/// GET /news?id=&lang= — the news list, or a single item. The single fetch
/// bumps the visit counter; the list never does.
pub async fn news(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> ApiResult<Response> {
    let store = NewsStore::news(&state.db);
    match query.id {
        None => Ok(Json(store.public_list(query.lang).await?).into_response()),
        Some(id) => Ok(Json(store.visit(&id).await?).into_response()),
    }
}

/// GET /achievement?id=&lang= — same shape as the news routes.
pub async fn achievement(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> ApiResult<Response> {
    let store = AchievementStore::achievements(&state.db);
    match query.id {
        None => Ok(Json(store.public_list(query.lang).await?).into_response()),
        Some(id) => Ok(Json(store.visit(&id).await?).into_response()),
    }
}

/// GET /activity?id=&gid= — the activity page (optionally one group's
/// posts), or a single post with its references expanded.
pub async fn activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Response> {
    match query.id {
        None => {
            let page = activity_page(&state.db, query.gid.as_deref()).await;
            Ok(Json(page).into_response())
        }
        Some(id) => {
            let view = BlogStore::new(&state.db).get(&id).await?;
            Ok(Json(view).into_response())
        }
    }
}

/// GET /download?id= — the public document list, or one document streamed
/// under its original name.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    let store = DocumentStore::new(&state.db);
    match query.id {
        None => Ok(Json(store.list().await?).into_response()),
        Some(id) => {
            let doc = store.find(&id).await?;
            send_file(&state.uploads.resolve(&doc.path), &doc.name).await
        }
    }
}

/// GET /file?id= — browser download of a private file, gated by the
/// `api-token` cookie. The cookie goes through full token validation; an
/// expired or forged cookie is Unauthorized, exactly like a bad bearer
/// token.
pub async fn file_download(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthorized)?;
    state
        .tokens
        .validate(&token)
        .map_err(|_| ApiError::Unauthorized)?;

    let id = require_id(query.id)?;
    let file = FileStore::new(&state.db).find(&id).await?;
    send_file(&state.uploads.resolve(&file.path), &file.name).await
}
