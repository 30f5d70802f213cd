//! Activity post routes. Creation and update arrive as multipart bodies: a
//! `blog` field carrying the post JSON, an optional `id` field selecting
//! update, and any number of `attachments` file parts.
//!
//! A newly created post is announced to the lab mailing list in the
//! background — unless its title marks it as a log — and the announcement's
//! fate never affects the response.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use authz::types::{Action, Resource};
use content::{BlogStore, BlogUpdate, NewAttachment, NewBlog};
use notify::{MailAttachment, Mailer};

use crate::error::{ApiError, ApiResult};
use crate::extract::{authorize, AuthUser};
use crate::handlers::require_id;
use crate::models::IdQuery;
use crate::uploads;
use crate::AppState;

struct BlogForm {
    id: Option<String>,
    blog_json: Option<String>,
    attachments: Vec<NewAttachment>,
}

async fn read_form(state: &AppState, mut multipart: Multipart) -> ApiResult<BlogForm> {
    let mut form = BlogForm {
        id: None,
        blog_json: None,
        attachments: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("id") => form.id = Some(field.text().await?),
            Some("blog") => form.blog_json = Some(field.text().await?),
            Some("attachments") => {
                let original = field
                    .file_name()
                    .unwrap_or("attachment")
                    .to_string();
                let data = field.bytes().await?;
                let stored_name = uploads::unique_name(&original);
                uploads::store(&state.uploads.private_files_dir(), &stored_name, &data)
                    .await
                    .map_err(ApiError::internal)?;
                form.attachments.push(NewAttachment {
                    name: original,
                    size: data.len() as i64,
                    path: format!("files/private/{stored_name}"),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/blog — create a post (announcing it), or update the one named
/// by the `id` field, appending any new attachments.
pub async fn blog_upsert(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::WriteBlog,
        &Resource::collection("Blog"),
    )?;

    let form = read_form(&state, multipart).await?;
    let blog_json = form
        .blog_json
        .ok_or_else(|| ApiError::BadRequest("missing blog field".to_string()))?;

    let store = BlogStore::new(&state.db);
    match form.id {
        None => {
            let new: NewBlog = serde_json::from_str(&blog_json)
                .map_err(|e| ApiError::BadRequest(format!("invalid blog payload: {e}")))?;

            let mail_attachments: Vec<MailAttachment> = form
                .attachments
                .iter()
                .map(|a| MailAttachment {
                    filename: a.name.clone(),
                    path: state.uploads.resolve(&a.path),
                })
                .collect();

            let blog = store.create(&claims.id, new, form.attachments).await?;

            if Mailer::should_announce(&blog.title) {
                state.mailer.clone().announce_in_background(
                    blog.title.clone(),
                    blog.content.clone(),
                    mail_attachments,
                );
            }

            Ok(Json(blog).into_response())
        }
        Some(id) => {
            let update: BlogUpdate = serde_json::from_str(&blog_json)
                .map_err(|e| ApiError::BadRequest(format!("invalid blog payload: {e}")))?;
            store
                .update(&id, update, form.attachments, &claims.id)
                .await?;
            Ok(StatusCode::OK.into_response())
        }
    }
}

/// GET /api/blog?id= — the caller's posts (all posts for admins), or one
/// post with its references expanded.
pub async fn blog_list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    authorize(
        &state,
        &claims,
        Action::ReadBlog,
        &Resource::collection("Blog"),
    )?;

    let store = BlogStore::new(&state.db);
    match query.id {
        None => Ok(Json(store.dashboard_list(&claims.id, claims.admin).await?).into_response()),
        Some(id) => Ok(Json(store.get(&id).await?).into_response()),
    }
}

/// DELETE /api/blog?id=
pub async fn blog_delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::DeleteBlog,
        &Resource::new("Blog", &id),
    )?;

    BlogStore::new(&state.db).delete(&id).await?;
    Ok(StatusCode::OK)
}
