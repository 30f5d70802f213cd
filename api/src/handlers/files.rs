//! Upload and download routes: rich-text images, the admin carousel, public
//! documents and private files.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use authz::types::{Action, Resource};
use content::{DocumentStore, DocumentView, FileStore, ImageStore, NewDocument};
use entities::CarouselImage;

use crate::error::{ApiError, ApiResult};
use crate::extract::{authorize, AuthUser};
use crate::handlers::{require_id, send_file};
use crate::models::IdQuery;
use crate::uploads;
use crate::AppState;

/// Store every `images` part under `public/images`, returning the public
/// paths.
async fn store_images(state: &AppState, mut multipart: Multipart) -> ApiResult<Vec<String>> {
    let mut paths = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("images") {
            continue;
        }
        let original = field.file_name().unwrap_or("image").to_string();
        let data = field.bytes().await?;
        let stored_name = uploads::unique_name(&original);
        uploads::store(&state.uploads.images_dir(), &stored_name, &data)
            .await
            .map_err(ApiError::internal)?;
        paths.push(format!("/images/{stored_name}"));
    }
    Ok(paths)
}

/// POST /api/image — store images referenced from rich-text content and
/// return their public paths. No records are created.
pub async fn upload_images(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<Vec<String>>> {
    authorize(
        &state,
        &claims,
        Action::UploadImages,
        &Resource::collection("Image"),
    )?;

    let paths = store_images(&state, multipart).await?;
    Ok(Json(paths))
}

/// POST /api/carousel_image — store homepage carousel images and register
/// them.
pub async fn carousel_upload(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<Vec<CarouselImage>>> {
    authorize(
        &state,
        &claims,
        Action::ManageCarousel,
        &Resource::collection("Image"),
    )?;

    let paths = store_images(&state, multipart).await?;
    let images = ImageStore::new(&state.db).add_many(paths).await?;
    Ok(Json(images))
}

/// GET /api/carousel_image
pub async fn carousel_list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<CarouselImage>>> {
    authorize(
        &state,
        &claims,
        Action::ManageCarousel,
        &Resource::collection("Image"),
    )?;

    let images = ImageStore::new(&state.db).list().await?;
    Ok(Json(images))
}

/// DELETE /api/carousel_image?id= — drop the record, then unlink the stored
/// image best-effort.
pub async fn carousel_delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::ManageCarousel,
        &Resource::new("Image", &id),
    )?;

    let image = ImageStore::new(&state.db).delete(&id).await?;
    uploads::unlink_best_effort(&state.uploads.resolve(&image.path)).await;
    Ok(StatusCode::OK)
}

/// POST /api/doc — upload public documents. The body carries one
/// `information` text part per `files` part; a count mismatch persists
/// nothing, and the already-saved bytes are removed again.
pub async fn upload_docs(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    authorize(
        &state,
        &claims,
        Action::UploadDocument,
        &Resource::collection("Document"),
    )?;

    let mut saved: Vec<NewDocument> = Vec::new();
    let mut information: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("files") => {
                let original = field.file_name().unwrap_or("document").to_string();
                let data = field.bytes().await?;
                let stored_name = uploads::unique_name(&original);
                uploads::store(&state.uploads.public_files_dir(), &stored_name, &data)
                    .await
                    .map_err(ApiError::internal)?;
                saved.push(NewDocument {
                    name: original,
                    introduction: None,
                    size: data.len() as i64,
                    path: format!("files/public/{stored_name}"),
                });
            }
            Some("information") => information.push(field.text().await?),
            _ => {}
        }
    }

    if saved.len() != information.len() {
        for doc in &saved {
            uploads::unlink_best_effort(&state.uploads.resolve(&doc.path)).await;
        }
        return Err(ApiError::BadRequest(
            "the number of files and information entries must match".to_string(),
        ));
    }

    for (doc, intro) in saved.iter_mut().zip(information) {
        doc.introduction = Some(intro);
    }

    DocumentStore::new(&state.db)
        .create_many(&claims.id, saved)
        .await?;
    Ok(StatusCode::OK)
}

/// GET /api/doc
pub async fn docs_list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<DocumentView>>> {
    authorize(
        &state,
        &claims,
        Action::ListDocuments,
        &Resource::collection("Document"),
    )?;

    let docs = DocumentStore::new(&state.db).list().await?;
    Ok(Json(docs))
}

/// DELETE /api/doc?id=
pub async fn doc_delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::DeleteDocument,
        &Resource::new("Document", &id),
    )?;

    let doc = DocumentStore::new(&state.db).delete(&id).await?;
    uploads::unlink_best_effort(&state.uploads.resolve(&doc.path)).await;
    Ok(StatusCode::OK)
}

/// GET /api/file?id= — authenticated download of a private file.
pub async fn file_download(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::DownloadFile,
        &Resource::new("File", &id),
    )?;

    let file = FileStore::new(&state.db).find(&id).await?;
    send_file(&state.uploads.resolve(&file.path), &file.name).await
}

/// DELETE /api/file?id= — drop the record and its attachment references,
/// then unlink the stored bytes best-effort.
pub async fn file_delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::DeleteFile,
        &Resource::new("File", &id),
    )?;

    let file = FileStore::new(&state.db).delete(&id).await?;
    uploads::unlink_best_effort(&state.uploads.resolve(&file.path)).await;
    Ok(StatusCode::OK)
}
