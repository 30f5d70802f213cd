//! The member's own dashboard surface: profile, avatar, password and the
//! owned sub-records. Every target here is derived from the validated token
//! or checked against the stored owner — never from client-supplied ids.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;

use authz::types::{Action, Resource};
use content::{NewAward, NewEducation, NewPublication, RecordStore};
use entities::{Award, Education, Publication};
use user::{AccountStore, ProfileUpdate, ProfileView};

use crate::error::{ApiError, ApiResult};
use crate::extract::{authorize, AuthUser};
use crate::handlers::require_id;
use crate::models::{AvatarResponse, IdQuery, PasswordChangeRequest};
use crate::uploads;
use crate::AppState;

/// GET /api/profile — the caller's own profile with sub-records expanded.
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<ProfileView>> {
    authorize(
        &state,
        &claims,
        Action::ReadProfile,
        &Resource::new("Account", &claims.id),
    )?;

    let view = AccountStore::new(&state.db).profile(&claims.id).await?;
    Ok(Json(view))
}

/// PUT /api/profile — partial update of the caller's own profile fields.
/// The target account is always the token's; ids in the payload do not
/// exist, let alone get honoured.
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<StatusCode> {
    authorize(
        &state,
        &claims,
        Action::UpdateProfile,
        &Resource::new("Account", &claims.id).owned_by(&claims.id),
    )?;

    AccountStore::new(&state.db)
        .update_profile(&claims.id, update)
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/avatar — multipart upload of the caller's avatar. Stored under
/// the caller's id, so a re-upload replaces the previous file in place.
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<AvatarResponse>> {
    authorize(
        &state,
        &claims,
        Action::UploadAvatar,
        &Resource::new("Account", &claims.id).owned_by(&claims.id),
    )?;

    let mut stored = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("avatar") {
            let data = field.bytes().await?;
            uploads::store(&state.uploads.avatars_dir(), &claims.id, &data)
                .await
                .map_err(ApiError::internal)?;
            stored = Some(format!("/images/avatars/{}", claims.id));
            break;
        }
    }

    let photo = stored.ok_or_else(|| ApiError::BadRequest("missing avatar file".to_string()))?;
    AccountStore::new(&state.db)
        .set_photo(&claims.id, &photo)
        .await?;
    Ok(Json(AvatarResponse { photo }))
}

/// POST /api/password — self-service change; the current password must
/// verify.
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<PasswordChangeRequest>,
) -> ApiResult<StatusCode> {
    authorize(
        &state,
        &claims,
        Action::ChangePassword,
        &Resource::new("Account", &claims.id).owned_by(&claims.id),
    )?;

    AccountStore::new(&state.db)
        .change_password(&claims.id, &body.old_password, &body.new_password)
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /api/password?id= — admin reset of another account's password to
/// the documented fixed default.
pub async fn reset_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    authorize(
        &state,
        &claims,
        Action::ResetPassword,
        &Resource::new("Account", &id),
    )?;

    AccountStore::new(&state.db)
        .reset_password_to_default(&id)
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/education — attach an education entry to the caller's account.
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<NewEducation>,
) -> ApiResult<Json<Education>> {
    authorize(
        &state,
        &claims,
        Action::AttachRecord,
        &Resource::collection("Record").owned_by(&claims.id),
    )?;

    let education = RecordStore::new(&state.db)
        .add_education(&claims.id, body)
        .await?;
    Ok(Json(education))
}

/// DELETE /api/education?id= — detach and delete one of the caller's
/// education entries. The stored owner decides, so another member's id in
/// the query yields Forbidden, not a cross-account delete.
pub async fn delete_education(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    let store = RecordStore::new(&state.db);
    let record = store.education(&id).await?;

    authorize(
        &state,
        &claims,
        Action::DetachRecord,
        &Resource::new("Record", &id).owned_by(&record.owner_id),
    )?;

    store.remove_education(&id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/award
pub async fn add_award(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<NewAward>,
) -> ApiResult<Json<Award>> {
    authorize(
        &state,
        &claims,
        Action::AttachRecord,
        &Resource::collection("Record").owned_by(&claims.id),
    )?;

    let award = RecordStore::new(&state.db).add_award(&claims.id, body).await?;
    Ok(Json(award))
}

/// DELETE /api/award?id=
pub async fn delete_award(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    let store = RecordStore::new(&state.db);
    let record = store.award(&id).await?;

    authorize(
        &state,
        &claims,
        Action::DetachRecord,
        &Resource::new("Record", &id).owned_by(&record.owner_id),
    )?;

    store.remove_award(&id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/publication
pub async fn add_publication(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<NewPublication>,
) -> ApiResult<Json<Publication>> {
    authorize(
        &state,
        &claims,
        Action::AttachRecord,
        &Resource::collection("Record").owned_by(&claims.id),
    )?;

    let publication = RecordStore::new(&state.db)
        .add_publication(&claims.id, body)
        .await?;
    Ok(Json(publication))
}

/// DELETE /api/publication?id=
pub async fn delete_publication(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<StatusCode> {
    let id = require_id(query.id)?;
    let store = RecordStore::new(&state.db);
    let record = store.publication(&id).await?;

    authorize(
        &state,
        &claims,
        Action::DetachRecord,
        &Resource::new("Record", &id).owned_by(&record.owner_id),
    )?;

    store.remove_publication(&id).await?;
    Ok(StatusCode::OK)
}
