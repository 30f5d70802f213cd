//! Login and signup. Both are public; login answers "user not found" and
//! "wrong password" with distinct statuses, and hands the token back both as
//! a JSON body and as the `api-token` cookie the browser routes use.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::info;

use user::auth::password;
use user::{AccountStore, NewAccount};

use crate::error::{ApiError, ApiResult};
use crate::extract::TOKEN_COOKIE;
use crate::models::{LoginRequest, SignupRequest, TokenResponse};
use crate::AppState;

/// Exchange credentials for a session token
///
/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing username or password"),
        (status = 403, description = "Wrong password"),
        (status = 404, description = "Unknown user")
    ),
    tag = "session"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let (username, given_password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.is_empty() => (u, p),
        _ => {
            return Err(ApiError::BadRequest(
                "username and password are required".to_string(),
            ))
        }
    };

    let store = AccountStore::new(&state.db);
    let account = store
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("user".to_string()))?;

    if !password::verify_password(&account.password_hash, &given_password) {
        return Err(ApiError::Forbidden);
    }

    let token = state
        .tokens
        .issue(&account.id, &account.username, account.admin)?;

    info!("Login: {}", account.username);

    let mut cookie = Cookie::new(TOKEN_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(state.tokens.lifetime_seconds()));
    Ok((jar.add(cookie), Json(TokenResponse { token })))
}

/// Self-service account creation. The admin flag is not accepted here: new
/// accounts are always regular members.
///
/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> ApiResult<StatusCode> {
    let username = body
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("username is required".to_string()))?;
    let given_password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("password is required".to_string()))?;
    let name = body
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let name_en = body
        .name_en
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name_en is required".to_string()))?;

    let store = AccountStore::new(&state.db);
    store
        .create(NewAccount {
            username,
            password: given_password,
            name,
            name_en,
            admin: false,
            role: body.role,
            supervisor_id: body.supervisor_id,
            interests: body.interests,
            introduction: body.introduction,
            email: body.email,
            homepage: body.homepage,
        })
        .await?;

    Ok(StatusCode::OK)
}
