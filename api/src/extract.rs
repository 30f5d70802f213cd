//! Request extractors and the authorization entry point.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use authz::types::{Action, Principal, Resource};
use user::Claims;

use crate::error::ApiError;
use crate::AppState;

/// The cookie that mirrors the bearer token for browser-rendered routes.
pub const TOKEN_COOKIE: &str = "api-token";

/// Extractor for the authenticated caller: validates the bearer token from
/// the `Authorization` header, falling back to the `api-token` cookie for
/// browser routes. A missing, malformed or expired token is Unauthorized —
/// never Forbidden.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.tokens.validate(&token).map_err(|e| {
            debug!("Rejecting request: {}", e);
            ApiError::Unauthorized
        })?;

        Ok(AuthUser(claims))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(TOKEN_COOKIE).map(|c| c.value().to_string())
}

/// Check the caller against the policy. Policy evaluation errors fail
/// closed.
pub fn authorize(
    state: &AppState,
    claims: &Claims,
    action: Action,
    resource: &Resource,
) -> Result<(), ApiError> {
    let principal = Principal::new(&claims.id, claims.admin);
    match state.policy.is_authorized(&principal, action, resource) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiError::Forbidden),
        Err(e) => {
            warn!(
                "Authorization error for {} on {}: {} — denying",
                claims.username,
                action.name(),
                e
            );
            Err(ApiError::Forbidden)
        }
    }
}
