use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::jwt::{Claims, JwtKeys, TokenError};
use crate::error::ApiError;

pub const TOKEN_COOKIE: &str = "token";

/// Authenticated identity, pulled from the `token` cookie.
///
/// Missing cookie is 401; a cookie that fails verification (bad signature,
/// malformed, expired) is 403.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("Unauthorized: No token provided"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "session token rejected");
            match e {
                TokenError::Expired => ApiError::forbidden("Token has expired"),
                _ => ApiError::forbidden("Invalid token"),
            }
        })?;

        Ok(AuthUser(claims))
    }
}
