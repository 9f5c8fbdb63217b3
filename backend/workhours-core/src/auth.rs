// src/auth.rs
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::AppState;
use crate::error::ApiError;
use crate::time_entry::UserId;

// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
}

/// Mints an HS256 bearer token for `user_id`, valid for `ttl`.
pub fn issue_token(
    user_id: &str,
    secret: &[u8],
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + ttl).timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// The caller behind a valid `Authorization: Bearer` header. Extraction
/// fails with `ApiError::Unauthenticated` before any handler code runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        let claims = verify_token(token, state.config.jwt_secret_bytes()).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::Unauthenticated
        })?;

        if claims.sub.is_empty() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(AuthenticatedUser {
            user_id: claims.sub,
        })
    }
}
