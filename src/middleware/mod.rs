use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;

mod json;

pub use json::ApiJson;

/// Пользователь запроса. Аутентификация - Basic auth по таблице users.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Разбирает заголовок `Basic base64(email:password)`
pub fn parse_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (email, password) = credentials.split_once(':')?;
    if email.is_empty() {
        return None;
    }
    Some((email.to_lowercase(), password.to_string()))
}

impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (email, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_credentials)
            .ok_or(AppError::Unauthorized)?;

        let user = User::find_active_by_email(&state.db.pool, &email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.verify_password(&password).await {
            tracing::debug!(user_id = user.id, "basic auth password mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", general_purpose::STANDARD.encode(raw))
    }

    #[test]
    fn credentials_are_split_on_first_colon() {
        let parsed = parse_basic_credentials(&basic("User@Test.com:pa:ss")).unwrap();
        assert_eq!(parsed, ("user@test.com".to_string(), "pa:ss".to_string()));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(parse_basic_credentials("Bearer abc").is_none());
        assert!(parse_basic_credentials("Basic !!!not-base64").is_none());
        assert!(parse_basic_credentials(&basic("no-colon")).is_none());
        assert!(parse_basic_credentials(&basic(":password")).is_none());
    }
}
