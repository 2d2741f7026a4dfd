use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tubely_core::AppError;
use uuid::Uuid;

use super::jwt::JwtService;

/// Resolves the record id and the authenticated user for a request.
#[derive(Clone)]
pub struct RequestValidator {
    jwt: Arc<JwtService>,
}

impl RequestValidator {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }

    pub fn parse_identifier(raw: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(raw.trim()).map_err(AppError::from)
    }

    /// Authenticated user id from the `Authorization: Bearer` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = bearer_token(headers)?;
        self.jwt.validate_token(token)
    }

    /// Parse the identifier first, then authenticate.
    pub fn validate(&self, raw_id: &str, headers: &HeaderMap) -> Result<(Uuid, Uuid), AppError> {
        let record_id = Self::parse_identifier(raw_id)?;
        let user_id = self.authenticate(headers)?;
        Ok((record_id, user_id))
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::AuthenticationFailure("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::AuthenticationFailure("Malformed authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::AuthenticationFailure("Invalid authorization header format".to_string())
        })
}
