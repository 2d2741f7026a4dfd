use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tubely_core::AppError;
use uuid::Uuid;

use super::models::{JwtClaims, TOKEN_ISSUER};

/// Verifies HS256 access tokens signed with the configured secret.
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify `token` and return the user id in its subject.
    pub fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| AppError::AuthenticationFailure(format!("Invalid token: {}", e)))
    }
}
