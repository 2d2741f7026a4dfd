use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tubely_api::auth::{JwtClaims, TOKEN_ISSUER};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

/// Mint an access token for `user_id`, valid for one hour.
pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        iss: TOKEN_ISSUER.to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}
