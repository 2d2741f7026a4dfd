use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer every accepted access token must carry
pub const TOKEN_ISSUER: &str = "tubely-access";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub iss: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}
