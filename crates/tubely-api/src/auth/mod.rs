//! Bearer-token authentication for the video endpoints.
//!
//! Tokens are issued elsewhere; this service only verifies them.

pub mod jwt;
pub mod models;
pub mod validator;

pub use jwt::JwtService;
pub use models::{JwtClaims, TOKEN_ISSUER};
pub use validator::RequestValidator;
