//! Tubely API Library
//!
//! HTTP surface for video records and their media uploads: authentication,
//! the upload pipeline, handlers, and application setup.

mod api_doc;
mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
