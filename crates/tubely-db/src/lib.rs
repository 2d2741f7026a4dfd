//! Tubely Database Library
//!
//! Persistence for video records. The API talks to the [`VideoRepository`]
//! trait; Postgres backs it in deployments and an in-memory map backs it in
//! tests and database-less local runs.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
