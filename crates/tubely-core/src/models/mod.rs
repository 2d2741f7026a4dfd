//! Data models for the application

mod media;
mod video;

pub use media::{AssetKind, Orientation};
pub use video::{CreateVideoRequest, Video};
