//! Shared key generation for storage backends.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use tubely_core::Orientation;

const KEY_ENTROPY_BYTES: usize = 32;

/// Produces unguessable storage keys.
///
/// Keys are not checked against existing objects; 256 bits of entropy make
/// collisions negligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator;

impl KeyGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate `{orientation/}{random}.{extension}`.
    pub fn generate(&self, orientation: Option<Orientation>, extension: &str) -> String {
        let mut raw = [0u8; KEY_ENTROPY_BYTES];
        rand::rng().fill_bytes(&mut raw);
        let name = URL_SAFE_NO_PAD.encode(raw);

        match orientation {
            Some(orientation) => format!("{}/{}.{}", orientation.as_str(), name, extension),
            None => format!("{}.{}", name, extension),
        }
    }
}

/// Reject keys that could escape a backend's root.
pub fn validate_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("Storage key is empty");
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err("Storage key contains invalid characters");
    }
    Ok(())
}
