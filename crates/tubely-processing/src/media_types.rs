//! Accepted content types per asset kind.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use tubely_core::{AssetKind, UploadConfig};

use crate::error::ProcessingError;

/// A validated `type/subtype` pair, lowercased, parameters stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    essence: String,
    slash: usize,
}

impl MediaType {
    /// Parse a declared `Content-Type` header value.
    ///
    /// `"Image/JPEG; charset=binary"` parses to `image/jpeg`.
    pub fn parse(raw: &str) -> Result<Self, ProcessingError> {
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let slash = essence
            .find('/')
            .ok_or_else(|| ProcessingError::InvalidContentType(raw.to_string()))?;
        let (top, sub) = (&essence[..slash], &essence[slash + 1..]);
        let is_token = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
        };
        if !is_token(top) || !is_token(sub) {
            return Err(ProcessingError::InvalidContentType(raw.to_string()));
        }

        Ok(Self { essence, slash })
    }

    pub fn as_str(&self) -> &str {
        &self.essence
    }

    pub fn subtype(&self) -> &str {
        &self.essence[self.slash + 1..]
    }

    /// File extension used for storage keys; the subtype of the declared type.
    pub fn extension(&self) -> &str {
        self.subtype()
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.essence)
    }
}

/// Allow-list of accepted media types for every [`AssetKind`].
#[derive(Debug, Clone)]
pub struct MediaTypeRegistry {
    allowed: HashMap<AssetKind, Vec<MediaType>>,
}

impl MediaTypeRegistry {
    /// Build a registry. Every asset kind must have a non-empty list.
    pub fn new<I, S>(entries: I) -> Result<Self, ProcessingError>
    where
        I: IntoIterator<Item = (AssetKind, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut allowed = HashMap::new();
        for (kind, types) in entries {
            let parsed = types
                .iter()
                .map(|t| MediaType::parse(t.as_ref()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ProcessingError::InvalidConfiguration(format!("{}: {}", kind, e)))?;
            allowed.insert(kind, parsed);
        }

        for kind in AssetKind::ALL {
            match allowed.get(&kind) {
                Some(types) if !types.is_empty() => {}
                _ => {
                    return Err(ProcessingError::InvalidConfiguration(format!(
                        "no accepted content types for {}",
                        kind
                    )))
                }
            }
        }

        Ok(Self { allowed })
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self, ProcessingError> {
        Self::new(
            AssetKind::ALL
                .into_iter()
                .map(|kind| (kind, config.allowed_content_types(kind).to_vec())),
        )
    }

    pub fn allowed(&self, kind: AssetKind) -> &[MediaType] {
        self.allowed.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Validate a declared content type for `kind`.
    pub fn validate(&self, kind: AssetKind, declared: &str) -> Result<MediaType, ProcessingError> {
        let media_type = MediaType::parse(declared)?;
        if self.allowed(kind).contains(&media_type) {
            Ok(media_type)
        } else {
            Err(ProcessingError::UnsupportedMediaType {
                content_type: media_type.to_string(),
                allowed: self.allowed(kind).iter().map(ToString::to_string).collect(),
            })
        }
    }
}

impl Default for MediaTypeRegistry {
    fn default() -> Self {
        let allowed = HashMap::from([
            (
                AssetKind::Thumbnail,
                vec![
                    MediaType {
                        essence: "image/png".to_string(),
                        slash: 5,
                    },
                    MediaType {
                        essence: "image/jpeg".to_string(),
                        slash: 5,
                    },
                ],
            ),
            (
                AssetKind::Video,
                vec![MediaType {
                    essence: "video/mp4".to_string(),
                    slash: 5,
                }],
            ),
        ]);
        Self { allowed }
    }
}
