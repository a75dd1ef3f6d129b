use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageKeyError {
    #[error("image key must not be empty")]
    Empty,
    #[error("image key must be relative (no leading '/')")]
    LeadingSlash,
    #[error("image key must not contain '\\\\'")]
    Backslash,
    #[error("image key must not contain '..'")]
    ParentTraversal,
    #[error("image key must not carry a file extension")]
    Extension,
    #[error("image key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Checks a catalog image key such as `props/tv_unit`.
pub fn validate_image_key(key: &str) -> Result<(), ImageKeyError> {
    if key.is_empty() {
        return Err(ImageKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(ImageKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(ImageKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(ImageKeyError::ParentTraversal);
    }
    if key.contains('.') {
        return Err(ImageKeyError::Extension);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(ImageKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

pub(crate) fn image_path_for_key(asset_root: &Path, key: &str) -> Result<PathBuf, ImageKeyError> {
    validate_image_key(key)?;
    Ok(asset_root
        .join("base")
        .join("images")
        .join(format!("{key}.png")))
}
