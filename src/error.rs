use crate::TextStyle;
use std::{fmt, path::PathBuf};

pub type Result<T, E = RenderError> = std::result::Result<T, E>;

/// Errors produced while rendering or persisting an image
///
/// Only `InvalidOption` is recoverable, it is logged and replaced by the
/// option default. Everything else aborts the current render.
#[derive(Debug)]
pub enum RenderError {
    /// Malformed or out of range option value
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },
    /// Referenced file does not exist
    AssetNotFound(PathBuf),
    /// File exists but can not be decoded
    AssetLoad { path: PathBuf, reason: String },
    /// Requested font family is not installed
    FontNotFound { family: String, style: TextStyle },
    /// Font data is present but unusable
    FontLoad(String),
    /// Output could not be written
    Persistence { path: PathBuf, reason: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidOption { key, value, reason } => {
                write!(f, "invalid value {:?} for option {}: {}", value, key, reason)
            }
            RenderError::AssetNotFound(path) => {
                write!(f, "asset does not exist: {}", path.display())
            }
            RenderError::AssetLoad { path, reason } => {
                write!(f, "failed to load {}: {}", path.display(), reason)
            }
            RenderError::FontNotFound { family, style } => {
                write!(f, "font family {:?} ({}) is not installed", family, style)
            }
            RenderError::FontLoad(reason) => write!(f, "failed to load font: {}", reason),
            RenderError::Persistence { path, reason } => {
                write!(f, "failed to save {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for RenderError {}
