//! Site error types

use folio_animation::AnimationError;
use thiserror::Error;

/// Errors raised while laying out or mounting the site
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    /// An SVG path string did not parse
    #[error("invalid flow path at token {position}: {reason}")]
    InvalidPath { position: usize, reason: String },

    /// The animation engine rejected a view
    #[error("animation error: {0}")]
    Animation(#[from] AnimationError),
}

/// Result type for site operations
pub type Result<T> = std::result::Result<T, SiteError>;
