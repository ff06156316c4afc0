//! Error types for folio_animation
//!
//! Every variant here is recoverable from the page's point of view: the
//! engine degrades to "that one animation does not play" and reports the
//! condition through [`crate::diagnostics`] instead of aborting.

use std::fmt;

use thiserror::Error;

use crate::host::ElementRef;

/// Why a trigger could not be turned into a concrete scroll range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The anchor element is not in the layout tree (yet)
    MissingElement,
    /// The anchor element (or document) has zero height
    ZeroExtent,
    /// The anchors resolved, but `start >= end` or a bound is not finite
    EmptyRange,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::MissingElement => f.write_str("element not in layout"),
            UnresolvedReason::ZeroExtent => f.write_str("element has zero extent"),
            UnresolvedReason::EmptyRange => f.write_str("range is empty or not finite"),
        }
    }
}

/// Errors produced by the animation engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Trigger anchors could not be resolved for this pass
    #[error("trigger range unresolved ({reason})")]
    UnresolvedRange {
        element: Option<ElementRef>,
        reason: UnresolvedReason,
    },

    /// Target element was removed from the layout tree
    #[error("target element {0} is detached")]
    DetachedTarget(ElementRef),

    /// Anchor string did not parse
    #[error("invalid anchor: {0}")]
    InvalidAnchor(String),

    /// Easing name did not parse
    #[error("invalid easing: {0}")]
    InvalidEasing(String),

    /// Lifecycle handle was already released
    #[error("lifecycle handle already released")]
    HandleReleased,

    /// Lifecycle handle is already attached to a view
    #[error("lifecycle handle already attached")]
    AlreadyAttached,

    /// The engine behind a handle has been shut down or dropped
    #[error("animation engine has shut down")]
    EngineShutDown,

    /// A process-wide engine is already installed on this thread
    #[error("an animation engine is already installed")]
    AlreadyInstalled,

    /// Engine configuration could not be parsed
    #[error("invalid engine config: {0}")]
    Config(String),
}

impl From<toml::de::Error> for AnimationError {
    fn from(err: toml::de::Error) -> Self {
        AnimationError::Config(err.to_string())
    }
}

/// Result type for folio_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
