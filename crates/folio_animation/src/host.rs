//! Host boundary
//!
//! The engine never knows what an element looks like. It sees opaque
//! [`ElementRef`] handles, a fixed set of animatable [`Property`] slots, and a
//! [`Host`] that answers layout queries and accepts property writes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque handle to an element owned by the host tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(u64);

impl ElementRef {
    /// Wrap a host-defined raw identifier
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier for passing back to the host
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Animatable property slot on an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    StrokeDashOffset,
    TranslateX,
    TranslateY,
    /// Vertical translation as a percentage of the element's own height
    YPercent,
    Scale,
    ScaleX,
    ScaleY,
    Opacity,
    WidthPercent,
    HeightPercent,
}

impl Property {
    /// Stable lowercase name, used in logs and CLI output
    pub fn name(self) -> &'static str {
        match self {
            Property::StrokeDashOffset => "stroke_dash_offset",
            Property::TranslateX => "translate_x",
            Property::TranslateY => "translate_y",
            Property::YPercent => "y_percent",
            Property::Scale => "scale",
            Property::ScaleX => "scale_x",
            Property::ScaleY => "scale_y",
            Property::Opacity => "opacity",
            Property::WidthPercent => "width_percent",
            Property::HeightPercent => "height_percent",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Scroll and size metrics polled from the host once per frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportMetrics {
    /// Current vertical scroll offset in document pixels
    pub scroll_offset: f32,
    /// Visible height of the viewport
    pub viewport_height: f32,
    /// Total scrollable document height
    pub document_height: f32,
}

impl ViewportMetrics {
    pub fn new(scroll_offset: f32, viewport_height: f32, document_height: f32) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            document_height,
        }
    }

    /// A document that fits in the viewport cannot scroll
    pub fn is_degenerate(&self) -> bool {
        !(self.document_height > self.viewport_height)
    }

    /// Largest reachable scroll offset (0 for a degenerate document)
    pub fn max_offset(&self) -> f32 {
        if self.is_degenerate() {
            0.0
        } else {
            self.document_height - self.viewport_height
        }
    }
}

/// Vertical extent of an element in document pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementBounds {
    pub top: f32,
    pub height: f32,
}

impl ElementBounds {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// The host side of the engine: layout oracle plus property sink
///
/// All methods take `&self`; hosts use interior mutability for writes. The
/// engine never holds its own state borrowed while calling into the host, so
/// a host is free to call back into the engine (for example to release a
/// lifecycle handle from inside `write`).
pub trait Host {
    /// Current scroll offset, viewport height and document height
    fn metrics(&self) -> ViewportMetrics;

    /// Document-space bounds of an element, or `None` if it is not laid out
    fn bounds(&self, element: ElementRef) -> Option<ElementBounds>;

    /// Write a property value
    ///
    /// Returns [`crate::AnimationError::DetachedTarget`] when the element is
    /// gone; the engine then stops writing to that binding.
    fn write(&self, element: ElementRef, property: Property, value: f32) -> Result<()>;
}
