//! Trigger anchors
//!
//! An anchor string pairs a point on the trigger element with a point on the
//! viewport: `"top 80%"` means "when the element's top reaches 80% of the
//! viewport height". The scroll offset at which that happens is
//!
//! ```text
//! offset = element.top + element_point - viewport_point
//! ```
//!
//! Either side accepts `top`, `center`, `bottom`, a percentage or a pixel
//! value, optionally followed by a relative `+=N` / `-=N` adjustment in
//! pixels. The keyword `max` stands for the largest reachable scroll offset.

use std::fmt;
use std::str::FromStr;

use crate::error::AnimationError;
use crate::host::{ElementBounds, ViewportMetrics};

/// Base point along an extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Fraction of the extent, stored as a percentage (`80.0` for `80%`)
    Percent(f32),
    /// Absolute pixel distance from the top
    Pixels(f32),
}

/// A point along an extent: base edge plus pixel adjustment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub edge: Edge,
    pub adjust: f32,
}

impl Position {
    pub const fn new(edge: Edge) -> Self {
        Self { edge, adjust: 0.0 }
    }

    /// Pixel distance from the top of an extent of the given size
    pub fn resolve(&self, extent: f32) -> f32 {
        let base = match self.edge {
            Edge::Top => 0.0,
            Edge::Center => extent / 2.0,
            Edge::Bottom => extent,
            Edge::Percent(p) => extent * p / 100.0,
            Edge::Pixels(px) => px,
        };
        base + self.adjust
    }
}

impl FromStr for Position {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnimationError::InvalidAnchor(s.to_string());

        let (base, adjust) = match s.find("+=").or_else(|| s.find("-=")) {
            Some(idx) => {
                let sign = if s[idx..].starts_with('-') { -1.0 } else { 1.0 };
                let amount = parse_pixels(&s[idx + 2..]).ok_or_else(invalid)?;
                (&s[..idx], sign * amount)
            }
            None => (s, 0.0),
        };

        let edge = match base {
            "top" => Edge::Top,
            "center" => Edge::Center,
            "bottom" => Edge::Bottom,
            other => {
                if let Some(pct) = other.strip_suffix('%') {
                    Edge::Percent(pct.parse::<f32>().map_err(|_| invalid())?)
                } else {
                    Edge::Pixels(parse_pixels(other).ok_or_else(invalid)?)
                }
            }
        };

        if let Edge::Percent(v) | Edge::Pixels(v) = edge {
            if !v.is_finite() {
                return Err(invalid());
            }
        }

        Ok(Position { edge, adjust })
    }
}

fn parse_pixels(s: &str) -> Option<f32> {
    let s = s.strip_suffix("px").unwrap_or(s);
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// One end of a trigger range
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Element point meets viewport point
    Pair { element: Position, viewport: Position },
    /// Largest reachable scroll offset
    Max,
}

impl Anchor {
    /// Parse an anchor such as `"top 80%"` or `"max"`
    pub fn parse(s: &str) -> Result<Self, AnimationError> {
        s.parse()
    }

    /// Scroll offset at which this anchor is reached
    pub fn resolve(&self, trigger: ElementBounds, metrics: &ViewportMetrics) -> f32 {
        match self {
            Anchor::Pair { element, viewport } => {
                trigger.top + element.resolve(trigger.height)
                    - viewport.resolve(metrics.viewport_height)
            }
            Anchor::Max => metrics.max_offset(),
        }
    }
}

impl FromStr for Anchor {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "max" {
            return Ok(Anchor::Max);
        }

        let mut parts = trimmed.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(Anchor::Pair {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(AnimationError::InvalidAnchor(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.edge {
            Edge::Top => f.write_str("top")?,
            Edge::Center => f.write_str("center")?,
            Edge::Bottom => f.write_str("bottom")?,
            Edge::Percent(p) => write!(f, "{p}%")?,
            Edge::Pixels(px) => write!(f, "{px}")?,
        }
        if self.adjust > 0.0 {
            write!(f, "+={}", self.adjust)?;
        } else if self.adjust < 0.0 {
            write!(f, "-={}", -self.adjust)?;
        }
        Ok(())
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Pair { element, viewport } => write!(f, "{element} {viewport}"),
            Anchor::Max => f.write_str("max"),
        }
    }
}
