//! Animatable value types
//!
//! Property values are plain `f32`s; a [`Tween`] maps eased progress onto the
//! `from..to` range of one binding.

use serde::{Deserialize, Serialize};

/// Values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

// ============================================================================
// Tween
// ============================================================================

/// Start and end value of one animated property
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
}

impl Tween {
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    /// Value at eased progress `eased` (expected in [0, 1])
    ///
    /// The endpoints are returned exactly so a finished animation lands on
    /// `to` without float drift.
    pub fn at(&self, eased: f32) -> f32 {
        if eased <= 0.0 {
            self.from
        } else if eased >= 1.0 {
            self.to
        } else {
            self.from.lerp(&self.to, eased)
        }
    }

    /// Value offset from `from` by `delta`, used by pointer-following effects
    pub fn offset(&self, delta: f32) -> f32 {
        self.from + delta
    }
}
