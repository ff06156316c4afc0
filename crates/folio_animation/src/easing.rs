//! Easing curves
//!
//! Power curves follow the scroll-animation naming (`power2.inOut`, where
//! `powerN` is a polynomial of degree `N + 1`), and the `ease*` presets are the
//! cubic-bezier curves used by CSS-style motion libraries.

use std::str::FromStr;

use crate::error::AnimationError;

/// Timing curve applied to normalized progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// `powerN.in` with N in 1..=4
    PowerIn(u8),
    /// `powerN.out` with N in 1..=4
    PowerOut(u8),
    /// `powerN.inOut` with N in 1..=4
    PowerInOut(u8),
    /// cubic-bezier(0.42, 0, 1, 1)
    EaseIn,
    /// cubic-bezier(0, 0, 0.58, 1)
    EaseOut,
    /// cubic-bezier(0.42, 0, 0.58, 1)
    EaseInOut,
    /// Arbitrary cubic-bezier(x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the curve to `t`. Input is clamped to [0, 1]; endpoints map exactly.
    pub fn apply(&self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::PowerIn(n) => t.powi(exponent(n)),
            Easing::PowerOut(n) => 1.0 - (1.0 - t).powi(exponent(n)),
            Easing::PowerInOut(n) => {
                let e = exponent(n);
                if t < 0.5 {
                    (2.0 * t).powi(e) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(e) / 2.0
                }
            }
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }

    /// Parse an easing name such as `none`, `power2.inOut`, `easeOut` or
    /// `cubic-bezier(0.4, 0, 0.2, 1)`
    pub fn parse(name: &str) -> Result<Self, AnimationError> {
        name.parse()
    }
}

fn exponent(n: u8) -> i32 {
    i32::from(n.clamp(1, 4)) + 1
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let invalid = || AnimationError::InvalidEasing(name.to_string());

        match name {
            "none" | "linear" | "power0" | "power0.in" | "power0.out" | "power0.inOut" => {
                return Ok(Easing::Linear)
            }
            "easeIn" | "ease-in" => return Ok(Easing::EaseIn),
            "easeOut" | "ease-out" => return Ok(Easing::EaseOut),
            "easeInOut" | "ease-in-out" => return Ok(Easing::EaseInOut),
            _ => {}
        }

        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let values: Vec<f32> = args
                .split(',')
                .map(|v| v.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| invalid())?;
            return match values.as_slice() {
                [x1, y1, x2, y2]
                    if (0.0..=1.0).contains(x1)
                        && (0.0..=1.0).contains(x2)
                        && y1.is_finite()
                        && y2.is_finite() =>
                {
                    Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2))
                }
                _ => Err(invalid()),
            };
        }

        let rest = name.strip_prefix("power").ok_or_else(invalid)?;
        let (degree, direction) = match rest.split_once('.') {
            Some((d, dir)) => (d, dir),
            None => (rest, "out"),
        };
        let n: u8 = degree.parse().map_err(|_| invalid())?;
        if !(1..=4).contains(&n) {
            return Err(invalid());
        }
        match direction {
            "in" => Ok(Easing::PowerIn(n)),
            "out" => Ok(Easing::PowerOut(n)),
            "inOut" => Ok(Easing::PowerInOut(n)),
            _ => Err(invalid()),
        }
    }
}

/// Evaluate a CSS-style cubic bezier with endpoints (0,0) and (1,1) at `x`
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |t: f32| ((ax * t + bx) * t + cx) * t;
    let sample_dx = |t: f32| (3.0 * ax * t + 2.0 * bx) * t + cx;
    let sample_y = |t: f32| ((ay * t + by) * t + cy) * t;

    // Newton-Raphson first, bisection if the slope gets too flat
    let mut t = x;
    for _ in 0..8 {
        let err = sample_x(t) - x;
        if err.abs() < 1e-6 {
            return sample_y(t);
        }
        let d = sample_dx(t);
        if d.abs() < 1e-6 {
            break;
        }
        t -= err / d;
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    t = x;
    for _ in 0..32 {
        let v = sample_x(t);
        if (v - x).abs() < 1e-6 {
            break;
        }
        if v < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    sample_y(t)
}
