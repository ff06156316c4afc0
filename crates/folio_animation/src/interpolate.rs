//! Interpolation engine
//!
//! Maps scroll offset (and, for time-based modes, the frame clock) to property
//! values. Each registered binding carries a [`BindingState`]; [`evaluate`]
//! advances it by one frame and returns the value to write, or `None` when the
//! output did not change.

use std::time::Duration;

use crate::binding::{BindingSpec, HoverEffect, Mode, OncePlayback, ReplayPolicy, Scrub};
use crate::easing::Easing;
use crate::host::Property;
use crate::resolver::TriggerRange;

/// Snap distance for smoothed followers
const SETTLE_EPSILON: f32 = 1e-4;

/// Clamped position of `offset` inside `range`
///
/// Offsets before the range give exactly 0, after it exactly 1. Non-finite
/// offsets give 0. The result is never NaN.
pub fn progress_in_range(offset: f32, range: &TriggerRange) -> f32 {
    if !offset.is_finite() {
        return 0.0;
    }
    if offset <= range.start() {
        return 0.0;
    }
    if offset >= range.end() {
        return 1.0;
    }
    let t = (offset - range.start()) / range.span();
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Where an offset sits relative to a range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Before,
    Inside,
    After,
}

impl Region {
    pub fn of(offset: f32, range: &TriggerRange) -> Self {
        if !offset.is_finite() || offset < range.start() {
            Region::Before
        } else if offset > range.end() {
            Region::After
        } else {
            Region::Inside
        }
    }
}

// ============================================================================
// Timed Playback
// ============================================================================

/// Linear sweep of a progress value between two points in time
#[derive(Clone, Copy, Debug, PartialEq)]
struct Sweep {
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
}

impl Sweep {
    fn sample(&self, now: Duration) -> f32 {
        if now <= self.start {
            return self.from;
        }
        if self.duration.is_zero() {
            return self.to;
        }
        let k = ((now - self.start).as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        self.from + (self.to - self.from) * k
    }

    fn finished(&self, now: Duration) -> bool {
        now >= self.start + self.duration
    }
}

fn scale_duration(duration: Duration, factor: f32) -> Duration {
    duration.mul_f32(factor.clamp(0.0, 1.0))
}

// ============================================================================
// Per-mode State
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
enum OncePhase {
    /// Waiting for range entry
    Armed,
    Forward(Sweep),
    Backward(Sweep),
    /// Played through to the end value
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct OnceState {
    phase: OncePhase,
    t: f32,
    last_region: Option<Region>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HoverTween {
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ModeState {
    Scrub {
        t: Option<f32>,
        last_now: Option<Duration>,
    },
    Once(OnceState),
    Hover {
        value: Option<f32>,
        tween: Option<HoverTween>,
    },
}

/// Mutable playback state of one registered binding
#[derive(Clone, Debug, PartialEq)]
pub struct BindingState {
    /// Last value handed to the host
    pub written: Option<f32>,
    /// The host reported the target detached; never write again
    pub target_lost: bool,
    mode: ModeState,
}

impl BindingState {
    pub fn new(mode: &Mode) -> Self {
        let mode = match mode {
            Mode::Scrub(_) => ModeState::Scrub {
                t: None,
                last_now: None,
            },
            Mode::Once(_) => ModeState::Once(OnceState {
                phase: OncePhase::Armed,
                t: 0.0,
                last_region: None,
            }),
            Mode::Hover(_) => ModeState::Hover {
                value: None,
                tween: None,
            },
        };
        Self {
            written: None,
            target_lost: false,
            mode,
        }
    }

    /// True when a once binding has finished under the freeze policy
    pub fn is_frozen(&self, spec: &BindingSpec) -> bool {
        match (&self.mode, &spec.mode) {
            (ModeState::Once(state), Mode::Once(once)) => {
                state.phase == OncePhase::Done
                    && once.policy.unwrap_or_default() == ReplayPolicy::Freeze
                    && self.written.is_some()
            }
            _ => false,
        }
    }

    /// True while a time-based animation is in flight
    pub fn is_animating(&self) -> bool {
        match &self.mode {
            ModeState::Scrub { .. } => false,
            ModeState::Once(state) => {
                matches!(state.phase, OncePhase::Forward(_) | OncePhase::Backward(_))
            }
            ModeState::Hover { tween, .. } => tween.is_some(),
        }
    }

    // ------------------------------------------------------------------------
    // Hover signals
    // ------------------------------------------------------------------------

    /// Pointer entered the element
    pub fn hover_enter(&mut self, spec: &BindingSpec, now: Duration) {
        if let Mode::Hover(HoverEffect::Toggle { duration }) = spec.mode {
            self.retarget(spec, spec.tween.to, duration, now);
        }
    }

    /// Pointer moved by (`dx`, `dy`) from the element centre
    pub fn hover_move(&mut self, spec: &BindingSpec, dx: f32, dy: f32, now: Duration) {
        if let Mode::Hover(HoverEffect::Magnetic { strength, duration }) = spec.mode {
            let delta = match spec.property {
                Property::TranslateY | Property::YPercent => dy,
                _ => dx,
            };
            if delta.is_finite() {
                self.retarget(spec, spec.tween.offset(delta * strength), duration, now);
            }
        }
    }

    /// Pointer left the element: every hover effect returns to its rest value
    pub fn hover_leave(&mut self, spec: &BindingSpec, now: Duration) {
        if let Mode::Hover(effect) = spec.mode {
            self.retarget(spec, spec.tween.from, effect.duration(), now);
        }
    }

    fn retarget(&mut self, spec: &BindingSpec, target: f32, duration: Duration, now: Duration) {
        if let ModeState::Hover { value, tween } = &mut self.mode {
            let current = match *tween {
                Some(tw) => sample_hover(&tw, spec.easing, now),
                None => value.unwrap_or(spec.tween.from),
            };
            *value = Some(current);
            *tween = if current == target {
                None
            } else {
                Some(HoverTween {
                    from: current,
                    to: target,
                    start: now,
                    duration,
                })
            };
        }
    }
}

fn sample_hover(tween: &HoverTween, easing: Easing, now: Duration) -> f32 {
    if tween.duration.is_zero() || now >= tween.start + tween.duration {
        return tween.to;
    }
    let k = (now.saturating_sub(tween.start)).as_secs_f32() / tween.duration.as_secs_f32();
    tween.from + (tween.to - tween.from) * easing.apply(k)
}

// ============================================================================
// Evaluation
// ============================================================================

/// Advance a binding by one frame
///
/// `range` is `None` while the binding's trigger is unresolved; scroll-driven
/// modes are then inactive and produce nothing. Returns the value to write
/// when it differs from the last written one, and records it as written.
pub fn evaluate(
    spec: &BindingSpec,
    range: Option<&TriggerRange>,
    state: &mut BindingState,
    offset: f32,
    now: Duration,
) -> Option<f32> {
    if state.target_lost || state.is_frozen(spec) {
        return None;
    }

    let value = match (&spec.mode, &mut state.mode) {
        (Mode::Scrub(scrub), ModeState::Scrub { t, last_now }) => {
            let range = range?;
            let target = progress_in_range(offset, range);
            let next = match (scrub, *t, *last_now) {
                (Scrub::Smoothed(lag), Some(prev), Some(prev_now)) if !lag.is_zero() => {
                    let dt = now.saturating_sub(prev_now).as_secs_f32();
                    let alpha = (dt / lag.as_secs_f32()).min(1.0);
                    let v = prev + (target - prev) * alpha;
                    if (target - v).abs() < SETTLE_EPSILON {
                        target
                    } else {
                        v
                    }
                }
                _ => target,
            };
            *t = Some(next);
            *last_now = Some(now);
            spec.tween.at(spec.easing.apply(next))
        }
        (Mode::Once(once), ModeState::Once(once_state)) => {
            let range = range?;
            step_once(once, once_state, Region::of(offset, range), now);
            spec.tween.at(spec.easing.apply(once_state.t))
        }
        (Mode::Hover(_), ModeState::Hover { value, tween }) => match *tween {
            Some(tw) => {
                let v = sample_hover(&tw, spec.easing, now);
                if now >= tw.start + tw.duration {
                    *value = Some(tw.to);
                    *tween = None;
                }
                v
            }
            None => value.unwrap_or(spec.tween.from),
        },
        // state was built for a different mode
        _ => return None,
    };

    // a curve built with non-finite control points produces nothing to write
    if !value.is_finite() || state.written == Some(value) {
        return None;
    }
    state.written = Some(value);
    Some(value)
}

fn step_once(once: &OncePlayback, state: &mut OnceState, region: Region, now: Duration) {
    let prev = state.last_region.replace(region);
    let policy = once.policy.unwrap_or_default();

    match state.phase {
        OncePhase::Armed => {
            let skipped_through = prev == Some(Region::Before) && region == Region::After;
            if region == Region::Inside || skipped_through {
                state.t = 0.0;
                state.phase = OncePhase::Forward(Sweep {
                    from: 0.0,
                    to: 1.0,
                    start: now + once.delay,
                    duration: once.duration,
                });
            } else if prev.is_none() && region == Region::After {
                // first seen already scrolled past: show the end state
                state.t = 1.0;
                state.phase = OncePhase::Done;
            }
        }
        OncePhase::Forward(sweep) => {
            if policy == ReplayPolicy::Reverse && region == Region::Before {
                state.phase = OncePhase::Backward(Sweep {
                    from: state.t,
                    to: 0.0,
                    start: now,
                    duration: scale_duration(once.duration, state.t),
                });
            } else if sweep.finished(now) {
                state.t = 1.0;
                state.phase = OncePhase::Done;
            } else {
                state.t = sweep.sample(now);
            }
        }
        OncePhase::Backward(sweep) => {
            if region != Region::Before {
                state.phase = OncePhase::Forward(Sweep {
                    from: state.t,
                    to: 1.0,
                    start: now,
                    duration: scale_duration(once.duration, 1.0 - state.t),
                });
            } else if sweep.finished(now) {
                state.t = 0.0;
                state.phase = OncePhase::Armed;
            } else {
                state.t = sweep.sample(now);
            }
        }
        OncePhase::Done => match policy {
            ReplayPolicy::Freeze => {}
            ReplayPolicy::Replay => {
                if region != Region::Inside {
                    state.phase = OncePhase::Armed;
                }
            }
            ReplayPolicy::Reverse => {
                if region == Region::Before {
                    state.phase = OncePhase::Backward(Sweep {
                        from: 1.0,
                        to: 0.0,
                        start: now,
                        duration: once.duration,
                    });
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ElementRef;

    fn range() -> TriggerRange {
        TriggerRange::new(500.0, 1500.0).unwrap()
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn el() -> ElementRef {
        ElementRef::from_raw(1)
    }

    #[test]
    fn test_progress_is_clamped() {
        let r = range();
        assert_eq!(progress_in_range(-1e9, &r), 0.0);
        assert_eq!(progress_in_range(0.0, &r), 0.0);
        assert_eq!(progress_in_range(500.0, &r), 0.0);
        assert_eq!(progress_in_range(1000.0, &r), 0.5);
        assert_eq!(progress_in_range(1500.0, &r), 1.0);
        assert_eq!(progress_in_range(1e9, &r), 1.0);
        assert_eq!(progress_in_range(f32::NAN, &r), 0.0);
        assert_eq!(progress_in_range(f32::INFINITY, &r), 0.0);
    }

    #[test]
    fn test_scrub_immediate_follows_offset() {
        let spec = BindingSpec::scrub(el(), Property::ScaleX, 0.0, 1.0);
        let mut state = BindingState::new(&spec.mode);
        let r = range();
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(0)), Some(0.5));
        // unchanged value is not rewritten
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(16)), None);
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 0.0, ms(32)), Some(0.0));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 9000.0, ms(48)), Some(1.0));
    }

    #[test]
    fn test_non_finite_curve_writes_nothing() {
        let spec = BindingSpec::scrub(el(), Property::Opacity, 0.0, 1.0)
            .easing(Easing::CubicBezier(0.4, f32::NAN, 0.2, 1.0));
        let mut state = BindingState::new(&spec.mode);
        let r = range();
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(0)), None);
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(16)), None);
        assert_eq!(state.written, None);
        // exact endpoints still land
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1500.0, ms(32)), Some(1.0));
    }

    #[test]
    fn test_unresolved_range_is_inactive() {
        let spec = BindingSpec::scrub(el(), Property::ScaleX, 0.0, 1.0);
        let mut state = BindingState::new(&spec.mode);
        assert_eq!(evaluate(&spec, None, &mut state, 1000.0, ms(0)), None);
        assert_eq!(state.written, None);
    }

    #[test]
    fn test_smoothed_scrub_lags_then_settles() {
        let spec =
            BindingSpec::scrub(el(), Property::HeightPercent, 0.0, 100.0).smoothed(ms(1000));
        let mut state = BindingState::new(&spec.mode);
        let r = range();

        // first frame snaps
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 500.0, ms(0)), Some(0.0));

        // jump to the end: a quarter of the lag covers a quarter of the gap
        let v = evaluate(&spec, Some(&r), &mut state, 1500.0, ms(250)).unwrap();
        assert!((v - 25.0).abs() < 1e-3, "{v}");

        // a full lag later it has caught up
        let v = evaluate(&spec, Some(&r), &mut state, 1500.0, ms(1250)).unwrap();
        assert_eq!(v, 100.0);
    }

    #[test]
    fn test_once_plays_over_duration() {
        let spec = BindingSpec::once(el(), Property::Opacity, 0.0, 1.0, ms(1000));
        let mut state = BindingState::new(&spec.mode);
        let r = range();

        assert_eq!(evaluate(&spec, Some(&r), &mut state, 0.0, ms(0)), Some(0.0));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 600.0, ms(100)), None);
        assert!(state.is_animating());
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 600.0, ms(600)), Some(0.5));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 600.0, ms(1100)), Some(1.0));
        assert!(!state.is_animating());
    }

    #[test]
    fn test_once_delay_postpones_start() {
        let spec =
            BindingSpec::once(el(), Property::WidthPercent, 0.0, 80.0, ms(1000)).delay(ms(200));
        let mut state = BindingState::new(&spec.mode);
        let r = range();

        assert_eq!(evaluate(&spec, Some(&r), &mut state, 700.0, ms(0)), Some(0.0));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 700.0, ms(200)), None);
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 700.0, ms(700)), Some(40.0));
    }

    #[test]
    fn test_once_skipped_through_still_plays() {
        let spec = BindingSpec::once(el(), Property::Opacity, 0.0, 1.0, ms(100));
        let mut state = BindingState::new(&spec.mode);
        let r = range();
        evaluate(&spec, Some(&r), &mut state, 0.0, ms(0));
        evaluate(&spec, Some(&r), &mut state, 4000.0, ms(16));
        assert!(state.is_animating());
    }

    #[test]
    fn test_once_first_seen_past_range_shows_end() {
        let spec = BindingSpec::once(el(), Property::Opacity, 0.0, 1.0, ms(600));
        let mut state = BindingState::new(&spec.mode);
        assert_eq!(
            evaluate(&spec, Some(&range()), &mut state, 4000.0, ms(0)),
            Some(1.0)
        );
    }

    #[test]
    fn test_once_freeze_never_rearms() {
        let spec = BindingSpec::once(el(), Property::Opacity, 0.0, 1.0, ms(100))
            .policy(ReplayPolicy::Freeze);
        let mut state = BindingState::new(&spec.mode);
        let r = range();
        evaluate(&spec, Some(&r), &mut state, 1000.0, ms(0));
        evaluate(&spec, Some(&r), &mut state, 1000.0, ms(200));
        assert!(state.is_frozen(&spec));

        for (offset, t) in [(0.0, 300), (1000.0, 400), (0.0, 500)] {
            assert_eq!(evaluate(&spec, Some(&r), &mut state, offset, ms(t)), None);
        }
        assert_eq!(state.written, Some(1.0));
    }

    #[test]
    fn test_once_replay_restarts_on_reentry() {
        let spec = BindingSpec::once(el(), Property::Opacity, 0.0, 1.0, ms(100))
            .policy(ReplayPolicy::Replay);
        let mut state = BindingState::new(&spec.mode);
        let r = range();
        evaluate(&spec, Some(&r), &mut state, 1000.0, ms(0));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(100)), Some(1.0));

        // leave, value stays
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 0.0, ms(200)), None);
        // re-enter: restarts from the beginning
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(300)), Some(0.0));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 1000.0, ms(350)), Some(0.5));
    }

    #[test]
    fn test_once_reverse_plays_back() {
        let spec = BindingSpec::once(el(), Property::Opacity, 0.0, 1.0, ms(100))
            .policy(ReplayPolicy::Reverse);
        let mut state = BindingState::new(&spec.mode);
        let r = range();
        evaluate(&spec, Some(&r), &mut state, 1000.0, ms(0));
        evaluate(&spec, Some(&r), &mut state, 1000.0, ms(100));
        assert_eq!(state.written, Some(1.0));

        // scroll back above the range
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 0.0, ms(200)), None);
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 0.0, ms(250)), Some(0.5));
        assert_eq!(evaluate(&spec, Some(&r), &mut state, 0.0, ms(300)), Some(0.0));

        // forward again on re-entry
        evaluate(&spec, Some(&r), &mut state, 1000.0, ms(400));
        assert!(state.is_animating());
    }

    #[test]
    fn test_hover_toggle_and_leave() {
        let spec = BindingSpec::hover(
            el(),
            Property::Scale,
            1.0,
            1.02,
            HoverEffect::Toggle { duration: ms(200) },
        );
        let mut state = BindingState::new(&spec.mode);
        assert_eq!(evaluate(&spec, None, &mut state, 0.0, ms(0)), Some(1.0));

        state.hover_enter(&spec, ms(0));
        evaluate(&spec, None, &mut state, 0.0, ms(100));
        assert_eq!(evaluate(&spec, None, &mut state, 0.0, ms(200)), Some(1.02));
        assert!(!state.is_animating());

        state.hover_leave(&spec, ms(300));
        assert_eq!(evaluate(&spec, None, &mut state, 0.0, ms(500)), Some(1.0));
    }

    #[test]
    fn test_hover_magnetic_follows_pointer() {
        let spec = BindingSpec::hover(
            el(),
            Property::TranslateY,
            0.0,
            0.0,
            HoverEffect::Magnetic {
                strength: 0.05,
                duration: Duration::ZERO,
            },
        );
        let mut state = BindingState::new(&spec.mode);
        evaluate(&spec, None, &mut state, 0.0, ms(0));

        state.hover_move(&spec, 100.0, -40.0, ms(10));
        assert_eq!(evaluate(&spec, None, &mut state, 0.0, ms(10)), Some(-2.0));

        // enter does nothing for magnetic effects
        state.hover_enter(&spec, ms(20));
        assert_eq!(evaluate(&spec, None, &mut state, 0.0, ms(20)), None);

        state.hover_leave(&spec, ms(30));
        assert_eq!(evaluate(&spec, None, &mut state, 0.0, ms(30)), Some(0.0));
    }

    #[test]
    fn test_lost_target_is_skipped() {
        let spec = BindingSpec::scrub(el(), Property::ScaleX, 0.0, 1.0);
        let mut state = BindingState::new(&spec.mode);
        state.target_lost = true;
        assert_eq!(evaluate(&spec, Some(&range()), &mut state, 1000.0, ms(0)), None);
    }
}
