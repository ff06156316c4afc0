//! Binding definitions
//!
//! A [`BindingSpec`] describes one animated property of one element: the
//! value range, the easing, what drives it (scroll scrubbing, one-shot
//! playback or pointer hover) and which scroll interval it reacts to.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Edge, Position};
use crate::easing::Easing;
use crate::host::{ElementRef, Property};
use crate::resolver::{TriggerSpec, TriggerTarget};
use crate::values::Tween;

/// Registry key: at most one live binding per element property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub element: ElementRef,
    pub property: Property,
}

impl BindingKey {
    pub const fn new(element: ElementRef, property: Property) -> Self {
        Self { element, property }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.element, self.property)
    }
}

// ============================================================================
// Playback Modes
// ============================================================================

/// How a scrubbed binding follows scroll
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scrub {
    /// Output tracks scroll progress exactly
    Immediate,
    /// Output catches up with scroll progress over the given lag
    Smoothed(Duration),
}

/// What a one-shot binding does after it has played
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Play once, then stay at the end value forever
    Freeze,
    /// Re-arm when scrolled out of range, replay from the start on re-entry
    #[default]
    Replay,
    /// Play backwards when scrolled back above the range, forwards on re-entry
    Reverse,
}

/// Time-based playback started by entering the trigger range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OncePlayback {
    pub duration: Duration,
    /// Wait before a forward play starts
    pub delay: Duration,
    /// `None` takes the engine's configured default
    pub policy: Option<ReplayPolicy>,
}

/// Pointer-driven effect
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoverEffect {
    /// Tween to `to` on enter and back to `from` on leave
    Toggle { duration: Duration },
    /// Follow the pointer offset from the element centre, scaled by `strength`
    Magnetic { strength: f32, duration: Duration },
}

impl HoverEffect {
    pub fn duration(&self) -> Duration {
        match self {
            HoverEffect::Toggle { duration } | HoverEffect::Magnetic { duration, .. } => *duration,
        }
    }
}

/// What drives a binding
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Scrub(Scrub),
    Once(OncePlayback),
    Hover(HoverEffect),
}

impl Mode {
    /// Scroll-driven modes need a resolved range; hover does not
    pub fn needs_range(&self) -> bool {
        !matches!(self, Mode::Hover(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Scrub(Scrub::Immediate) => "scrub",
            Mode::Scrub(Scrub::Smoothed(_)) => "scrub~",
            Mode::Once(_) => "once",
            Mode::Hover(HoverEffect::Toggle { .. }) => "hover",
            Mode::Hover(HoverEffect::Magnetic { .. }) => "magnetic",
        }
    }
}

// ============================================================================
// Binding Spec
// ============================================================================

/// Declarative description of one animated property
#[derive(Clone, Debug, PartialEq)]
pub struct BindingSpec {
    pub target: ElementRef,
    pub property: Property,
    pub tween: Tween,
    pub easing: Easing,
    pub mode: Mode,
    /// `None` means the whole document, from the top to the maximum offset
    pub trigger: Option<TriggerSpec>,
    /// Element whose pointer events drive a hover binding; `None` means the target
    pub hover_source: Option<ElementRef>,
}

impl BindingSpec {
    fn new(target: ElementRef, property: Property, from: f32, to: f32, mode: Mode) -> Self {
        Self {
            target,
            property,
            tween: Tween::new(from, to),
            easing: Easing::Linear,
            mode,
            trigger: None,
            hover_source: None,
        }
    }

    /// Property scrubbed by scroll progress
    pub fn scrub(target: ElementRef, property: Property, from: f32, to: f32) -> Self {
        Self::new(target, property, from, to, Mode::Scrub(Scrub::Immediate))
    }

    /// Property played once over `duration` when its range is entered
    pub fn once(
        target: ElementRef,
        property: Property,
        from: f32,
        to: f32,
        duration: Duration,
    ) -> Self {
        Self::new(
            target,
            property,
            from,
            to,
            Mode::Once(OncePlayback {
                duration,
                delay: Duration::ZERO,
                policy: None,
            }),
        )
    }

    /// Property driven by pointer enter/move/leave
    pub fn hover(
        target: ElementRef,
        property: Property,
        from: f32,
        to: f32,
        effect: HoverEffect,
    ) -> Self {
        Self::new(target, property, from, to, Mode::Hover(effect))
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Switch a scrub binding to smoothed following; ignored for other modes
    pub fn smoothed(mut self, lag: Duration) -> Self {
        if let Mode::Scrub(_) = self.mode {
            self.mode = Mode::Scrub(Scrub::Smoothed(lag));
        }
        self
    }

    /// Delay forward playback of a once binding; ignored for other modes
    pub fn delay(mut self, delay: Duration) -> Self {
        if let Mode::Once(ref mut once) = self.mode {
            once.delay = delay;
        }
        self
    }

    /// Replay policy of a once binding; ignored for other modes
    pub fn policy(mut self, policy: ReplayPolicy) -> Self {
        if let Mode::Once(ref mut once) = self.mode {
            once.policy = Some(policy);
        }
        self
    }

    /// Drive a hover binding from pointer events on `element` instead of the target
    pub fn hovered_by(mut self, element: ElementRef) -> Self {
        self.hover_source = Some(element);
        self
    }

    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.target, self.property)
    }

    /// Element whose pointer events reach this binding
    pub fn hover_element(&self) -> ElementRef {
        self.hover_source.unwrap_or(self.target)
    }

    /// Trigger used for resolution, with the whole-document default applied
    pub fn effective_trigger(&self) -> TriggerSpec {
        self.trigger.unwrap_or(TriggerSpec::Anchored {
            target: TriggerTarget::Document,
            start: Anchor::Pair {
                element: Position::new(Edge::Top),
                viewport: Position::new(Edge::Top),
            },
            end: Anchor::Max,
        })
    }
}
