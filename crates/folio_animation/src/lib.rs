//! Folio Animation Engine
//!
//! Scroll-synchronized property animation with an explicit view lifecycle.
//!
//! # Features
//!
//! - **Scroll Tracker**: One coalesced progress update per frame, shared by every view
//! - **Binding Registry**: Ordered `(element, property)` index with replace-on-duplicate
//! - **Range Resolver**: Anchor strings like `"top 80%"` resolved against live layout,
//!   debounced recomputation on resize and reflow
//! - **Interpolation**: Clamped progress, GSAP-style easings, scrub, once and hover playback
//! - **Lifecycle**: `attach` / `release` handles and a drop guard for view frameworks
//! - **Headless Host**: In-memory document for tests and tooling

pub mod anchor;
pub mod binding;
pub mod config;
pub mod diagnostics;
pub mod easing;
pub mod engine;
pub mod error;
pub mod headless;
pub mod host;
pub mod interpolate;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod tracker;
pub mod values;

pub use anchor::{Anchor, Edge, Position};
pub use binding::{BindingKey, BindingSpec, HoverEffect, Mode, OncePlayback, ReplayPolicy, Scrub};
pub use config::EngineConfig;
pub use diagnostics::{Diagnostic, DiagnosticLog};
pub use easing::Easing;
pub use engine::{
    get_engine, install_engine, is_engine_installed, try_get_engine, uninstall_engine,
    BindingInfo, EngineHandle, FrameReport, ScrollEngine, Subscription,
};
pub use error::{AnimationError, Result, UnresolvedReason};
pub use headless::{HeadlessDocument, WriteRecord};
pub use host::{ElementBounds, ElementRef, Host, Property, ViewportMetrics};
pub use interpolate::{progress_in_range, BindingState, Region};
pub use lifecycle::{
    AnimatedView, AttachReport, AttachmentId, LifecycleHandle, LifecycleState, MountGuard,
};
pub use registry::{Binding, BindingRegistry, InsertOutcome};
pub use resolver::{resolve_trigger, RecomputeScheduler, TriggerRange, TriggerSpec, TriggerTarget};
pub use tracker::{ScrollProgress, ScrollTracker, Subscriber, SubscriptionId};
pub use values::{Interpolate, Tween};
