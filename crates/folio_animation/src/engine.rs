//! Scroll animation engine
//!
//! Owns the tracker, registry, resolver state and attachment arena behind one
//! shared single-threaded cell, and drives them once per frame:
//!
//! 1. poll host metrics (only while something is subscribed)
//! 2. run a due recomputation pass over every trigger range
//! 3. publish scroll progress
//! 4. evaluate bindings in registration order
//! 5. hand changed values to the host
//! 6. notify `on_update` subscribers
//!
//! No engine borrow is held while the host or a subscriber callback runs, so
//! those may attach views, release handles or unsubscribe freely. Every write
//! re-checks that its binding is still the same registration first.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use slotmap::SlotMap;

use crate::binding::{BindingKey, BindingSpec, Mode};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::error::{AnimationError, Result};
use crate::host::{ElementRef, Host, ViewportMetrics};
use crate::interpolate::evaluate;
use crate::lifecycle::{
    AnimatedView, AttachReport, Attachment, AttachmentId, LifecycleHandle, PendingSpec,
};
use crate::registry::BindingRegistry;
use crate::resolver::{resolve_trigger, RecomputeScheduler, TriggerRange, TriggerSpec};
use crate::tracker::{ScrollProgress, ScrollTracker, Subscriber, SubscriptionId};

// ============================================================================
// Global Engine State
// ============================================================================

thread_local! {
    static ENGINE: RefCell<Option<ScrollEngine>> = const { RefCell::new(None) };
}

/// Install the process-wide engine for this thread
///
/// Returns [`AnimationError::AlreadyInstalled`] if one is already installed;
/// the engine is never replaced implicitly.
pub fn install_engine(engine: ScrollEngine) -> Result<()> {
    ENGINE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(AnimationError::AlreadyInstalled);
        }
        *slot = Some(engine);
        Ok(())
    })
}

/// Get the process-wide engine
///
/// # Panics
///
/// Panics if `install_engine()` has not been called on this thread.
pub fn get_engine() -> ScrollEngine {
    try_get_engine()
        .expect("Scroll engine not installed. Call install_engine() before mounting views.")
}

/// Try to get the process-wide engine (returns None if not installed)
pub fn try_get_engine() -> Option<ScrollEngine> {
    ENGINE.with(|slot| slot.borrow().clone())
}

/// Remove the process-wide engine and shut it down
///
/// Every binding and subscriber is dropped; outstanding lifecycle handles
/// become no-ops on release.
pub fn uninstall_engine() -> Option<ScrollEngine> {
    let engine = ENGINE.with(|slot| slot.borrow_mut().take());
    if let Some(engine) = &engine {
        engine.shutdown();
    }
    engine
}

/// Check if an engine is installed on this thread
pub fn is_engine_installed() -> bool {
    ENGINE.with(|slot| slot.borrow().is_some())
}

// ============================================================================
// Engine State
// ============================================================================

struct EngineInner {
    config: EngineConfig,
    tracker: ScrollTracker,
    registry: BindingRegistry,
    attachments: SlotMap<AttachmentId, Attachment>,
    recompute: RecomputeScheduler,
    diagnostics: DiagnosticLog,
    frame: u64,
    shut_down: bool,
}

impl EngineInner {
    /// Insert into the registry and keep attachment ownership in sync
    fn register(&mut self, owner: AttachmentId, spec: BindingSpec, range: Option<TriggerRange>) {
        let key = spec.key();
        let outcome = self.registry.insert(owner, spec, range);

        if let Some(previous) = outcome.replaced {
            self.diagnostics.push(Diagnostic::DuplicateBinding { key });
            if previous != owner {
                self.forget_key(previous, key);
            }
        }

        if let Some(attachment) = self.attachments.get_mut(owner) {
            if !attachment.keys.contains(&key) {
                attachment.keys.push(key);
            }
        }
    }

    /// `owner` lost `key` to a newer registration
    fn forget_key(&mut self, owner: AttachmentId, key: BindingKey) {
        if let Some(attachment) = self.attachments.get_mut(owner) {
            attachment.keys.retain(|k| *k != key);
            if attachment.is_empty() {
                if let Some(sub) = attachment.subscription.take() {
                    self.tracker.unsubscribe(sub);
                }
            }
        }
    }

    fn ensure_subscribed(&mut self, id: AttachmentId) {
        if let Some(attachment) = self.attachments.get_mut(id) {
            if attachment.subscription.is_none() && !attachment.is_empty() {
                attachment.subscription = Some(self.tracker.subscribe(Subscriber::Attachment(id)));
            }
        }
    }

    fn view_name(&self, id: AttachmentId) -> String {
        self.attachments
            .get(id)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }
}

struct Shared {
    host: Rc<dyn Host>,
    state: RefCell<EngineInner>,
}

// ============================================================================
// Public Types
// ============================================================================

/// Summary of one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Progress published this frame, if it changed
    pub progress: Option<ScrollProgress>,
    /// Bindings evaluated
    pub evaluated: usize,
    /// Values handed to the host
    pub writes: usize,
    /// Bindings skipped (unresolved, frozen or detached)
    pub skipped: usize,
    /// Trigger ranges recomputed this frame
    pub recomputed: usize,
}

/// Snapshot of one registered binding
#[derive(Clone, Debug, PartialEq)]
pub struct BindingInfo {
    pub key: BindingKey,
    pub view: String,
    pub mode: &'static str,
    pub range: Option<TriggerRange>,
    pub value: Option<f32>,
}

/// Handle to an `on_update` callback
///
/// Unsubscribes on drop. `unsubscribe` may be called any number of times.
pub struct Subscription {
    engine: EngineHandle,
    id: SubscriptionId,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.shared.state.borrow_mut().tracker.unsubscribe(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        match self.engine.upgrade() {
            Some(engine) => {
                let inner = engine.shared.state.borrow();
                inner.tracker.is_subscribed(self.id)
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Weak reference to an engine, held by lifecycle handles and subscriptions
#[derive(Clone)]
pub struct EngineHandle {
    shared: Weak<Shared>,
}

impl EngineHandle {
    /// The engine, if it still exists and has not been shut down
    pub fn upgrade(&self) -> Option<ScrollEngine> {
        let shared = self.shared.upgrade()?;
        if shared.state.borrow().shut_down {
            return None;
        }
        Some(ScrollEngine { shared })
    }

    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }
}

// ============================================================================
// Scroll Engine
// ============================================================================

/// The scroll-synchronized animation engine
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ScrollEngine {
    shared: Rc<Shared>,
}

impl ScrollEngine {
    pub fn new(host: Rc<dyn Host>, config: EngineConfig) -> Self {
        let inner = EngineInner {
            tracker: ScrollTracker::new(),
            registry: BindingRegistry::new(),
            attachments: SlotMap::with_key(),
            recompute: RecomputeScheduler::new(config.resize_debounce()),
            diagnostics: DiagnosticLog::new(config.diagnostics_capacity),
            frame: 0,
            shut_down: false,
            config,
        };
        Self {
            shared: Rc::new(Shared {
                host,
                state: RefCell::new(inner),
            }),
        }
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.shared.state.borrow().config.clone()
    }

    /// Attach a view with a fresh lifecycle handle
    pub fn attach(&self, view: &dyn AnimatedView) -> Result<LifecycleHandle> {
        let handle = LifecycleHandle::new(self);
        handle.attach(view)?;
        Ok(handle)
    }

    /// Subscribe to published scroll progress
    pub fn on_update<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(&ScrollProgress) + 'static,
    {
        let mut inner = self.shared.state.borrow_mut();
        if inner.shut_down {
            return Err(AnimationError::EngineShutDown);
        }
        let id = inner.tracker.subscribe(Subscriber::Callback(Rc::new(callback)));
        // new listeners get the current progress on the next frame
        inner.tracker.mark_dirty();
        Ok(Subscription {
            engine: self.handle(),
            id,
        })
    }

    // ------------------------------------------------------------------------
    // Host signals
    // ------------------------------------------------------------------------

    /// Raw scroll event; coalesced until the next frame
    pub fn notify_scroll(&self) {
        self.shared.state.borrow_mut().tracker.notify_scroll();
    }

    /// Viewport size changed at `now`; ranges are recomputed after the debounce
    pub fn notify_resize(&self, now: Duration) {
        let mut inner = self.shared.state.borrow_mut();
        inner.recompute.request(now);
        inner.tracker.mark_dirty();
    }

    /// Layout changed without a resize (content loaded, element moved)
    pub fn notify_reflow(&self, now: Duration) {
        self.notify_resize(now);
    }

    /// Recompute every range on the next frame, skipping the debounce
    pub fn refresh(&self) {
        let mut inner = self.shared.state.borrow_mut();
        inner.recompute.force();
        inner.tracker.mark_dirty();
    }

    /// Pointer entered `element`; reaches every hover binding it drives
    pub fn pointer_enter(&self, element: ElementRef, now: Duration) {
        let mut inner = self.shared.state.borrow_mut();
        for binding in inner.registry.iter_mut() {
            if binding.spec.hover_element() == element {
                binding.state.hover_enter(&binding.spec, now);
            }
        }
    }

    /// Pointer moved to (`dx`, `dy`) relative to the centre of `element`
    pub fn pointer_move(&self, element: ElementRef, dx: f32, dy: f32, now: Duration) {
        let mut inner = self.shared.state.borrow_mut();
        for binding in inner.registry.iter_mut() {
            if binding.spec.hover_element() == element {
                binding.state.hover_move(&binding.spec, dx, dy, now);
            }
        }
    }

    /// Pointer left `element`; all of its hover effects return to rest together
    pub fn pointer_leave(&self, element: ElementRef, now: Duration) {
        let mut inner = self.shared.state.borrow_mut();
        for binding in inner.registry.iter_mut() {
            if binding.spec.hover_element() == element {
                binding.state.hover_leave(&binding.spec, now);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    /// Run one frame at time `now`
    pub fn frame(&self, now: Duration) -> FrameReport {
        let host = Rc::clone(&self.shared.host);

        let (frame, recompute_due) = {
            let mut inner = self.shared.state.borrow_mut();
            if inner.shut_down {
                return FrameReport::default();
            }
            inner.frame += 1;
            let due = inner.recompute.take_due(now);
            if !inner.tracker.has_subscribers() {
                return FrameReport {
                    frame: inner.frame,
                    ..FrameReport::default()
                };
            }
            (inner.frame, due)
        };

        let metrics = host.metrics();
        let mut report = FrameReport {
            frame,
            ..FrameReport::default()
        };

        if recompute_due {
            report.recomputed = self.recompute_ranges(&*host, &metrics);
        }

        // evaluate in registration order
        let writes: Vec<(BindingKey, u64, f32)> = {
            let mut guard = self.shared.state.borrow_mut();
            let inner = &mut *guard;
            report.progress = inner.tracker.poll(&metrics, frame);

            let mut writes = Vec::new();
            for binding in inner.registry.iter_mut() {
                let inactive = binding.state.target_lost
                    || binding.state.is_frozen(&binding.spec)
                    || (binding.spec.mode.needs_range() && binding.range.is_none());
                if inactive {
                    report.skipped += 1;
                    continue;
                }
                report.evaluated += 1;
                if let Some(value) = evaluate(
                    &binding.spec,
                    binding.range.as_ref(),
                    &mut binding.state,
                    metrics.scroll_offset,
                    now,
                ) {
                    writes.push((binding.key, binding.serial, value));
                }
            }
            writes
        };

        for (key, serial, value) in writes {
            if !self.shared.state.borrow().registry.is_live(&key, serial) {
                continue;
            }
            match host.write(key.element, key.property, value) {
                Ok(()) => report.writes += 1,
                Err(AnimationError::DetachedTarget(_)) => {
                    let mut guard = self.shared.state.borrow_mut();
                    let inner = &mut *guard;
                    if let Some(binding) = inner.registry.get_live_mut(&key, serial) {
                        binding.state.target_lost = true;
                        inner.diagnostics.push(Diagnostic::DetachedTarget { key });
                    }
                }
                Err(err) => {
                    tracing::warn!("write to {} failed: {}", key, err);
                }
            }
        }

        if let Some(progress) = report.progress {
            let callbacks = self.shared.state.borrow().tracker.callbacks();
            for (id, callback) in callbacks {
                if self.shared.state.borrow().tracker.is_subscribed(id) {
                    callback(&progress);
                }
            }
        }

        tracing::trace!(
            frame,
            evaluated = report.evaluated,
            writes = report.writes,
            "frame"
        );
        report
    }

    /// Re-resolve every live range and retry pending specs
    fn recompute_ranges(&self, host: &dyn Host, metrics: &ViewportMetrics) -> usize {
        struct RangeJob {
            key: BindingKey,
            serial: u64,
            trigger: TriggerSpec,
            view: String,
        }

        let (jobs, pending) = {
            let mut guard = self.shared.state.borrow_mut();
            let inner = &mut *guard;
            let jobs: Vec<RangeJob> = inner
                .registry
                .iter()
                .filter(|b| b.spec.mode.needs_range())
                .map(|b| RangeJob {
                    key: b.key,
                    serial: b.serial,
                    trigger: b.spec.effective_trigger(),
                    view: inner.view_name(b.owner),
                })
                .collect();
            let pending: Vec<(AttachmentId, Vec<PendingSpec>)> = inner
                .attachments
                .iter_mut()
                .filter(|(_, a)| !a.pending.is_empty())
                .map(|(id, a)| (id, std::mem::take(&mut a.pending)))
                .collect();
            (jobs, pending)
        };

        let resolved: Vec<Result<TriggerRange>> = jobs
            .iter()
            .map(|job| resolve_trigger(&job.trigger, metrics, |el| host.bounds(el)))
            .collect();
        let retried: Vec<(AttachmentId, Vec<(PendingSpec, Result<TriggerRange>)>)> = pending
            .into_iter()
            .map(|(id, specs)| {
                let results = specs
                    .into_iter()
                    .map(|pending| {
                        let trigger = pending.spec.effective_trigger();
                        let range = resolve_trigger(&trigger, metrics, |el| host.bounds(el));
                        (pending, range)
                    })
                    .collect();
                (id, results)
            })
            .collect();

        let mut guard = self.shared.state.borrow_mut();
        let inner = &mut *guard;
        let mut recomputed = 0;

        for (job, result) in jobs.into_iter().zip(resolved) {
            let Some(binding) = inner.registry.get_live_mut(&job.key, job.serial) else {
                continue;
            };
            match result {
                Ok(range) => {
                    binding.range = Some(range);
                    recomputed += 1;
                }
                Err(AnimationError::UnresolvedRange { reason, .. }) => {
                    if binding.range.take().is_some() {
                        inner.diagnostics.push(Diagnostic::UnresolvedRange {
                            view: job.view,
                            key: job.key,
                            reason,
                        });
                    }
                }
                Err(err) => tracing::warn!("recompute {} failed: {}", job.key, err),
            }
        }

        for (id, results) in retried {
            if !inner.attachments.contains_key(id) {
                continue;
            }
            for (pending, result) in results {
                let key = pending.spec.key();
                let superseded = inner
                    .registry
                    .get(&key)
                    .is_some_and(|b| b.owner != id && b.serial > pending.requested_at);
                if superseded {
                    // a later registration already owns the key
                    inner.diagnostics.push(Diagnostic::DuplicateBinding { key });
                    continue;
                }
                match result {
                    Ok(range) => {
                        tracing::debug!("{} resolved on retry", key);
                        inner.register(id, pending.spec, Some(range));
                        recomputed += 1;
                    }
                    Err(_) => {
                        if let Some(attachment) = inner.attachments.get_mut(id) {
                            attachment.pending.push(pending);
                        }
                    }
                }
            }
            if let Some(attachment) = inner.attachments.get_mut(id) {
                if attachment.is_empty() {
                    if let Some(sub) = attachment.subscription.take() {
                        inner.tracker.unsubscribe(sub);
                    }
                }
            }
        }

        tracing::debug!(recomputed, "trigger ranges recomputed");
        recomputed
    }

    // ------------------------------------------------------------------------
    // Lifecycle plumbing
    // ------------------------------------------------------------------------

    pub(crate) fn attach_view(
        &self,
        view: &dyn AnimatedView,
    ) -> Result<(AttachmentId, AttachReport)> {
        let default_replay = {
            let inner = self.shared.state.borrow();
            if inner.shut_down {
                return Err(AnimationError::EngineShutDown);
            }
            inner.config.default_replay
        };

        let name = view.name().to_string();
        let specs = view.bindings();
        let host = Rc::clone(&self.shared.host);
        let metrics = host.metrics();

        let resolved: Vec<(BindingSpec, Result<Option<TriggerRange>>)> = specs
            .into_iter()
            .map(|mut spec| {
                if let Mode::Once(ref mut once) = spec.mode {
                    once.policy.get_or_insert(default_replay);
                }
                let range = if spec.mode.needs_range() {
                    resolve_trigger(&spec.effective_trigger(), &metrics, |el| host.bounds(el))
                        .map(Some)
                } else {
                    Ok(None)
                };
                (spec, range)
            })
            .collect();

        let mut guard = self.shared.state.borrow_mut();
        let inner = &mut *guard;
        if inner.shut_down {
            return Err(AnimationError::EngineShutDown);
        }

        let id = inner.attachments.insert(Attachment::new(name.clone()));
        let mut report = AttachReport::default();

        for (spec, range) in resolved {
            match range {
                Ok(range) => {
                    inner.register(id, spec, range);
                    report.attached += 1;
                }
                Err(AnimationError::UnresolvedRange { reason, .. }) => {
                    inner.diagnostics.push(Diagnostic::UnresolvedRange {
                        view: name.clone(),
                        key: spec.key(),
                        reason,
                    });
                    let requested_at = inner.registry.last_serial();
                    if let Some(attachment) = inner.attachments.get_mut(id) {
                        attachment.pending.push(PendingSpec { spec, requested_at });
                    }
                    report.pending += 1;
                }
                Err(err) => {
                    tracing::warn!("{}: dropping {}: {}", name, spec.key(), err);
                }
            }
        }

        inner.ensure_subscribed(id);
        inner.tracker.mark_dirty();

        tracing::debug!(
            view = %name,
            attached = report.attached,
            pending = report.pending,
            "view attached"
        );
        Ok((id, report))
    }

    pub(crate) fn release_attachment(&self, id: AttachmentId) {
        let mut guard = self.shared.state.borrow_mut();
        let inner = &mut *guard;
        let Some(attachment) = inner.attachments.remove(id) else {
            return;
        };

        let mut removed = 0;
        for key in &attachment.keys {
            if inner.registry.remove_owned(key, id).is_some() {
                removed += 1;
            }
        }
        if let Some(sub) = attachment.subscription {
            inner.tracker.unsubscribe(sub);
        }

        tracing::debug!(view = %attachment.name, removed, "view released");
    }

    /// (registered, pending) counts for an attachment
    pub(crate) fn attachment_counts(&self, id: AttachmentId) -> (usize, usize) {
        self.shared
            .state
            .borrow()
            .attachments
            .get(id)
            .map_or((0, 0), |a| (a.keys.len(), a.pending.len()))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Most recently published scroll progress
    pub fn progress(&self) -> Option<ScrollProgress> {
        self.shared.state.borrow().tracker.current()
    }

    pub fn frame_count(&self) -> u64 {
        self.shared.state.borrow().frame
    }

    pub fn binding_count(&self) -> usize {
        self.shared.state.borrow().registry.len()
    }

    pub fn attachment_count(&self) -> usize {
        self.shared.state.borrow().attachments.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.state.borrow().tracker.subscriber_count()
    }

    /// Resolved range of a binding (`None` if absent or unresolved)
    pub fn binding_range(&self, key: BindingKey) -> Option<TriggerRange> {
        self.shared
            .state
            .borrow()
            .registry
            .get(&key)
            .and_then(|b| b.range)
    }

    /// Snapshot of every binding in update order
    pub fn bindings(&self) -> Vec<BindingInfo> {
        let inner = self.shared.state.borrow();
        inner
            .registry
            .iter()
            .map(|b| BindingInfo {
                key: b.key,
                view: inner.view_name(b.owner),
                mode: b.spec.mode.label(),
                range: b.range,
                value: b.state.written,
            })
            .collect()
    }

    /// Take buffered diagnostics, oldest first
    pub fn drain_diagnostics(&self) -> Vec<Diagnostic> {
        self.shared.state.borrow_mut().diagnostics.drain()
    }

    /// Drop every binding, attachment and subscriber; later frames do nothing
    pub fn shutdown(&self) {
        let mut inner = self.shared.state.borrow_mut();
        if inner.shut_down {
            return;
        }
        inner.shut_down = true;
        inner.registry.clear();
        inner.attachments.clear();
        inner.tracker.clear();
        tracing::debug!("scroll engine shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.state.borrow().shut_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;
    use crate::host::Property;
    use std::cell::Cell;

    struct Views(Vec<BindingSpec>);

    impl AnimatedView for Views {
        fn name(&self) -> &str {
            "views"
        }

        fn bindings(&self) -> Vec<BindingSpec> {
            self.0.clone()
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup() -> (Rc<HeadlessDocument>, ScrollEngine) {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 3000.0));
        let engine = ScrollEngine::new(doc.clone(), EngineConfig::default());
        (doc, engine)
    }

    #[test]
    fn test_no_polling_without_subscribers() {
        let (_doc, engine) = setup();
        let report = engine.frame(ms(0));
        assert_eq!(report.frame, 1);
        assert!(report.progress.is_none());
        assert!(engine.progress().is_none());
    }

    #[test]
    fn test_on_update_receives_progress() {
        let (doc, engine) = setup();
        let seen = Rc::new(Cell::new(-1.0f32));
        let seen2 = Rc::clone(&seen);
        let sub = engine
            .on_update(move |p| seen2.set(p.normalized))
            .unwrap();

        doc.scroll_to(1000.0);
        engine.notify_scroll();
        engine.frame(ms(0));
        assert_eq!(seen.get(), 0.5);

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        doc.scroll_to(2000.0);
        engine.frame(ms(16));
        assert_eq!(seen.get(), 0.5);
    }

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let (_doc, engine) = setup();
        {
            let _sub = engine.on_update(|_| {}).unwrap();
            assert_eq!(engine.subscriber_count(), 1);
        }
        assert_eq!(engine.subscriber_count(), 0);
    }

    #[test]
    fn test_write_order_follows_registration() {
        let (doc, engine) = setup();
        let a = doc.insert("a", 0.0, 100.0);
        let b = doc.insert("b", 100.0, 100.0);
        let view = Views(vec![
            BindingSpec::scrub(b, Property::Opacity, 0.0, 1.0),
            BindingSpec::scrub(a, Property::Opacity, 0.0, 1.0),
        ]);
        let _handle = engine.attach(&view).unwrap();
        engine.frame(ms(0));

        let order: Vec<ElementRef> = doc.writes().iter().map(|w| w.element).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn test_duplicate_registration_reports_diagnostic() {
        let (doc, engine) = setup();
        let a = doc.insert("a", 0.0, 100.0);
        let first = engine
            .attach(&Views(vec![BindingSpec::scrub(a, Property::Opacity, 0.0, 1.0)]))
            .unwrap();
        let second = engine
            .attach(&Views(vec![BindingSpec::scrub(a, Property::Opacity, 1.0, 0.0)]))
            .unwrap();
        assert_eq!(engine.binding_count(), 1);
        assert_eq!(first.binding_count(), 0);
        assert_eq!(second.binding_count(), 1);

        let diags = engine.drain_diagnostics();
        assert!(diags
            .iter()
            .any(|d| matches!(d, Diagnostic::DuplicateBinding { .. })));

        // the older owner can no longer remove the newer binding
        first.release();
        assert_eq!(engine.binding_count(), 1);
        second.release();
        assert_eq!(engine.binding_count(), 0);
    }

    #[test]
    fn test_detached_target_stops_writes() {
        let (doc, engine) = setup();
        let a = doc.insert("a", 0.0, 100.0);
        let _handle = engine
            .attach(&Views(vec![BindingSpec::scrub(a, Property::Opacity, 0.0, 1.0)]))
            .unwrap();
        engine.frame(ms(0));
        assert_eq!(doc.write_count(), 1);

        doc.detach(a);
        doc.scroll_to(1000.0);
        engine.frame(ms(16));
        doc.scroll_to(1500.0);
        engine.frame(ms(32));
        assert_eq!(doc.write_count(), 1);

        let diags = engine.drain_diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0], Diagnostic::DetachedTarget { .. }));
    }

    #[test]
    fn test_global_install_is_explicit() {
        assert!(try_get_engine().is_none());
        let (_doc, engine) = setup();
        install_engine(engine.clone()).unwrap();
        assert!(is_engine_installed());
        assert_eq!(
            install_engine(engine.clone()).unwrap_err(),
            AnimationError::AlreadyInstalled
        );
        assert!(get_engine().handle().is_alive());

        let removed = uninstall_engine().unwrap();
        assert!(removed.is_shut_down());
        assert!(try_get_engine().is_none());
        assert!(uninstall_engine().is_none());
    }

    #[test]
    fn test_shutdown_invalidates_handles() {
        let (doc, engine) = setup();
        let a = doc.insert("a", 0.0, 100.0);
        let view = Views(vec![BindingSpec::scrub(a, Property::Opacity, 0.0, 1.0)]);
        let handle = engine.attach(&view).unwrap();
        engine.shutdown();
        assert_eq!(engine.binding_count(), 0);
        handle.release();
        assert!(matches!(
            engine.attach(&view),
            Err(AnimationError::EngineShutDown)
        ));
        assert_eq!(engine.frame(ms(0)), FrameReport::default());
    }
}
