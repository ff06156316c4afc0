//! Lifecycle manager
//!
//! A view's animations live exactly as long as its [`LifecycleHandle`] is
//! attached. Attaching registers the view's bindings and subscribes it to the
//! scroll tracker; [`LifecycleHandle::release`] removes every binding the
//! handle still owns and drops the subscription. Release is the only teardown
//! path and is safe to call any number of times, including from inside a
//! frame.
//!
//! ```text
//! Uninitialized ──attach──▶ Attached ──release──▶ Released
//!       └──────────────────release───────────────────┘
//! ```

use std::cell::Cell;

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::binding::{BindingKey, BindingSpec};
use crate::engine::{EngineHandle, ScrollEngine};
use crate::error::{AnimationError, Result};
use crate::tracker::SubscriptionId;

new_key_type! {
    /// Handle to an attached view inside the engine
    pub struct AttachmentId;
}

/// A mounted visual unit that declares scroll-linked bindings
pub trait AnimatedView {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Bindings to register on attach
    ///
    /// Called once per attach. Specs whose trigger cannot be resolved yet are
    /// kept pending and retried on the next recomputation pass.
    fn bindings(&self) -> Vec<BindingSpec>;
}

/// Where a handle is in its life
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Attached,
    Released,
}

/// A spec waiting for its trigger to resolve
#[derive(Debug)]
pub(crate) struct PendingSpec {
    pub(crate) spec: BindingSpec,
    /// Registry serial at the time of the request; a holder above it is newer
    pub(crate) requested_at: u64,
}

/// Engine-side record of one attached view
#[derive(Debug)]
pub(crate) struct Attachment {
    pub(crate) name: String,
    /// Registry keys this attachment currently owns
    pub(crate) keys: SmallVec<[BindingKey; 8]>,
    /// Specs whose trigger did not resolve yet
    pub(crate) pending: Vec<PendingSpec>,
    pub(crate) subscription: Option<SubscriptionId>,
}

impl Attachment {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            keys: SmallVec::new(),
            pending: Vec::new(),
            subscription: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.pending.is_empty()
    }
}

/// Outcome of attaching a view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachReport {
    /// Bindings registered immediately
    pub attached: usize,
    /// Bindings waiting for their trigger to resolve
    pub pending: usize,
}

/// Owner of one view's bindings
///
/// Created per mount. The handle does not release on drop; use
/// [`MountGuard`] for that.
pub struct LifecycleHandle {
    engine: EngineHandle,
    id: Cell<Option<AttachmentId>>,
    state: Cell<LifecycleState>,
}

impl LifecycleHandle {
    /// Create an unattached handle for two-phase mounting
    pub fn new(engine: &ScrollEngine) -> Self {
        Self {
            engine: engine.handle(),
            id: Cell::new(None),
            state: Cell::new(LifecycleState::Uninitialized),
        }
    }

    /// Register the view's bindings and subscribe it to scroll updates
    pub fn attach(&self, view: &dyn AnimatedView) -> Result<AttachReport> {
        match self.state.get() {
            LifecycleState::Released => return Err(AnimationError::HandleReleased),
            LifecycleState::Attached => return Err(AnimationError::AlreadyAttached),
            LifecycleState::Uninitialized => {}
        }

        let engine = self.engine.upgrade().ok_or(AnimationError::EngineShutDown)?;
        let (id, report) = engine.attach_view(view)?;
        self.id.set(Some(id));
        self.state.set(LifecycleState::Attached);
        Ok(report)
    }

    /// Remove every binding this handle owns and drop its subscription
    ///
    /// Idempotent. Releasing an unattached handle moves it straight to
    /// `Released`.
    pub fn release(&self) {
        if self.state.get() == LifecycleState::Released {
            return;
        }
        self.state.set(LifecycleState::Released);

        if let Some(id) = self.id.take() {
            if let Some(engine) = self.engine.upgrade() {
                engine.release_attachment(id);
            }
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn is_attached(&self) -> bool {
        self.state.get() == LifecycleState::Attached
    }

    /// Bindings currently registered for this handle
    pub fn binding_count(&self) -> usize {
        self.query(|engine, id| engine.attachment_counts(id).0)
    }

    /// Bindings still waiting for their trigger to resolve
    pub fn pending_count(&self) -> usize {
        self.query(|engine, id| engine.attachment_counts(id).1)
    }

    fn query(&self, f: impl FnOnce(&ScrollEngine, AttachmentId) -> usize) -> usize {
        match (self.id.get(), self.engine.upgrade()) {
            (Some(id), Some(engine)) => f(&engine, id),
            _ => 0,
        }
    }
}

impl std::fmt::Debug for LifecycleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHandle")
            .field("id", &self.id.get())
            .field("state", &self.state.get())
            .finish()
    }
}

/// View-framework hook: attach on mount, release exactly once on drop
///
/// ```ignore
/// let guard = MountGuard::new(&engine);
/// guard.mount(&hero)?;
/// // ... view lives ...
/// drop(guard); // releases
/// ```
#[derive(Debug)]
pub struct MountGuard {
    handle: LifecycleHandle,
}

impl MountGuard {
    pub fn new(engine: &ScrollEngine) -> Self {
        Self {
            handle: LifecycleHandle::new(engine),
        }
    }

    pub fn mount(&self, view: &dyn AnimatedView) -> Result<AttachReport> {
        self.handle.attach(view)
    }

    pub fn handle(&self) -> &LifecycleHandle {
        &self.handle
    }

    /// Release now instead of at drop
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.handle.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingSpec;
    use crate::config::EngineConfig;
    use crate::headless::HeadlessDocument;
    use crate::host::Property;
    use crate::resolver::TriggerSpec;
    use std::rc::Rc;

    struct Fade {
        target: crate::host::ElementRef,
    }

    impl AnimatedView for Fade {
        fn name(&self) -> &str {
            "fade"
        }

        fn bindings(&self) -> Vec<BindingSpec> {
            vec![BindingSpec::scrub(self.target, Property::Opacity, 0.0, 1.0)
                .trigger(TriggerSpec::fixed(0.0, 1000.0))]
        }
    }

    fn setup() -> (Rc<HeadlessDocument>, ScrollEngine, Fade) {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 3000.0));
        let target = doc.insert("fade", 200.0, 100.0);
        let engine = ScrollEngine::new(doc.clone(), EngineConfig::default());
        (doc, engine, Fade { target })
    }

    #[test]
    fn test_state_transitions() {
        let (_doc, engine, view) = setup();
        let handle = LifecycleHandle::new(&engine);
        assert_eq!(handle.state(), LifecycleState::Uninitialized);

        let report = handle.attach(&view).unwrap();
        assert_eq!(report, AttachReport { attached: 1, pending: 0 });
        assert_eq!(handle.state(), LifecycleState::Attached);
        assert_eq!(handle.binding_count(), 1);

        assert_eq!(handle.attach(&view), Err(AnimationError::AlreadyAttached));

        handle.release();
        assert_eq!(handle.state(), LifecycleState::Released);
        assert_eq!(engine.binding_count(), 0);
        assert_eq!(handle.attach(&view), Err(AnimationError::HandleReleased));
    }

    #[test]
    fn test_release_before_attach() {
        let (_doc, engine, view) = setup();
        let handle = LifecycleHandle::new(&engine);
        handle.release();
        handle.release();
        assert_eq!(handle.attach(&view), Err(AnimationError::HandleReleased));
    }

    #[test]
    fn test_attach_after_engine_dropped() {
        let (_doc, engine, view) = setup();
        let handle = LifecycleHandle::new(&engine);
        drop(engine);
        assert_eq!(handle.attach(&view), Err(AnimationError::EngineShutDown));
        handle.release();
    }

    #[test]
    fn test_mount_guard_releases_on_drop() {
        let (_doc, engine, view) = setup();
        {
            let guard = MountGuard::new(&engine);
            guard.mount(&view).unwrap();
            assert_eq!(engine.binding_count(), 1);
            assert_eq!(engine.attachment_count(), 1);
        }
        assert_eq!(engine.binding_count(), 0);
        assert_eq!(engine.attachment_count(), 0);
        assert_eq!(engine.subscriber_count(), 0);
    }
}
