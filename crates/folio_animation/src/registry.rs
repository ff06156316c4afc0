//! Binding registry
//!
//! Ordered index of live bindings keyed by `(element, property)`. Iteration
//! order is registration order and decides the order in which property
//! writes happen each frame. A registration for an existing key replaces the
//! old entry and moves to the end of the order.
//!
//! The registry never decides when a binding goes away. Every entry records
//! the attachment that created it, and only that attachment may remove it.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::binding::{BindingKey, BindingSpec};
use crate::interpolate::BindingState;
use crate::lifecycle::AttachmentId;
use crate::resolver::TriggerRange;

/// A registered binding
#[derive(Clone, Debug)]
pub struct Binding {
    pub key: BindingKey,
    /// Unique per registration; distinguishes a replacement from the original
    pub serial: u64,
    pub owner: AttachmentId,
    pub spec: BindingSpec,
    /// `None` while the trigger is unresolved; the binding is then inactive
    pub range: Option<TriggerRange>,
    pub state: BindingState,
}

/// Result of [`BindingRegistry::insert`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsertOutcome {
    pub serial: u64,
    /// Owner of the entry this registration replaced, if any
    pub replaced: Option<AttachmentId>,
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    entries: IndexMap<BindingKey, Binding, FxBuildHasher>,
    next_serial: u64,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding, replacing any entry with the same key
    pub fn insert(
        &mut self,
        owner: AttachmentId,
        spec: BindingSpec,
        range: Option<TriggerRange>,
    ) -> InsertOutcome {
        let key = spec.key();
        let replaced = self.entries.shift_remove(&key).map(|old| old.owner);

        self.next_serial += 1;
        let serial = self.next_serial;
        let state = BindingState::new(&spec.mode);
        self.entries.insert(
            key,
            Binding {
                key,
                serial,
                owner,
                spec,
                range,
                state,
            },
        );

        InsertOutcome { serial, replaced }
    }

    /// Serial of the most recent registration (0 before the first)
    pub fn last_serial(&self) -> u64 {
        self.next_serial
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Binding> {
        self.entries.get(key)
    }

    /// Entry for `key`, but only if it is still the registration `serial`
    pub fn get_live_mut(&mut self, key: &BindingKey, serial: u64) -> Option<&mut Binding> {
        self.entries.get_mut(key).filter(|b| b.serial == serial)
    }

    /// True if `key` is still held by registration `serial`
    pub fn is_live(&self, key: &BindingKey, serial: u64) -> bool {
        self.entries.get(key).is_some_and(|b| b.serial == serial)
    }

    /// Remove an entry only if `owner` still owns it
    pub fn remove_owned(&mut self, key: &BindingKey, owner: AttachmentId) -> Option<Binding> {
        match self.entries.get(key) {
            Some(b) if b.owner == owner => self.entries.shift_remove(key),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bindings in update order
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Binding> {
        self.entries.values_mut()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ElementRef, Property};
    use slotmap::SlotMap;

    fn owners() -> (AttachmentId, AttachmentId) {
        let mut sm: SlotMap<AttachmentId, ()> = SlotMap::with_key();
        (sm.insert(()), sm.insert(()))
    }

    fn spec(el: u64, property: Property) -> BindingSpec {
        BindingSpec::scrub(ElementRef::from_raw(el), property, 0.0, 1.0)
    }

    #[test]
    fn test_duplicate_key_replaces() {
        let (a, b) = owners();
        let mut reg = BindingRegistry::new();
        let first = reg.insert(a, spec(1, Property::Opacity), None);
        reg.insert(a, spec(2, Property::Opacity), None);
        assert_eq!(reg.len(), 2);

        let second = reg.insert(b, spec(1, Property::Opacity), None);
        assert_eq!(reg.len(), 2);
        assert_eq!(second.replaced, Some(a));
        assert!(second.serial > first.serial);

        let key = BindingKey::new(ElementRef::from_raw(1), Property::Opacity);
        assert!(!reg.is_live(&key, first.serial));
        assert!(reg.is_live(&key, second.serial));
        assert_eq!(reg.get(&key).map(|b| b.owner), Some(b));
    }

    #[test]
    fn test_replacement_moves_to_end() {
        let (a, _) = owners();
        let mut reg = BindingRegistry::new();
        reg.insert(a, spec(1, Property::Opacity), None);
        reg.insert(a, spec(2, Property::Opacity), None);
        reg.insert(a, spec(3, Property::Opacity), None);
        reg.insert(a, spec(1, Property::Opacity), None);

        let order: Vec<u64> = reg.iter().map(|b| b.key.element.to_raw()).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_same_element_different_property_coexist() {
        let (a, _) = owners();
        let mut reg = BindingRegistry::new();
        reg.insert(a, spec(1, Property::Opacity), None);
        reg.insert(a, spec(1, Property::TranslateY), None);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_remove_owned_respects_owner() {
        let (a, b) = owners();
        let mut reg = BindingRegistry::new();
        reg.insert(a, spec(1, Property::Scale), None);
        reg.insert(b, spec(1, Property::Scale), None);

        let key = BindingKey::new(ElementRef::from_raw(1), Property::Scale);
        assert!(reg.remove_owned(&key, a).is_none());
        assert!(reg.get(&key).is_some());
        assert!(reg.remove_owned(&key, b).is_some());
        assert!(reg.is_empty());
        assert!(reg.remove_owned(&key, b).is_none());
    }
}
