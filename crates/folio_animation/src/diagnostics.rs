//! Engine diagnostics
//!
//! Recoverable conditions (a trigger that would not resolve, a target that
//! vanished, a key registered twice) are logged and kept in a bounded queue
//! the host can drain. None of them stops the engine.

use std::collections::VecDeque;
use std::fmt;

use crate::binding::BindingKey;
use crate::error::UnresolvedReason;

/// A recoverable condition observed by the engine
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A binding's trigger could not be resolved; it is pending or inactive
    UnresolvedRange {
        view: String,
        key: BindingKey,
        reason: UnresolvedReason,
    },
    /// The host reported the target detached; the binding stops writing
    DetachedTarget { key: BindingKey },
    /// A registration replaced an existing binding for the same key
    DuplicateBinding { key: BindingKey },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedRange { view, key, reason } => {
                write!(f, "{view}: {key} unresolved ({reason})")
            }
            Diagnostic::DetachedTarget { key } => write!(f, "{key}: target detached"),
            Diagnostic::DuplicateBinding { key } => write!(f, "{key}: replaced by newer binding"),
        }
    }
}

/// Bounded FIFO of diagnostics; the oldest entry is dropped when full
#[derive(Debug)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
    dropped: u64,
}

impl DiagnosticLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnresolvedRange { .. } | Diagnostic::DetachedTarget { .. } => {
                tracing::warn!("{}", diagnostic);
            }
            Diagnostic::DuplicateBinding { .. } => {
                tracing::debug!("{}", diagnostic);
            }
        }

        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(diagnostic);
    }

    /// Take every buffered diagnostic, oldest first
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
