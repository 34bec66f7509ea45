//! Listener bookkeeping with scoped teardown

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseOver,
    KeyDown,
    Input,
}

/// Dispatch phase a listener is attached for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Click,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent<N> {
    pub kind: PointerKind,
    pub target: N,
}

impl<N> PointerEvent<N> {
    pub fn click(target: N) -> Self {
        Self {
            kind: PointerKind::Click,
            target,
        }
    }

    pub fn hover(target: N) -> Self {
        Self {
            kind: PointerKind::Move,
            target,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self::new(key, true)
    }
}

/// What a handler did with an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl EventOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn prevent_default() -> Self {
        Self {
            default_prevented: true,
            propagation_stopped: false,
        }
    }

    pub fn consumed() -> Self {
        Self {
            default_prevented: true,
            propagation_stopped: true,
        }
    }
}

#[derive(Debug)]
struct ListenerEntry {
    id: u64,
    kind: EventKind,
    phase: Phase,
    owner: &'static str,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

/// Shared handle to the listeners attached to one document
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener; it stays attached for as long as the guard lives
    pub fn subscribe(&self, kind: EventKind, phase: Phase, owner: &'static str) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(ListenerEntry {
            id,
            kind,
            phase,
            owner,
        });
        debug!("{} attached {:?} listener ({:?})", owner, kind, phase);

        Subscription {
            registry: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_attached(&self, kind: EventKind, phase: Phase) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|e| e.kind == kind && e.phase == phase)
    }

    /// Number of listeners held by `owner`
    pub fn count_for(&self, owner: &str) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .count()
    }
}

/// Detaches its listener when dropped
#[derive(Debug)]
#[must_use = "dropping a subscription detaches the listener"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().entries.iter().any(|e| e.id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            if let Some(pos) = registry.entries.iter().position(|e| e.id == self.id) {
                let entry = registry.entries.remove(pos);
                debug!(
                    "{} detached {:?} listener ({:?})",
                    entry.owner, entry.kind, entry.phase
                );
            }
        }
    }
}
