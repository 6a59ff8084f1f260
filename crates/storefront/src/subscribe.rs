//! Store change subscriptions.
//!
//! Both stores expose `subscribe(listener)`, returning a [`Subscription`]
//! handle that deregisters the listener when `unsubscribe` is called.
//! Listeners are notified synchronously after a mutation commits, outside
//! the store's state lock, so a listener may re-read the store.

use std::sync::{Arc, Mutex, Weak};

use tracing::warn;

type Listener = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// The set of listeners registered on a store.
#[derive(Default)]
pub(crate) struct ListenerSet {
    registry: Arc<Mutex<Registry>>,
}

impl ListenerSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its unsubscribe handle.
    pub(crate) fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut registry = self.registry.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Invoke every registered listener.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// may subscribe or unsubscribe from within the callback.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<Listener> = {
            let registry = self.registry.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            registry.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            listener();
        }
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle without calling [`Subscription::unsubscribe`] leaves
/// the listener registered for the lifetime of the store.
#[must_use = "dropping the handle does not unsubscribe; call unsubscribe()"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Subscription {
    /// Deregister the listener.
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            // Store already dropped; nothing left to deregister.
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        if registry.listeners.len() == before {
            warn!(id = self.id, "unsubscribe for unknown listener id");
        }
    }
}
