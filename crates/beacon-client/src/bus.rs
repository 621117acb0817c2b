use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use beacon_types::events::ClientEvent;

type Listener = Arc<dyn Fn(&ClientEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`]. Listeners stay
/// registered until this handle is passed back to `unsubscribe` — there
/// is no anonymous removal, so leaked listeners are visible at the call
/// site that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Plain callback registry for client events.
///
/// Emission is synchronous and in registration order. Listeners run
/// outside the registry lock, so a callback may subscribe or
/// unsubscribe without deadlocking.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));
        SubscriptionId(id)
    }

    /// Returns false if the handle was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().listeners.remove(&id.0).is_some()
    }

    pub fn emit(&self, event: &ClientEvent) {
        let listeners: Vec<Listener> = self.lock().listeners.values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
