//! Per-context listener registry.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::listener::Listener;
use crate::scope::Scope;

/// Listeners keyed by id. Dispatch visits them in ascending id order, which
/// content relies on to express precedence through id prefixes.
#[derive(Debug, Clone, Default)]
pub struct EventManager {
    listeners: BTreeMap<String, Rc<Listener>>,
}

impl EventManager {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`, replacing one with the same id. Returns the
    /// replaced listener.
    pub fn add_listener(&mut self, listener: impl Into<Listener>) -> Option<Rc<Listener>> {
        let listener = listener.into();
        self.listeners
            .insert(listener.id().to_string(), Rc::new(listener))
    }

    /// Remove the listener with `id`.
    pub fn remove_listener(&mut self, id: &str) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// The listener with `id`.
    pub fn get(&self, id: &str) -> Option<&Listener> {
        self.listeners.get(id).map(Rc::as_ref)
    }

    /// Listeners in dispatch order.
    pub fn listeners(&self) -> impl Iterator<Item = &Listener> {
        self.listeners.values().map(Rc::as_ref)
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Test and execute every listener in id order. A matching listener that
    /// is not permeable ends the dispatch. Returns whether any listener
    /// matched.
    pub fn take_event(&self, event: &str, scope: &Scope<'_>) -> bool {
        let mut accepted = false;
        for listener in self.listeners.values() {
            let Some(trigger) = listener.test(event, scope) else {
                continue;
            };
            debug!(listener = listener.id(), event, capture = trigger.capture(), "matched");
            listener.execute(event, &trigger, scope);
            accepted = true;
            if !listener.permeable() {
                debug!(listener = listener.id(), event, "stopped by non-permeable listener");
                break;
            }
        }
        accepted
    }
}
