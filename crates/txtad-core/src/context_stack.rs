//! Priority-ordered contexts that drive a turn.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::context::{Context, SharedContext};
use crate::error::{EngineError, EngineResult};
use crate::queue::EventQueue;
use crate::scope::{ContextResolver, Scope};

/// Contexts by id plus a view sorted by descending priority, ties in
/// insertion order.
///
/// All methods take `&self` so handlers can insert and erase while an event
/// is being dispatched through the stack.
#[derive(Debug, Default)]
pub struct ContextStack {
    contexts: RefCell<BTreeMap<String, SharedContext>>,
    sorted: RefCell<Vec<SharedContext>>,
}

impl ContextStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `context` after every context of equal or higher priority.
    /// Returns `false` if its id is already present.
    pub fn insert(&self, context: SharedContext) -> bool {
        let (id, priority) = {
            let ctx = context.borrow();
            (ctx.id().to_string(), ctx.priority())
        };
        let mut contexts = self.contexts.borrow_mut();
        if contexts.contains_key(&id) {
            warn!(context = %id, "context already on the stack");
            return false;
        }
        contexts.insert(id.clone(), Rc::clone(&context));

        let mut sorted = self.sorted.borrow_mut();
        let at = sorted
            .iter()
            .position(|ctx| ctx.borrow().priority() < priority)
            .unwrap_or(sorted.len());
        sorted.insert(at, context);
        info!(context = %id, priority, "context added");
        true
    }

    /// Remove the context with `id`. Returns `false` if it is not present.
    pub fn erase(&self, id: &str) -> bool {
        let Some(removed) = self.contexts.borrow_mut().remove(id) else {
            warn!(context = %id, "context not on the stack");
            return false;
        };
        self.sorted
            .borrow_mut()
            .retain(|ctx| !Rc::ptr_eq(ctx, &removed));
        info!(context = %id, "context removed");
        true
    }

    /// The context with `id`.
    pub fn get(&self, id: &str) -> Option<SharedContext> {
        self.contexts.borrow().get(id).cloned()
    }

    /// Whether a context with `id` is on the stack.
    pub fn contains(&self, id: &str) -> bool {
        self.contexts.borrow().contains_key(id)
    }

    /// Contexts whose id contains `fragment`, in stack order.
    pub fn find(&self, fragment: &str) -> Vec<SharedContext> {
        self.sorted
            .borrow()
            .iter()
            .filter(|ctx| ctx.borrow().id().contains(fragment))
            .cloned()
            .collect()
    }

    /// Ids in stack order.
    pub fn order(&self) -> Vec<String> {
        self.sorted
            .borrow()
            .iter()
            .map(|ctx| ctx.borrow().id().to_string())
            .collect()
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        self.sorted.borrow().len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.sorted.borrow().is_empty()
    }

    /// Remove every context.
    pub fn clear(&self) {
        self.contexts.borrow_mut().clear();
        self.sorted.borrow_mut().clear();
    }

    fn at(&self, index: usize) -> Option<SharedContext> {
        self.sorted.borrow().get(index).cloned()
    }

    fn position(&self, context: &SharedContext) -> Option<usize> {
        self.sorted
            .borrow()
            .iter()
            .position(|ctx| Rc::ptr_eq(ctx, context))
    }

    /// Dispatch `event` from the highest to the lowest priority. A context
    /// that accepts the event and is not permeable hides it from the rest.
    /// Returns whether any context accepted it.
    pub fn take_event(&self, event: &str, scope: &Scope<'_>) -> bool {
        let mut accepted = false;
        let mut visited: HashSet<*const RefCell<Context>> = HashSet::new();
        let mut index = 0;
        // Walk by index: listeners may change the stack underneath us.
        while let Some(ctx) = self.at(index) {
            if !visited.insert(Rc::as_ptr(&ctx)) {
                index += 1;
                continue;
            }
            let (events, permeable) = {
                let ctx = ctx.borrow();
                (ctx.events().clone(), ctx.permeable())
            };
            if events.take_event(event, scope) {
                accepted = true;
                if !permeable {
                    debug!(context = %ctx.borrow().id(), event, "stopped by non-permeable context");
                    break;
                }
            }
            // Continue below the current context wherever it moved to. If it
            // was erased, its successor already sits at `index`.
            index = self.position(&ctx).map_or(index, |at| at + 1);
        }
        if !accepted {
            debug!(event, "no context accepted event");
        }
        accepted
    }

    /// Take everything queued and dispatch it event by event.
    pub fn take_events(&self, queue: &RefCell<EventQueue>, scope: &Scope<'_>) {
        let events = queue.borrow_mut().take();
        for event in events {
            self.take_event(&event, scope);
        }
    }

    /// Run [`ContextStack::take_events`] until the queue stays empty, at most
    /// `max_rounds` times. Returns the number of rounds.
    pub fn drain(
        &self,
        queue: &RefCell<EventQueue>,
        scope: &Scope<'_>,
        max_rounds: usize,
    ) -> EngineResult<usize> {
        let mut rounds = 0;
        while !queue.borrow().is_empty() {
            if rounds == max_rounds {
                let pending = queue.borrow().as_str().to_string();
                return Err(EngineError::DidNotConverge { rounds, pending });
            }
            self.take_events(queue, scope);
            rounds += 1;
        }
        Ok(rounds)
    }
}

impl ContextResolver for ContextStack {
    fn resolve(&self, id: &str) -> Option<SharedContext> {
        self.get(id)
    }
}
