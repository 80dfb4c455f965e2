//! Collaborators threaded through every `test`/`execute` call.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::context::SharedContext;
use crate::expression::Interpreter;
use crate::queue::EventQueue;

/// Receives events emitted by forwarders.
pub trait EventSink {
    /// Append `events` (possibly `;`-joined) for a later drain round.
    fn emit(&self, events: &str);
}

impl EventSink for RefCell<EventQueue> {
    fn emit(&self, events: &str) {
        self.borrow_mut().push(events);
    }
}

/// Looks up contexts by id for context forwarders.
pub trait ContextResolver {
    /// The context registered under `id`, if any.
    fn resolve(&self, id: &str) -> Option<SharedContext>;
}

impl ContextResolver for BTreeMap<String, SharedContext> {
    fn resolve(&self, id: &str) -> Option<SharedContext> {
        self.get(id).cloned()
    }
}

impl ContextResolver for RefCell<BTreeMap<String, SharedContext>> {
    fn resolve(&self, id: &str) -> Option<SharedContext> {
        self.borrow().get(id).cloned()
    }
}

/// Everything a listener needs during one dispatch: the interpreter for
/// logic guards, the sink for forwarded events and the context lookup for
/// context forwarders.
#[derive(Clone, Copy)]
pub struct Scope<'s> {
    interpreter: &'s Interpreter<'s>,
    sink: &'s dyn EventSink,
    contexts: &'s dyn ContextResolver,
}

impl<'s> Scope<'s> {
    /// Bundle the collaborators of one dispatch.
    pub fn new(
        interpreter: &'s Interpreter<'s>,
        sink: &'s dyn EventSink,
        contexts: &'s dyn ContextResolver,
    ) -> Self {
        Self {
            interpreter,
            sink,
            contexts,
        }
    }

    /// Interpreter for logic guards and attribute math.
    pub fn interpreter(&self) -> &'s Interpreter<'s> {
        self.interpreter
    }

    /// Forward `events` to the sink.
    pub fn emit(&self, events: &str) {
        self.sink.emit(events);
    }

    /// Resolve a context by id.
    pub fn context(&self, id: &str) -> Option<SharedContext> {
        self.contexts.resolve(id)
    }
}
