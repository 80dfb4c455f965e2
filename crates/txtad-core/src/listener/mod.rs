//! Pattern-matched rules owned by a context's event manager.
//!
//! Every listener answers `test` with an optional [`Trigger`] carrying the
//! captured argument, which the following `execute` consumes. The variant
//! set is closed: callbacks into the game ([`Handler`]), event forwarding
//! ([`Forwarder`]) and forwarding gated on another context
//! ([`ContextForwarder`]).

mod forwarder;
mod handler;
mod pattern;

pub use forwarder::{ContextForwarder, Forwarder, UseCtx};
pub use handler::{Handler, HandlerFn};
pub use pattern::EventPattern;

use crate::scope::Scope;

/// Placeholder in argument templates and logic replaced by the capture.
pub const EVENT_PLACEHOLDER: &str = "#event";

/// The argument captured by a successful `test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    capture: String,
}

impl Trigger {
    pub(crate) fn new(capture: String) -> Self {
        Self { capture }
    }

    /// First capture group of the event pattern, empty without a group.
    pub fn capture(&self) -> &str {
        &self.capture
    }
}

/// A rule registered in an event manager.
#[derive(Debug, Clone)]
pub enum Listener {
    /// Invokes a game callback.
    Handler(Handler),
    /// Emits follow-up events.
    Forwarder(Forwarder),
    /// Emits follow-up events if a linked context accepts the capture.
    ContextForwarder(ContextForwarder),
}

impl Listener {
    /// Listener id, also its dispatch order key.
    pub fn id(&self) -> &str {
        match self {
            Self::Handler(h) => h.id(),
            Self::Forwarder(f) => f.id(),
            Self::ContextForwarder(f) => f.id(),
        }
    }

    /// Whether dispatch continues after this listener matched.
    pub fn permeable(&self) -> bool {
        match self {
            Self::Handler(h) => h.permeable(),
            Self::Forwarder(f) => f.permeable(),
            Self::ContextForwarder(f) => f.permeable(),
        }
    }

    /// The event pattern.
    pub fn pattern(&self) -> &EventPattern {
        match self {
            Self::Handler(h) => h.pattern(),
            Self::Forwarder(f) => f.pattern(),
            Self::ContextForwarder(f) => f.pattern(),
        }
    }

    /// Id of the linked context, for context forwarders.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::ContextForwarder(f) => Some(f.target().id()),
            _ => None,
        }
    }

    /// Check whether `event` triggers this listener.
    pub fn test(&self, event: &str, scope: &Scope<'_>) -> Option<Trigger> {
        match self {
            Self::Handler(h) => h.test(event),
            Self::Forwarder(f) => f.test(event, scope),
            Self::ContextForwarder(f) => f.test(event, scope),
        }
    }

    /// Run the listener for a trigger returned by [`Listener::test`].
    pub fn execute(&self, event: &str, trigger: &Trigger, scope: &Scope<'_>) {
        match self {
            Self::Handler(h) => h.execute(event, trigger, scope),
            Self::Forwarder(f) => f.execute(trigger, scope),
            Self::ContextForwarder(f) => f.execute(trigger, scope),
        }
    }
}

impl From<Handler> for Listener {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<Forwarder> for Listener {
    fn from(forwarder: Forwarder) -> Self {
        Self::Forwarder(forwarder)
    }
}

impl From<ContextForwarder> for Listener {
    fn from(forwarder: ContextForwarder) -> Self {
        Self::ContextForwarder(forwarder)
    }
}

/// Resolve an argument template against a capture: an empty template yields
/// the capture, `#event` is replaced by it, anything else is used verbatim.
pub fn resolve_arguments(template: &str, capture: &str) -> String {
    if template.is_empty() {
        capture.to_string()
    } else if template.contains(EVENT_PLACEHOLDER) {
        template.replace(EVENT_PLACEHOLDER, capture)
    } else {
        template.to_string()
    }
}
