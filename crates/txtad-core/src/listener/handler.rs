use std::fmt;
use std::rc::Rc;

use tracing::error;

use super::{EventPattern, Trigger};
use crate::error::EngineResult;
use crate::scope::Scope;

/// Game callback receiving the dispatch scope, the event and the captured
/// argument.
pub type HandlerFn = Rc<dyn Fn(&Scope<'_>, &str, &str)>;

/// Listener bridging into a game-level command.
#[derive(Clone)]
pub struct Handler {
    id: String,
    pattern: EventPattern,
    callback: Option<HandlerFn>,
    permeable: bool,
}

impl Handler {
    /// Permeable handler calling `callback` for every matching event.
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        callback: impl Fn(&Scope<'_>, &str, &str) + 'static,
    ) -> EngineResult<Self> {
        let mut handler = Self::unbound(id, pattern)?;
        handler.callback = Some(Rc::new(callback));
        Ok(handler)
    }

    /// Handler without a callback yet; see [`Handler::set_callback`].
    pub fn unbound(id: impl Into<String>, pattern: &str) -> EngineResult<Self> {
        Ok(Self {
            id: id.into(),
            pattern: EventPattern::new(pattern)?,
            callback: None,
            permeable: true,
        })
    }

    /// Set whether dispatch continues after a match.
    pub fn with_permeable(mut self, permeable: bool) -> Self {
        self.permeable = permeable;
        self
    }

    /// Bind or replace the callback.
    pub fn set_callback(&mut self, callback: HandlerFn) {
        self.callback = Some(callback);
    }

    /// Handler id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Event pattern.
    pub fn pattern(&self) -> &EventPattern {
        &self.pattern
    }

    /// Whether dispatch continues after a match.
    pub fn permeable(&self) -> bool {
        self.permeable
    }

    pub(super) fn test(&self, event: &str) -> Option<Trigger> {
        let capture = self.pattern.capture(event)?;
        if self.callback.is_none() {
            error!(handler = %self.id, event, "handler has no callback, skipped");
            return None;
        }
        Some(Trigger::new(capture))
    }

    pub(super) fn execute(&self, event: &str, trigger: &Trigger, scope: &Scope<'_>) {
        match &self.callback {
            Some(callback) => callback(scope, event, trigger.capture()),
            None => error!(handler = %self.id, event, "handler has no callback"),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .field("bound", &self.callback.is_some())
            .field("permeable", &self.permeable)
            .finish()
    }
}
