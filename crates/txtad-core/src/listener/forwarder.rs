use tracing::{debug, warn};

use super::{EVENT_PLACEHOLDER, EventPattern, Trigger, resolve_arguments};
use crate::context::ContextRef;
use crate::error::EngineResult;
use crate::fuzzy::{FuzzyMatch, classify};
use crate::scope::Scope;

/// Placeholder in a forwarder pattern for "any input that is not a command".
pub const USER_INPUT_PLACEHOLDER: &str = "<user-inp>";

/// Placeholder in context-forwarder templates and logic for the target id.
pub const CONTEXT_PLACEHOLDER: &str = "<ctx>";

/// Any input not starting with `#`, captured as a whole.
const USER_INPUT_PATTERN: &str = "((?:[^#].*)?)";

/// Listener that emits its resolved argument template as new events.
#[derive(Debug, Clone)]
pub struct Forwarder {
    id: String,
    pattern: EventPattern,
    template: String,
    logic: String,
    permeable: bool,
}

impl Forwarder {
    /// Permeable forwarder without a logic guard.
    pub fn new(id: impl Into<String>, pattern: &str, template: &str) -> EngineResult<Self> {
        let pattern = pattern.replace(USER_INPUT_PLACEHOLDER, USER_INPUT_PATTERN);
        Ok(Self {
            id: id.into(),
            pattern: EventPattern::new(&pattern)?,
            template: template.replace("; #", ";#"),
            logic: String::new(),
            permeable: true,
        })
    }

    /// Guard the forwarder with an expression that must evaluate to `"1"`.
    pub fn with_logic(mut self, logic: &str) -> Self {
        self.logic = logic.to_string();
        self
    }

    /// Set whether dispatch continues after a match.
    pub fn with_permeable(mut self, permeable: bool) -> Self {
        self.permeable = permeable;
        self
    }

    /// Forwarder id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Event pattern.
    pub fn pattern(&self) -> &EventPattern {
        &self.pattern
    }

    /// Argument template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Logic guard, empty if none.
    pub fn logic(&self) -> &str {
        &self.logic
    }

    /// Whether dispatch continues after a match.
    pub fn permeable(&self) -> bool {
        self.permeable
    }

    pub(super) fn test(&self, event: &str, scope: &Scope<'_>) -> Option<Trigger> {
        let capture = self.pattern.capture(event)?;
        if !self.logic.is_empty() {
            let expression = self.logic.replace(EVENT_PLACEHOLDER, &capture);
            match scope.interpreter().evaluate(&expression) {
                Ok(value) if value == "1" => {}
                Ok(_) => return None,
                Err(err) => {
                    warn!(forwarder = %self.id, logic = %expression, %err, "logic failed");
                    return None;
                }
            }
        }
        Some(Trigger::new(capture))
    }

    pub(super) fn execute(&self, trigger: &Trigger, scope: &Scope<'_>) {
        let events = resolve_arguments(&self.template, trigger.capture());
        debug!(forwarder = %self.id, %events, "forwarding");
        scope.emit(&events);
    }
}

/// How a context forwarder checks the capture against its target context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UseCtx {
    /// No extra check.
    #[default]
    None,
    /// The target's entry condition must match.
    Regex,
    /// The target's name must match exactly (ignoring case).
    Name,
    /// The target's name must start with the capture.
    NameStartsWith,
    /// The capture must be a fuzzy match of the target's name.
    NameFuzzy,
    /// Either of the two above.
    NameFuzzyOrStartsWith,
}

/// Forwarder bound to another context, referenced by id.
#[derive(Debug, Clone)]
pub struct ContextForwarder {
    forwarder: Forwarder,
    target: ContextRef,
    use_ctx: UseCtx,
}

impl ContextForwarder {
    /// Forwarder linked to `target`. `<ctx>` in the template becomes the
    /// target id.
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        target: impl Into<String>,
        template: &str,
    ) -> EngineResult<Self> {
        let target = ContextRef::new(target);
        let template = template.replace(CONTEXT_PLACEHOLDER, target.id());
        Ok(Self {
            forwarder: Forwarder::new(id, pattern, &template)?,
            target,
            use_ctx: UseCtx::None,
        })
    }

    /// Guard with a logic expression; `<ctx>` becomes the target id.
    pub fn with_logic(mut self, logic: &str) -> Self {
        let logic = logic.replace(CONTEXT_PLACEHOLDER, self.target.id());
        self.forwarder = self.forwarder.with_logic(&logic);
        self
    }

    /// Set whether dispatch continues after a match.
    pub fn with_permeable(mut self, permeable: bool) -> Self {
        self.forwarder = self.forwarder.with_permeable(permeable);
        self
    }

    /// Select the check against the target context.
    pub fn with_use_ctx(mut self, use_ctx: UseCtx) -> Self {
        self.use_ctx = use_ctx;
        self
    }

    /// Forwarder id.
    pub fn id(&self) -> &str {
        self.forwarder.id()
    }

    /// Event pattern.
    pub fn pattern(&self) -> &EventPattern {
        self.forwarder.pattern()
    }

    /// Argument template with the target id filled in.
    pub fn template(&self) -> &str {
        self.forwarder.template()
    }

    /// Whether dispatch continues after a match.
    pub fn permeable(&self) -> bool {
        self.forwarder.permeable()
    }

    /// The linked context.
    pub fn target(&self) -> &ContextRef {
        &self.target
    }

    /// Check applied to the target context.
    pub fn use_ctx(&self) -> UseCtx {
        self.use_ctx
    }

    pub(super) fn test(&self, event: &str, scope: &Scope<'_>) -> Option<Trigger> {
        let trigger = self.forwarder.test(event, scope)?;
        let Some(target) = self.target.resolve(scope) else {
            warn!(forwarder = %self.id(), target = %self.target.id(), "linked context not available");
            return None;
        };
        if self.pattern().group_count() != 1 {
            return Some(trigger);
        }

        let target = target.borrow();
        let arg = trigger.capture();
        let by_name = || classify(arg, target.name());
        let accepted = match self.use_ctx {
            UseCtx::None => true,
            UseCtx::Regex => target.check_entry(arg),
            UseCtx::Name => by_name() == FuzzyMatch::Direct,
            UseCtx::NameStartsWith => by_name() == FuzzyMatch::StartsWith,
            UseCtx::NameFuzzy => by_name() == FuzzyMatch::Fuzzy,
            UseCtx::NameFuzzyOrStartsWith => {
                matches!(by_name(), FuzzyMatch::Fuzzy | FuzzyMatch::StartsWith)
            }
        };
        accepted.then_some(trigger)
    }

    pub(super) fn execute(&self, trigger: &Trigger, scope: &Scope<'_>) {
        self.forwarder.execute(trigger, scope);
    }
}
