//! A player: private copies of unshared content, a context stack and the
//! queue of the turn in progress.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, error, info, warn};
use txtad_core::listener::EVENT_PLACEHOLDER;
use txtad_core::scan::split;
use txtad_core::{
    Context, ContextStack, EngineResult, EventQueue, Interpreter, Scope, SharedContext,
};

use crate::config::{GameConfig, Settings};
use crate::content::Objects;
use crate::error::GameResult;
use crate::mechanics;
use crate::text::SharedText;

/// Replaced by the user's id in printed text.
pub const UID_PLACEHOLDER: &str = "<uid>";

/// Nested `{...}` expansion stops here.
const MAX_RENDER_DEPTH: usize = 16;

/// Who a printed line is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// The user whose turn it is.
    Me,
    /// Every connected user.
    All,
    /// A specific user.
    User(String),
}

/// A line printed during a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    /// Addressee.
    pub to: Recipient,
    /// Printed text.
    pub body: String,
}

/// Game-level operations a user's turn asks for. They run after the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Recreate the user and replay the initial events.
    ResetUser,
    /// Rebuild the whole game.
    ResetGame,
    /// Drop the user.
    RemoveUser,
}

/// How a `ctx->what` or `ctx.attr` reference reads a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CtxField {
    /// `->`: name, description, attribute listings or linked contexts.
    Variable,
    /// `.`: a single attribute.
    Attribute,
}

/// Split at the first `->` or `.`, whichever comes first.
pub(crate) fn split_ctx_path(input: &str) -> Option<(&str, CtxField, &str)> {
    let arrow = input.find("->");
    let dot = input.find('.');
    match (arrow, dot) {
        (Some(a), Some(d)) if d < a => Some((&input[..d], CtxField::Attribute, &input[d + 1..])),
        (Some(a), _) => Some((&input[..a], CtxField::Variable, &input[a + 2..])),
        (None, Some(d)) => Some((&input[..d], CtxField::Attribute, &input[d + 1..])),
        (None, None) => None,
    }
}

fn append(txt: &mut String, part: &str) {
    if !txt.is_empty() {
        txt.push_str(", ");
    }
    txt.push_str(part);
}

/// Per-user state shared with the mechanics handlers.
#[derive(Debug)]
pub(crate) struct UserState {
    id: String,
    contexts: BTreeMap<String, SharedContext>,
    texts: BTreeMap<String, SharedText>,
    stack: ContextStack,
    queue: RefCell<EventQueue>,
    outbox: RefCell<Vec<Outgoing>>,
    requests: RefCell<Vec<Request>>,
}

impl UserState {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Interpreter lookup: `ctx.attr` is an attribute, `ctx->name` a name.
    pub(crate) fn lookup(&self, name: &str) -> Option<String> {
        if let [ctx_id, key] = split(name, ".")[..] {
            match self.contexts.get(ctx_id) {
                Some(ctx) => match ctx.borrow().get_attribute(key) {
                    Some(value) => return Some(value.to_string()),
                    None => warn!(user = %self.id, context = ctx_id, attribute = key, "attribute not found"),
                },
                None => warn!(user = %self.id, context = ctx_id, "context not found"),
            }
        }
        if let [ctx_id, field] = split(name, "->")[..] {
            match self.contexts.get(ctx_id) {
                Some(ctx) if field == "name" => return Some(ctx.borrow().name().to_string()),
                Some(_) => warn!(user = %self.id, field, "unknown context field"),
                None => warn!(user = %self.id, context = ctx_id, "context not found"),
            }
        }
        None
    }

    /// The user's context with `id`. `*fragment` picks the first stacked
    /// context whose id contains `fragment`.
    pub(crate) fn context(&self, id: &str) -> Option<SharedContext> {
        match id.strip_prefix('*') {
            Some(fragment) => self.stack.find(fragment).into_iter().next(),
            None => self.contexts.get(id).cloned(),
        }
    }

    /// Put the user's context with `id` onto the stack.
    pub(crate) fn link(&self, id: &str) -> bool {
        match self.contexts.get(id) {
            Some(ctx) => self.stack.insert(Rc::clone(ctx)),
            None => {
                warn!(user = %self.id, context = id, "cannot link unknown context");
                false
            }
        }
    }

    /// Take a context off the stack. `*fragment` removes every stacked
    /// context whose id contains `fragment`.
    pub(crate) fn unlink(&self, id: &str) {
        if let Some(fragment) = id.strip_prefix('*') {
            for ctx in self.stack.find(fragment) {
                let ctx_id = ctx.borrow().id().to_string();
                self.stack.erase(&ctx_id);
            }
        } else if self.stack.contains(id) {
            self.stack.erase(id);
        } else {
            warn!(user = %self.id, context = id, "context not on the stack");
        }
    }

    pub(crate) fn send(&self, to: Recipient, body: impl Into<String>) {
        self.outbox.borrow_mut().push(Outgoing {
            to,
            body: body.into(),
        });
    }

    pub(crate) fn request(&self, request: Request) {
        self.requests.borrow_mut().push(request);
    }

    /// Expand every `{...}` in `args`.
    pub(crate) fn render(&self, event: &str, args: &str) -> String {
        self.render_at(event, args, 0)
    }

    fn render_at(&self, event: &str, args: &str, depth: usize) -> String {
        if depth > MAX_RENDER_DEPTH {
            warn!(user = %self.id, "text nested too deeply, expansion stopped");
            return args.to_string();
        }
        txtad_core::scan::substitute_braces(args, |name| {
            Some(self.expand(event, name, depth))
        })
    }

    fn expand(&self, event: &str, name: &str, depth: usize) -> String {
        if name == EVENT_PLACEHOLDER {
            return event.to_string();
        }
        if name == UID_PLACEHOLDER {
            return self.id.clone();
        }
        if let Some((ctx_id, field, what)) = split_ctx_path(name) {
            return match field {
                CtxField::Variable => self.render_at("", &self.print_ctx(ctx_id, what), depth + 1),
                CtxField::Attribute => self.print_ctx_attribute(ctx_id, what),
            };
        }
        if let Some(txt) = self.print_text(name) {
            return self.render_at("", &txt, depth + 1);
        }
        debug!(user = %self.id, placeholder = name, "nothing to substitute");
        String::new()
    }

    /// Print a text, queueing its events.
    pub(crate) fn print_text(&self, id: &str) -> Option<String> {
        let text = self.texts.get(id)?;
        Some(text.borrow_mut().print(&self.queue))
    }

    fn targets(&self, ctx_id: &str) -> Vec<SharedContext> {
        match ctx_id.strip_prefix('*') {
            Some(fragment) => self.stack.find(fragment),
            None => match self.contexts.get(ctx_id) {
                Some(ctx) => vec![Rc::clone(ctx)],
                None => {
                    warn!(user = %self.id, context = ctx_id, "context not found");
                    Vec::new()
                }
            },
        }
    }

    /// `what` of one context, or of every stacked context matching
    /// `*fragment`, joined with `, `.
    pub(crate) fn print_ctx(&self, ctx_id: &str, what: &str) -> String {
        let mut txt = String::new();
        for ctx in self.targets(ctx_id) {
            self.describe(&ctx.borrow(), what, &mut txt);
        }
        txt
    }

    fn print_ctx_attribute(&self, ctx_id: &str, key: &str) -> String {
        let mut txt = String::new();
        for ctx in self.targets(ctx_id) {
            let ctx = ctx.borrow();
            match ctx.get_attribute(key) {
                Some(value) => txt.push_str(value),
                None => warn!(user = %self.id, context = ctx.id(), attribute = key, "attribute not found"),
            }
        }
        txt
    }

    /// Append `what` of `ctx` to `txt`.
    pub(crate) fn describe(&self, ctx: &Context, what: &str, txt: &mut String) {
        match what {
            "name" => append(txt, ctx.name()),
            "desc" | "description" => append(txt, ctx.description()),
            "attributes" | "all_attributes" => {
                let (hidden, visible): (Vec<_>, Vec<_>) = ctx
                    .attributes()
                    .iter()
                    .map(|(key, value)| (key.starts_with('_'), format!("{key}: {value}")))
                    .partition(|(hidden, _)| *hidden);
                for (_, line) in visible {
                    append(txt, &line);
                }
                if what == "all_attributes" {
                    for (_, line) in hidden {
                        append(txt, &line);
                    }
                }
            }
            _ if what.starts_with('*') => {
                let Some((category, field, linked_what)) = split_ctx_path(what) else {
                    return;
                };
                for linked in self.linked(ctx, &category[1..]) {
                    let linked = linked.borrow();
                    match field {
                        CtxField::Variable => self.describe(&linked, linked_what, txt),
                        CtxField::Attribute => {
                            if let Some(value) = linked.get_attribute(linked_what) {
                                append(txt, value);
                            }
                        }
                    }
                }
            }
            _ => debug!(user = %self.id, what, "unknown context field"),
        }
    }

    /// Live contexts linked from `ctx` whose id contains `category`.
    pub(crate) fn linked(&self, ctx: &Context, category: &str) -> Vec<SharedContext> {
        ctx.linked_contexts(category)
            .iter()
            .filter_map(|link| self.contexts.get(link.id()).cloned())
            .collect()
    }
}

/// A connected player.
#[derive(Debug)]
pub struct User {
    state: Rc<UserState>,
}

impl User {
    /// Create a user over `objects`: shared contexts and texts are
    /// referenced, the others copied. The initial contexts and then the
    /// mechanics context are linked onto the stack.
    pub fn new(
        id: impl Into<String>,
        objects: &Objects,
        settings: &Settings,
        config: &GameConfig,
    ) -> GameResult<Self> {
        let id = id.into();
        let contexts: BTreeMap<String, SharedContext> = objects
            .contexts
            .iter()
            .map(|(key, ctx)| {
                let ctx = if ctx.borrow().shared() {
                    Rc::clone(ctx)
                } else {
                    ctx.borrow().clone().into_shared()
                };
                (key.clone(), ctx)
            })
            .collect();
        let texts: BTreeMap<String, SharedText> = objects
            .texts
            .iter()
            .map(|(key, txt)| {
                let txt = if txt.borrow().shared() {
                    Rc::clone(txt)
                } else {
                    txt.borrow().clone().into_shared()
                };
                (key.clone(), txt)
            })
            .collect();

        let state = Rc::new(UserState {
            id,
            contexts,
            texts,
            stack: ContextStack::new(),
            queue: RefCell::new(EventQueue::new()),
            outbox: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        });
        for ctx_id in &settings.initial_contexts {
            if !state.contexts.contains_key(ctx_id) {
                error!(user = %state.id, context = %ctx_id, "invalid initial context");
                continue;
            }
            state.link(ctx_id);
        }
        let mechanics = mechanics::context(&Rc::downgrade(&state), config)?;
        state.stack.insert(mechanics.into_shared());
        info!(user = %state.id, stacked = state.stack.len(), "user created");
        Ok(Self { state })
    }

    /// User id.
    pub fn id(&self) -> &str {
        self.state.id()
    }

    /// The user's context stack.
    pub fn stack(&self) -> &ContextStack {
        self.state.stack()
    }

    /// The user's view of context `id`, honouring the `*fragment` form.
    pub fn context(&self, id: &str) -> Option<SharedContext> {
        self.state.context(id)
    }

    /// Run one event to completion: seed the queue and drain it through the
    /// stack. Returns the number of rounds. On failure the queue is dropped.
    pub fn handle_event(&self, event: &str, max_rounds: usize) -> EngineResult<usize> {
        let state = &*self.state;
        info!(user = %state.id, event, "handling event");
        *state.queue.borrow_mut() = EventQueue::with_events(event);

        let interpreter = Interpreter::with_lookup(|name| state.lookup(name));
        let scope = Scope::new(&interpreter, &state.queue, &state.contexts);
        let result = state.stack.drain(&state.queue, &scope, max_rounds);
        if let Err(err) = &result {
            warn!(user = %state.id, %err, "turn aborted");
            state.queue.borrow_mut().take();
        }
        result
    }

    /// Render `args` the way print commands do.
    pub fn render(&self, event: &str, args: &str) -> String {
        self.state.render(event, args)
    }

    /// Lines printed since the last call.
    pub fn take_outbox(&self) -> Vec<Outgoing> {
        std::mem::take(&mut *self.state.outbox.borrow_mut())
    }

    /// Requests raised since the last call.
    pub fn take_requests(&self) -> Vec<Request> {
        std::mem::take(&mut *self.state.requests.borrow_mut())
    }
}
