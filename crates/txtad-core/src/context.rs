//! Rule-bearing entities: rooms, items, mechanics.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::EngineResult;
use crate::event_manager::EventManager;
use crate::listener::{EventPattern, Listener};
use crate::scope::Scope;

/// A context shared between the stack, the content map and users.
pub type SharedContext = Rc<RefCell<Context>>;

/// Non-owning reference to a context, resolved by id on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRef {
    id: String,
}

impl ContextRef {
    /// Reference the context with `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Referenced id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look the context up in the dispatch scope.
    pub fn resolve(&self, scope: &Scope<'_>) -> Option<SharedContext> {
        scope.context(&self.id)
    }
}

/// A context with attributes and its own listeners.
///
/// Cloning copies attributes and the listener set, which is how
/// per-user copies of unshared contexts are made.
#[derive(Debug, Clone)]
pub struct Context {
    id: String,
    name: String,
    description: String,
    entry_condition: Option<EventPattern>,
    priority: i32,
    permeable: bool,
    shared: bool,
    attributes: BTreeMap<String, String>,
    events: EventManager,
}

impl Context {
    /// Permeable, shared context without attributes or listeners.
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            entry_condition: None,
            priority,
            permeable: true,
            shared: true,
            attributes: BTreeMap::new(),
            events: EventManager::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the entry condition checked by [`Context::check_entry`].
    pub fn with_entry_condition(mut self, pattern: &str) -> EngineResult<Self> {
        self.entry_condition = Some(EventPattern::new(pattern)?);
        Ok(self)
    }

    /// Set whether an accepted event may reach lower-priority contexts.
    pub fn with_permeable(mut self, permeable: bool) -> Self {
        self.permeable = permeable;
        self
    }

    /// Set whether users share this context or get their own copy.
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Add an attribute at construction.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Wrap into a [`SharedContext`].
    pub fn into_shared(self) -> SharedContext {
        Rc::new(RefCell::new(self))
    }

    /// Stable id, usually a path such as `rooms/hall`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Change the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Entry condition as written, empty if none.
    pub fn entry_condition(&self) -> &str {
        self.entry_condition.as_ref().map_or("", EventPattern::as_str)
    }

    /// Stack priority, higher first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether an accepted event continues to lower-priority contexts.
    pub fn permeable(&self) -> bool {
        self.permeable
    }

    /// Whether users share this context.
    pub fn shared(&self) -> bool {
        self.shared
    }

    /// Whether `input` satisfies the entry condition. Without a condition
    /// only the empty input does.
    pub fn check_entry(&self, input: &str) -> bool {
        match &self.entry_condition {
            Some(pattern) => pattern.is_match(input),
            None => input.is_empty(),
        }
    }

    /// All attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Value of attribute `key`.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether attribute `key` exists.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Create attribute `key`. Fails if it already exists.
    pub fn add_attribute(&mut self, key: impl Into<String>, initial: impl Into<String>) -> bool {
        let key = key.into();
        if self.attributes.contains_key(&key) {
            debug!(context = %self.id, attribute = %key, "attribute already exists");
            return false;
        }
        self.attributes.insert(key, initial.into());
        true
    }

    /// Create attribute `key`. Like [`Context::add_attribute`], it never
    /// overwrites; use [`Context::update_attribute`] to change a value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.add_attribute(key, value)
    }

    /// Overwrite attribute `key`. Fails if it does not exist.
    pub fn update_attribute(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.attributes.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Remove attribute `key`.
    pub fn remove_attribute(&mut self, key: &str) -> bool {
        self.attributes.remove(key).is_some()
    }

    /// The context's listeners.
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Register a listener, replacing one with the same id.
    pub fn add_listener(&mut self, listener: impl Into<Listener>) {
        self.events.add_listener(listener);
    }

    /// Remove the listener with `id`.
    pub fn remove_listener(&mut self, id: &str) -> bool {
        self.events.remove_listener(id)
    }

    /// Contexts linked by this context's forwarders whose id contains
    /// `category`, in listener order.
    pub fn linked_contexts(&self, category: &str) -> Vec<ContextRef> {
        self.events
            .listeners()
            .filter_map(Listener::target)
            .filter(|id| id.contains(category))
            .map(ContextRef::new)
            .collect()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}\nDescription: {}\nEntry Condition (regex): {}",
            self.name,
            self.description,
            self.entry_condition()
        )
    }
}
