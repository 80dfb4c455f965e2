//! Rule engine of the txtad text-adventure runtime.
//!
//! Events enter a [`ContextStack`], which hands them to every [`Context`]
//! from the highest priority down. Each context's [`EventManager`] tests its
//! [`Listener`]s in id order: handlers call into the game, forwarders emit
//! follow-up events into an [`EventQueue`] that the turn loop drains until it
//! stays empty. Logic guards and attribute math go through the string-typed
//! expression [`Interpreter`], whose `~` operators use the [`fuzzy`] matcher.

/// Contexts and non-owning context references.
pub mod context;
/// Priority-ordered dispatch over contexts.
pub mod context_stack;
/// Error types for the engine.
pub mod error;
/// Per-context listener registry.
pub mod event_manager;
/// Expression interpreter.
pub mod expression;
/// Fuzzy word classification.
pub mod fuzzy;
/// Handler, forwarder and context forwarder rules.
pub mod listener;
/// Event accumulator.
pub mod queue;
/// String scanning helpers.
pub mod scan;
/// Dispatch collaborators.
pub mod scope;

pub use context::{Context, ContextRef, SharedContext};
pub use context_stack::ContextStack;
pub use error::{EngineError, EngineResult, ExpressionError, ExpressionResult};
pub use event_manager::EventManager;
pub use expression::Interpreter;
pub use fuzzy::{FuzzyMatch, classify};
pub use listener::{ContextForwarder, Forwarder, Handler, HandlerFn, Listener, Trigger, UseCtx};
pub use queue::EventQueue;
pub use scope::{ContextResolver, EventSink, Scope};
