//! Serialized shapes of `.ctx` and `.text` files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use txtad_core::UseCtx;

/// Marks the owning context inside listener definitions.
pub const THIS_PLACEHOLDER: &str = "<_>";

fn yes() -> bool {
    true
}

/// A context as written in a `.ctx` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSpec {
    /// Display name.
    pub name: String,
    /// Description shown by `->desc`.
    pub description: String,
    /// Entry condition regex, empty if none.
    #[serde(default)]
    pub re_entrycondition: String,
    /// Initial attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Stack priority.
    #[serde(default)]
    pub priority: i32,
    /// Whether an accepted event continues downwards.
    #[serde(default = "yes")]
    pub permeable: bool,
    /// Whether users share one instance.
    #[serde(default = "yes")]
    pub shared: bool,
    /// Listeners owned by the context.
    #[serde(default)]
    pub listeners: Vec<ListenerSpec>,
}

/// A listener inside a context file. With `ctx` set it becomes a context
/// forwarder, otherwise a plain forwarder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerSpec {
    /// Listener id, also its dispatch rank.
    pub id: String,
    /// Event pattern.
    pub re_event: String,
    /// Argument template.
    #[serde(default)]
    pub arguments: String,
    /// Whether an accepted event continues downwards.
    #[serde(default = "yes")]
    pub permeable: bool,
    /// Logic guard.
    #[serde(default)]
    pub logic: String,
    /// Target context id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx: Option<String>,
    /// Check against the target context.
    #[serde(default)]
    pub use_ctx_regex: UseCtxSpec,
}

/// Serialized form of [`UseCtx`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCtxSpec {
    /// `none`
    #[default]
    None,
    /// `regex`
    Regex,
    /// `name`
    Name,
    /// `name_starts_with`
    NameStartsWith,
    /// `name_fuzzy`
    NameFuzzy,
    /// `name_fuzzy_or_starts_with`
    NameFuzzyOrStartsWith,
}

impl From<UseCtxSpec> for UseCtx {
    fn from(spec: UseCtxSpec) -> Self {
        match spec {
            UseCtxSpec::None => UseCtx::None,
            UseCtxSpec::Regex => UseCtx::Regex,
            UseCtxSpec::Name => UseCtx::Name,
            UseCtxSpec::NameStartsWith => UseCtx::NameStartsWith,
            UseCtxSpec::NameFuzzy => UseCtx::NameFuzzy,
            UseCtxSpec::NameFuzzyOrStartsWith => UseCtx::NameFuzzyOrStartsWith,
        }
    }
}

/// A text as written in a `.text` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpec {
    /// Printed text.
    pub txt: String,
    /// Events raised on the first print only.
    #[serde(default)]
    pub one_time_events: String,
    /// Events raised on every print.
    #[serde(default)]
    pub permanent_events: String,
    /// Whether users share one instance.
    #[serde(default = "yes")]
    pub shared: bool,
}
