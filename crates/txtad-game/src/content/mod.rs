//! Game content: the serialized world and how it becomes live objects.

mod loader;
mod spec;

pub use loader::{GAME_FILES_DIR, SETTINGS_FILE};
pub use spec::{ContextSpec, ListenerSpec, THIS_PLACEHOLDER, TextSpec, UseCtxSpec};

use std::collections::BTreeMap;

use tracing::{debug, warn};
use txtad_core::{Context, ContextForwarder, Forwarder, Listener, SharedContext};

use crate::config::Settings;
use crate::error::{GameError, GameResult};
use crate::text::{SharedText, Text};

/// Everything a game directory defines, before instantiation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    /// Parsed `settings.json`.
    pub settings: Settings,
    /// Contexts by id.
    pub contexts: BTreeMap<String, ContextSpec>,
    /// Texts by id.
    pub texts: BTreeMap<String, TextSpec>,
}

/// Live contexts and texts built from [`Content`].
#[derive(Debug, Default)]
pub struct Objects {
    /// Contexts by id.
    pub contexts: BTreeMap<String, SharedContext>,
    /// Texts by id.
    pub texts: BTreeMap<String, SharedText>,
}

impl Content {
    /// Content with the given settings and nothing else.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Add or replace a context.
    pub fn with_context(mut self, id: impl Into<String>, spec: ContextSpec) -> Self {
        self.contexts.insert(id.into(), spec);
        self
    }

    /// Add or replace a text.
    pub fn with_text(mut self, id: impl Into<String>, spec: TextSpec) -> Self {
        self.texts.insert(id.into(), spec);
        self
    }

    /// Instantiate every context and text. Listeners are attached once all
    /// contexts exist so that they may link to each other.
    pub fn build(&self) -> GameResult<Objects> {
        let mut objects = Objects::default();
        for (id, spec) in &self.contexts {
            let ctx = build_context(id, spec)?;
            objects.contexts.insert(id.clone(), ctx.into_shared());
        }
        for (id, spec) in &self.contexts {
            let Some(ctx) = objects.contexts.get(id) else {
                continue;
            };
            for listener in &spec.listeners {
                let Some(built) = build_listener(id, listener, &objects.contexts)? else {
                    continue;
                };
                let mut ctx = ctx.borrow_mut();
                if ctx.events().get(built.id()).is_some() {
                    warn!(context = %id, listener = %built.id(), "duplicate listener id, keeping the first");
                    continue;
                }
                ctx.add_listener(built);
            }
        }
        for (id, spec) in &self.texts {
            objects
                .texts
                .insert(id.clone(), Text::from(spec).into_shared());
        }
        debug!(
            contexts = objects.contexts.len(),
            texts = objects.texts.len(),
            "content built"
        );
        Ok(objects)
    }

    /// Strict consistency check used before publishing a game: every
    /// initial context and every listener target must exist.
    pub fn validate(&self) -> GameResult<()> {
        if let Some(id) = self
            .settings
            .initial_contexts
            .iter()
            .find(|id| !self.contexts.contains_key(*id))
        {
            return Err(GameError::UnknownContext(id.clone()));
        }
        for (owner, spec) in &self.contexts {
            for listener in &spec.listeners {
                let Some(target) = &listener.ctx else {
                    continue;
                };
                if target != THIS_PLACEHOLDER && !self.contexts.contains_key(target) {
                    return Err(GameError::InvalidContent(format!(
                        "listener {} of {owner} links to missing context {target}",
                        listener.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn build_context(id: &str, spec: &ContextSpec) -> GameResult<Context> {
    let mut ctx = Context::new(id, spec.priority)
        .with_name(spec.name.as_str())
        .with_description(spec.description.as_str())
        .with_permeable(spec.permeable)
        .with_shared(spec.shared);
    if !spec.re_entrycondition.is_empty() {
        ctx = ctx.with_entry_condition(&spec.re_entrycondition)?;
    }
    for (key, value) in &spec.attributes {
        ctx = ctx.with_attribute(key.as_str(), value.as_str());
    }
    Ok(ctx)
}

fn build_listener(
    owner: &str,
    spec: &ListenerSpec,
    contexts: &BTreeMap<String, SharedContext>,
) -> GameResult<Option<Listener>> {
    let logic = spec.logic.replace(THIS_PLACEHOLDER, owner);
    let arguments = spec.arguments.replace(THIS_PLACEHOLDER, owner);

    let Some(target) = &spec.ctx else {
        let forwarder = Forwarder::new(spec.id.as_str(), &spec.re_event, &arguments)?
            .with_logic(&logic)
            .with_permeable(spec.permeable);
        return Ok(Some(forwarder.into()));
    };

    let target = if target == THIS_PLACEHOLDER {
        owner
    } else {
        target.as_str()
    };
    if !contexts.contains_key(target) {
        warn!(context = %owner, listener = %spec.id, %target, "linked context not found, listener skipped");
        return Ok(None);
    }
    let forwarder = ContextForwarder::new(spec.id.as_str(), &spec.re_event, target, &arguments)?
        .with_logic(&logic)
        .with_permeable(spec.permeable)
        .with_use_ctx(spec.use_ctx_regex.into());
    Ok(Some(forwarder.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(name: &str, listeners: Vec<ListenerSpec>) -> ContextSpec {
        ContextSpec {
            name: name.into(),
            description: String::new(),
            re_entrycondition: String::new(),
            attributes: BTreeMap::new(),
            priority: 0,
            permeable: true,
            shared: true,
            listeners,
        }
    }

    fn listener(id: &str, re_event: &str, arguments: &str, ctx: Option<&str>) -> ListenerSpec {
        ListenerSpec {
            id: id.into(),
            re_event: re_event.into(),
            arguments: arguments.into(),
            permeable: true,
            logic: String::new(),
            ctx: ctx.map(str::to_string),
            use_ctx_regex: UseCtxSpec::None,
        }
    }

    #[test]
    fn this_placeholder_names_the_owner() {
        let content = Content::default()
            .with_context(
                "rooms/hall",
                context(
                    "Hall",
                    vec![
                        listener("L1", "leave", "#ctx remove <_>", None),
                        listener("L2", "look", "#> {<ctx>->name}", Some("<_>")),
                    ],
                ),
            );
        let objects = content.build().unwrap();
        let hall = objects.contexts["rooms/hall"].borrow();
        assert_eq!(
            hall.events().get("L1").and_then(|l| match l {
                Listener::Forwarder(f) => Some(f.template().to_string()),
                _ => None,
            }),
            Some("#ctx remove rooms/hall".to_string())
        );
        assert_eq!(hall.events().get("L2").and_then(Listener::target), Some("rooms/hall"));
    }

    #[test]
    fn missing_target_skips_listener() {
        let content = Content::default().with_context(
            "rooms/hall",
            context("Hall", vec![listener("L1", "go (.*)", "", Some("rooms/nowhere"))]),
        );
        let objects = content.build().unwrap();
        assert!(objects.contexts["rooms/hall"].borrow().events().is_empty());
    }

    #[test]
    fn duplicate_listener_keeps_first() {
        let content = Content::default().with_context(
            "rooms/hall",
            context(
                "Hall",
                vec![
                    listener("L1", "a", "#> first", None),
                    listener("L1", "b", "#> second", None),
                ],
            ),
        );
        let objects = content.build().unwrap();
        let hall = objects.contexts["rooms/hall"].borrow();
        assert_eq!(hall.events().len(), 1);
        assert_eq!(hall.events().get("L1").map(|l| l.pattern().as_str()), Some("a"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let content = Content::default()
            .with_context("rooms/hall", context("Hall", vec![listener("L1", "go (", "", None)]));
        assert!(content.build().is_err());
    }

    #[test]
    fn validate_reports_dangling_references() {
        let content = Content::new(Settings {
            initial_events: String::new(),
            initial_contexts: vec!["rooms/hall".into()],
        });
        assert!(matches!(content.validate(), Err(GameError::UnknownContext(id)) if id == "rooms/hall"));

        let content = content.with_context(
            "rooms/hall",
            context("Hall", vec![listener("L1", "go (.*)", "", Some("rooms/nowhere"))]),
        );
        assert!(matches!(content.validate(), Err(GameError::InvalidContent(_))));

        let content = content.with_context(
            "rooms/hall",
            context("Hall", vec![listener("L1", "look", "", Some("<_>"))]),
        );
        assert!(content.validate().is_ok());
    }

    #[test]
    fn entry_condition_and_texts() {
        let mut hall = context("Hall", Vec::new());
        hall.re_entrycondition = "(the )?hall".into();
        let content = Content::default().with_context("rooms/hall", hall).with_text(
            "intro",
            TextSpec {
                txt: "Welcome".into(),
                one_time_events: String::new(),
                permanent_events: String::new(),
                shared: false,
            },
        );
        let objects = content.build().unwrap();
        assert!(objects.contexts["rooms/hall"].borrow().check_entry("the hall"));
        assert!(!objects.texts["intro"].borrow().shared());
    }
}
