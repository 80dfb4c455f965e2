//! A running game: content, live objects and connected users.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};
use txtad_core::SharedContext;

use crate::config::{GameConfig, Settings};
use crate::content::{Content, Objects};
use crate::error::GameResult;
use crate::text::SharedText;
use crate::user::{Outgoing, Recipient, Request, User};

/// Event sent by a freshly connected client. Existing users receive it
/// as `#new_connection <id>`.
pub const NEW_CONNECTION: &str = "#new_connection";

/// Output for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Addressed user.
    pub user: String,
    /// What to show.
    pub body: MessageBody,
}

/// Payload of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// A printed line.
    Text(String),
    /// The user's screen should be cleared.
    Clear,
}

impl Message {
    fn text(user: &str, body: String) -> Self {
        Self {
            user: user.to_string(),
            body: MessageBody::Text(body),
        }
    }

    fn clear(user: &str) -> Self {
        Self {
            user: user.to_string(),
            body: MessageBody::Clear,
        }
    }
}

/// A game instance. Every turn takes `&mut self`, so turns never overlap.
#[derive(Debug)]
pub struct Game {
    name: String,
    config: GameConfig,
    content: Content,
    objects: Objects,
    users: BTreeMap<String, User>,
}

impl Game {
    /// Instantiate `content`.
    pub fn new(name: impl Into<String>, content: Content, config: GameConfig) -> GameResult<Self> {
        let objects = content.build()?;
        let name = name.into();
        for id in &content.settings.initial_contexts {
            if !objects.contexts.contains_key(id) {
                warn!(game = %name, context = %id, "initial context does not exist");
            }
        }
        info!(
            game = %name,
            contexts = objects.contexts.len(),
            texts = objects.texts.len(),
            "game created"
        );
        Ok(Self {
            name,
            config,
            content,
            objects,
            users: BTreeMap::new(),
        })
    }

    /// Load the game directory `dir`; the game is named after it.
    pub fn load(dir: &Path, config: GameConfig) -> GameResult<Self> {
        let content = Content::load(dir)?;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Self::new(name, content, config)
    }

    /// Game name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Game settings.
    pub fn settings(&self) -> &Settings {
        &self.content.settings
    }

    /// The content the game was built from.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Game-level contexts by id.
    pub fn contexts(&self) -> &BTreeMap<String, SharedContext> {
        &self.objects.contexts
    }

    /// Game-level texts by id.
    pub fn texts(&self) -> &BTreeMap<String, SharedText> {
        &self.objects.texts
    }

    /// Connected user `id`.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    /// Ids of connected users.
    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Disconnect user `id`.
    pub fn remove_user(&mut self, id: &str) -> bool {
        let removed = self.users.remove(id).is_some();
        if removed {
            info!(game = %self.name, user = id, "user removed");
        }
        removed
    }

    /// Handle one event from `user_id`. An unknown user is created and runs
    /// the initial events instead. Returns everything printed, in order.
    pub fn handle_event(&mut self, user_id: &str, event: &str) -> GameResult<Vec<Message>> {
        debug!(game = %self.name, user = user_id, event, "incoming event");
        let mut messages = Vec::new();

        if event == NEW_CONNECTION {
            let notice = format!("{NEW_CONNECTION} {user_id}");
            let others: Vec<String> = self.users.keys().cloned().collect();
            for other in others {
                self.turn(&other, &notice, &mut messages)?;
            }
        }

        if self.users.contains_key(user_id) {
            self.turn(user_id, event, &mut messages)?;
        } else {
            self.start(user_id, &mut messages)?;
        }
        Ok(messages)
    }

    /// Create `user_id` and run the initial events.
    fn start(&mut self, user_id: &str, messages: &mut Vec<Message>) -> GameResult<()> {
        let user = User::new(user_id, &self.objects, &self.content.settings, &self.config)?;
        self.users.insert(user_id.to_string(), user);
        info!(game = %self.name, user = user_id, "user joined");
        let initial = self.content.settings.initial_events.clone();
        self.turn(user_id, &initial, messages)
    }

    fn turn(&mut self, user_id: &str, event: &str, messages: &mut Vec<Message>) -> GameResult<()> {
        let Some(user) = self.users.get(user_id) else {
            warn!(game = %self.name, user = user_id, "user not connected");
            return Ok(());
        };
        let result = user.handle_event(event, self.config.max_drain_rounds);
        let outbox = user.take_outbox();
        let requests = user.take_requests();
        self.deliver(user_id, outbox, messages);
        result?;
        for request in requests {
            self.apply(user_id, request, messages)?;
        }
        Ok(())
    }

    fn deliver(&self, sender: &str, outbox: Vec<Outgoing>, messages: &mut Vec<Message>) {
        for Outgoing { to, body } in outbox {
            match to {
                Recipient::Me => messages.push(Message::text(sender, body)),
                Recipient::All => {
                    messages.extend(self.users.keys().map(|id| Message::text(id, body.clone())));
                }
                Recipient::User(id) if self.users.contains_key(&id) => {
                    messages.push(Message::text(&id, body));
                }
                Recipient::User(id) => {
                    warn!(game = %self.name, user = %id, "recipient not connected");
                }
            }
        }
    }

    fn apply(&mut self, user_id: &str, request: Request, messages: &mut Vec<Message>) -> GameResult<()> {
        info!(game = %self.name, user = user_id, ?request, "applying request");
        match request {
            Request::ResetUser => {
                self.users.remove(user_id);
                messages.push(Message::clear(user_id));
                self.start(user_id, messages)?;
            }
            Request::ResetGame => {
                self.objects = self.content.build()?;
                let ids: Vec<String> = std::mem::take(&mut self.users).into_keys().collect();
                for id in &ids {
                    let user = User::new(id, &self.objects, &self.content.settings, &self.config)?;
                    self.users.insert(id.clone(), user);
                }
                let initial = self.content.settings.initial_events.clone();
                for id in &ids {
                    messages.push(Message::clear(id));
                    self.turn(id, &initial, messages)?;
                }
            }
            Request::RemoveUser => {
                self.remove_user(user_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContextSpec, ListenerSpec, TextSpec, UseCtxSpec};

    fn forwarder(id: &str, re_event: &str, arguments: &str) -> ListenerSpec {
        ListenerSpec {
            id: id.into(),
            re_event: re_event.into(),
            arguments: arguments.into(),
            permeable: true,
            logic: String::new(),
            ctx: None,
            use_ctx_regex: UseCtxSpec::None,
        }
    }

    fn game() -> Game {
        let hall = ContextSpec {
            name: "Hall".into(),
            description: "A hall.".into(),
            re_entrycondition: String::new(),
            attributes: [("visits".to_string(), "0".to_string())].into(),
            priority: 10,
            permeable: true,
            shared: false,
            listeners: vec![
                forwarder("L1", "look", "#sa rooms/hall.visits++;#> {intro} ({rooms/hall.visits})"),
                forwarder("L2", "#new_connection (.*)", "#> #event joined"),
                forwarder("L3", "shout (.*)", "#-> *#event!"),
            ],
        };
        let content = Content::new(Settings {
            initial_events: "#> {intro}".into(),
            initial_contexts: vec!["rooms/hall".into()],
        })
        .with_context("rooms/hall", hall)
        .with_text(
            "intro",
            TextSpec {
                txt: "Welcome.".into(),
                one_time_events: String::new(),
                permanent_events: String::new(),
                shared: true,
            },
        );
        Game::new("demo", content, GameConfig::default()).unwrap()
    }

    fn text(user: &str, body: &str) -> Message {
        Message::text(user, body.to_string())
    }

    #[test]
    fn new_user_runs_initial_events() {
        let mut game = game();
        let messages = game.handle_event("ann", NEW_CONNECTION).unwrap();
        assert_eq!(messages, vec![text("ann", "Welcome.")]);
        assert_eq!(game.user_ids().collect::<Vec<_>>(), vec!["ann"]);
    }

    #[test]
    fn existing_users_hear_about_new_connections() {
        let mut game = game();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        let messages = game.handle_event("bob", NEW_CONNECTION).unwrap();
        assert_eq!(messages, vec![text("ann", "bob joined"), text("bob", "Welcome.")]);
    }

    #[test]
    fn unshared_state_is_per_user() {
        let mut game = game();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        game.handle_event("bob", NEW_CONNECTION).unwrap();
        game.handle_event("ann", "look").unwrap();
        let messages = game.handle_event("ann", "look").unwrap();
        assert_eq!(messages, vec![text("ann", "Welcome. (2)")]);
        let messages = game.handle_event("bob", "look").unwrap();
        assert_eq!(messages, vec![text("bob", "Welcome. (1)")]);
    }

    #[test]
    fn broadcast_reaches_everyone() {
        let mut game = game();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        game.handle_event("bob", NEW_CONNECTION).unwrap();
        let messages = game.handle_event("bob", "shout hi").unwrap();
        assert_eq!(messages, vec![text("ann", "hi!"), text("bob", "hi!")]);
    }

    #[test]
    fn reset_user_starts_over() {
        let mut game = game();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        game.handle_event("ann", "look").unwrap();
        let messages = game.handle_event("ann", "#reset user").unwrap();
        assert_eq!(messages, vec![Message::clear("ann"), text("ann", "Welcome.")]);
        let messages = game.handle_event("ann", "look").unwrap();
        assert_eq!(messages, vec![text("ann", "Welcome. (1)")]);
    }

    #[test]
    fn reset_game_resets_everyone() {
        let mut game = game();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        game.handle_event("bob", NEW_CONNECTION).unwrap();
        let messages = game.handle_event("bob", "#reset game").unwrap();
        assert_eq!(
            messages,
            vec![
                Message::clear("ann"),
                text("ann", "Welcome."),
                Message::clear("bob"),
                text("bob", "Welcome."),
            ]
        );
        assert_eq!(game.user_ids().count(), 2);
    }

    #[test]
    fn remove_user_disconnects() {
        let mut game = game();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        assert!(game.handle_event("ann", "#remove_user").unwrap().is_empty());
        assert!(game.user("ann").is_none());
    }

    #[test]
    fn endless_forwarding_is_reported() {
        let ping = ContextSpec {
            name: "Ping".into(),
            description: String::new(),
            re_entrycondition: String::new(),
            attributes: BTreeMap::new(),
            priority: 1,
            permeable: true,
            shared: true,
            listeners: vec![forwarder("P1", "ping", "ping")],
        };
        let content = Content::new(Settings {
            initial_events: String::new(),
            initial_contexts: vec!["ping".into()],
        })
        .with_context("ping", ping);
        let mut game = Game::new("loop", content, GameConfig::default().with_max_drain_rounds(4)).unwrap();
        game.handle_event("ann", NEW_CONNECTION).unwrap();
        let err = game.handle_event("ann", "ping").unwrap_err();
        assert!(err.to_string().contains("4"));
        assert!(game.handle_event("ann", "#> still here").is_ok());
    }
}
