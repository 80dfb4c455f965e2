use serde::{Deserialize, Serialize};

/// Runtime configuration of a game instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Maximum number of drain rounds per user event before the turn is
    /// aborted.
    pub max_drain_rounds: usize,
    /// Stack priority of the per-user mechanics context.
    pub mechanics_priority: i32,
    /// Id of the per-user mechanics context.
    pub mechanics_context_id: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_drain_rounds: 64,
            mechanics_priority: 0,
            mechanics_context_id: "ctx_mechanic".to_string(),
        }
    }
}

impl GameConfig {
    /// Set the drain round limit.
    pub fn with_max_drain_rounds(mut self, rounds: usize) -> Self {
        self.max_drain_rounds = rounds;
        self
    }

    /// Set the priority of the mechanics context.
    pub fn with_mechanics_priority(mut self, priority: i32) -> Self {
        self.mechanics_priority = priority;
        self
    }

    /// Set the id of the mechanics context.
    pub fn with_mechanics_context_id(mut self, id: impl Into<String>) -> Self {
        self.mechanics_context_id = id.into();
        self
    }
}

/// Contents of a game's `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Events every new user starts with, `;`-separated.
    pub initial_events: String,
    /// Contexts linked onto every new user's stack.
    pub initial_contexts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = GameConfig::default();
        assert_eq!(config.max_drain_rounds, 64);
        assert_eq!(config.mechanics_priority, 0);
        assert_eq!(config.mechanics_context_id, "ctx_mechanic");
    }

    #[test]
    fn config_builder_chain() {
        let config = GameConfig::default()
            .with_max_drain_rounds(8)
            .with_mechanics_priority(-5)
            .with_mechanics_context_id("mech");
        assert_eq!(config.max_drain_rounds, 8);
        assert_eq!(config.mechanics_priority, -5);
        assert_eq!(config.mechanics_context_id, "mech");
    }

    #[test]
    fn settings_from_json() {
        let settings: Settings = serde_json::from_str(
            r##"{"initial_events": "#> welcome", "initial_contexts": ["rooms/hall", "player"]}"##,
        )
        .unwrap();
        assert_eq!(settings.initial_events, "#> welcome");
        assert_eq!(settings.initial_contexts, vec!["rooms/hall", "player"]);
    }

    #[test]
    fn settings_require_both_fields() {
        assert!(serde_json::from_str::<Settings>(r#"{"initial_events": ""}"#).is_err());
    }
}
