use std::fs;
use std::path::Path;

use tempfile::TempDir;
use txtad_game::{Game, GameConfig, GameError, Message, MessageBody, NEW_CONNECTION};

fn write(root: &Path, relative: &str, json: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, json).unwrap();
}

/// Two rooms connected both ways, a general context reacting to room
/// changes and a start text.
fn test_game() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "settings.json",
        r##"{"initial_events": "#> {texts/start}", "initial_contexts": ["general", "rooms/room_1", "player"]}"##,
    );
    write(
        root,
        "game_files/general.ctx",
        r##"{
            "name": "General",
            "description": "Some general handlers",
            "priority": 1,
            "listeners": [
                {"id": "L1", "re_event": "#ctx replace \\*rooms -> (.*)", "arguments": "#> You've entered {*rooms->description}."},
                {"id": "L2", "re_event": "hp", "arguments": "#> hp: {player.hp}"},
                {"id": "L3", "re_event": "heal", "arguments": "#sa player.hp += 5;#> healed", "logic": "{player.hp} < 20"}
            ]
        }"##,
    );
    write(
        root,
        "game_files/rooms/room_1.ctx",
        r##"{
            "name": "Room 1",
            "description": "Test room no. 1",
            "priority": 5,
            "attributes": {"gravity": "10", "darkness": "99"},
            "listeners": [
                {"id": "L2", "re_event": "go right", "ctx": "rooms/room_2", "arguments": "#ctx replace *rooms -> <ctx>"}
            ]
        }"##,
    );
    write(
        root,
        "game_files/rooms/room_2.ctx",
        r##"{
            "name": "Room 2",
            "description": "Test room no. 2",
            "priority": 5,
            "attributes": {"gravity": "99", "darkness": "10"},
            "listeners": [
                {"id": "L1", "re_event": "go (.*)", "ctx": "rooms/room_1", "arguments": "#ctx replace *rooms -> <ctx>", "use_ctx_regex": "name"}
            ]
        }"##,
    );
    write(
        root,
        "game_files/player.ctx",
        r#"{"name": "You", "description": "", "shared": false, "attributes": {"hp": "10"}}"#,
    );
    write(
        root,
        "game_files/texts/start.text",
        r##"{"txt": "Hello World", "one_time_events": "#sa player.hp += 2"}"##,
    );
    write(root, "game_files/rooms/room.template", "not json");
    dir
}

fn lines(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match &m.body {
            MessageBody::Text(text) => Some(format!("{}: {text}", m.user)),
            MessageBody::Clear => None,
        })
        .collect()
}

fn play(game: &mut Game, user: &str, event: &str) -> Vec<String> {
    lines(&game.handle_event(user, event).unwrap())
}

#[test]
fn loads_contexts_texts_and_settings() {
    let dir = test_game();
    let game = Game::load(dir.path(), GameConfig::default()).unwrap();

    assert_eq!(game.settings().initial_events, "#> {texts/start}");
    assert_eq!(game.settings().initial_contexts.len(), 3);
    let ids: Vec<&String> = game.contexts().keys().collect();
    assert_eq!(ids, ["general", "player", "rooms/room_1", "rooms/room_2"]);
    let room = game.contexts()["rooms/room_1"].borrow();
    assert_eq!(room.name(), "Room 1");
    assert_eq!(room.get_attribute("gravity"), Some("10"));
    assert_eq!(room.events().len(), 1);
    assert!(game.texts().contains_key("texts/start"));
    assert!(game.content().validate().is_ok());
}

#[test]
fn walking_between_rooms() {
    let dir = test_game();
    let mut game = Game::load(dir.path(), GameConfig::default()).unwrap();

    assert_eq!(play(&mut game, "0x1234", NEW_CONNECTION), ["0x1234: Hello World"]);
    assert!(play(&mut game, "0x1234", "go left").is_empty());
    assert_eq!(
        play(&mut game, "0x1234", "go right"),
        ["0x1234: You've entered Test room no. 2."]
    );
    assert!(play(&mut game, "0x1234", "go left").is_empty());
    assert_eq!(
        play(&mut game, "0x1234", "go Room 1"),
        ["0x1234: You've entered Test room no. 1."]
    );
    let user = game.user("0x1234").unwrap();
    assert_eq!(user.stack().order(), ["rooms/room_1", "general", "player", "ctx_mechanic"]);
}

#[test]
fn one_time_text_events_and_logic_guards() {
    let dir = test_game();
    let mut game = Game::load(dir.path(), GameConfig::default()).unwrap();

    play(&mut game, "ann", NEW_CONNECTION);
    assert_eq!(play(&mut game, "ann", "hp"), ["ann: hp: 12"]);
    assert_eq!(play(&mut game, "ann", "heal"), ["ann: healed"]);
    assert_eq!(play(&mut game, "ann", "heal"), ["ann: healed"]);
    assert!(play(&mut game, "ann", "heal").is_empty());
    assert_eq!(play(&mut game, "ann", "hp"), ["ann: hp: 22"]);

    play(&mut game, "bob", NEW_CONNECTION);
    assert_eq!(play(&mut game, "bob", "hp"), ["bob: hp: 10"]);
}

#[test]
fn reset_game_rebuilds_state() {
    let dir = test_game();
    let mut game = Game::load(dir.path(), GameConfig::default()).unwrap();

    play(&mut game, "ann", NEW_CONNECTION);
    play(&mut game, "ann", "go right");
    let messages = game.handle_event("ann", "#reset game").unwrap();
    assert_eq!(messages[0].body, MessageBody::Clear);
    assert_eq!(lines(&messages), ["ann: Hello World"]);
    let user = game.user("ann").unwrap();
    assert!(user.stack().contains("rooms/room_1"));
    assert!(!user.stack().contains("rooms/room_2"));
}

#[test]
fn missing_settings_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Game::load(dir.path(), GameConfig::default()).unwrap_err();
    assert!(matches!(err, GameError::Io { .. }));
}

#[test]
fn broken_context_is_a_json_error() {
    let dir = test_game();
    write(dir.path(), "game_files/broken.ctx", r#"{"name": "Broken"}"#);
    let err = Game::load(dir.path(), GameConfig::default()).unwrap_err();
    assert!(matches!(err, GameError::Json { ref path, .. } if path.ends_with("broken.ctx")));
}
