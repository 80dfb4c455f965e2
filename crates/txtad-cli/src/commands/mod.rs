pub mod check;
pub mod eval;
pub mod play;

use std::path::Path;

use txtad_game::{Game, GameConfig};

/// Load the game directory, turning errors into CLI messages.
fn load_game(dir: &Path, config: GameConfig) -> Result<Game, String> {
    Game::load(dir, config).map_err(|e| format!("cannot load game from {}: {e}", dir.display()))
}
