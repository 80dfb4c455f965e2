//! Reading a game directory from disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::Content;
use crate::config::Settings;
use crate::error::{GameError, GameResult};

/// Settings file at the root of a game directory.
pub const SETTINGS_FILE: &str = "settings.json";
/// Directory holding contexts and texts.
pub const GAME_FILES_DIR: &str = "game_files";

const CONTEXT_EXTENSION: &str = "ctx";
const TEXT_EXTENSION: &str = "text";
const TEMPLATE_EXTENSION: &str = "template";

impl Content {
    /// Load `settings.json` and every `.ctx` and `.text` file below
    /// `game_files/`. Ids are paths relative to `game_files/` without the
    /// extension.
    pub fn load(dir: &Path) -> GameResult<Self> {
        let settings: Settings = read_json(&dir.join(SETTINGS_FILE))?;
        let mut content = Content::new(settings);

        let root = dir.join(GAME_FILES_DIR);
        let mut files = Vec::new();
        collect_files(&root, &mut files)?;

        for path in files {
            let Some(id) = object_id(&root, &path) else {
                warn!(path = %path.display(), "cannot derive an id, skipped");
                continue;
            };
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(CONTEXT_EXTENSION) => {
                    content.contexts.insert(id, read_json(&path)?);
                }
                Some(TEXT_EXTENSION) => {
                    content.texts.insert(id, read_json(&path)?);
                }
                Some(TEMPLATE_EXTENSION) => {}
                _ => warn!(path = %path.display(), "unknown file extension, skipped"),
            }
        }
        debug!(
            dir = %dir.display(),
            contexts = content.contexts.len(),
            texts = content.texts.len(),
            "game files loaded"
        );
        Ok(content)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> GameResult<T> {
    let source = std::fs::read_to_string(path).map_err(|source| GameError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| GameError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Every file below `dir`, depth first, sorted per directory.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> GameResult<()> {
    let io_error = |source| GameError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(io_error)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();

    // Sort for deterministic ordering
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn object_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_relative_paths_without_extension() {
        let root = Path::new("/games/demo/game_files");
        assert_eq!(
            object_id(root, &root.join("rooms").join("hall.ctx")).as_deref(),
            Some("rooms/hall")
        );
        assert_eq!(object_id(root, &root.join("intro.text")).as_deref(), Some("intro"));
        assert_eq!(object_id(root, Path::new("/elsewhere/x.ctx")), None);
    }
}
