//! Best-effort detection of game installations.
//!
//! Steam libraries are probed first, then each search root is walked breadth-first
//! looking for a game content directory (`cstrike` / `czero` containing `liblist.gam`).

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, IoResultExt, Result},
    game::Game,
    utils, vdf,
};

pub const DEFAULT_DETECT_DEPTH: usize = 4;

/// Folders under `steamapps/common` that hold GoldSrc games.
pub const STEAM_GAME_DIRS: &[&str] = &["Half-Life", "Condition Zero"];

/// File present in every GoldSrc game content directory.
pub const GAME_MARKER_FILE: &str = "liblist.gam";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detected {
    pub game: Game,
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Detector {
    steam_roots: Vec<PathBuf>,
    search_roots: Vec<PathBuf>,
    max_depth: usize,
}

impl Detector {
    /// A detector with no locations to search.
    pub fn new(max_depth: usize) -> Self {
        Self {
            steam_roots: Vec::new(),
            search_roots: Vec::new(),
            max_depth,
        }
    }

    /// A detector searching the platform's usual install locations.
    pub fn with_platform_defaults(max_depth: usize) -> Self {
        let mut detector = Self::new(max_depth);
        detector.steam_roots = default_steam_roots();
        detector.search_roots = default_search_roots();
        detector
    }

    pub fn steam_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.steam_roots.push(root.into());
        self
    }

    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    /// Adds search roots that take priority over the existing ones.
    pub fn prepend_search_roots(&mut self, roots: impl IntoIterator<Item = PathBuf>) {
        let mut roots: Vec<PathBuf> = roots.into_iter().collect();
        roots.append(&mut self.search_roots);
        self.search_roots = roots;
    }

    pub fn prepend_steam_roots(&mut self, roots: impl IntoIterator<Item = PathBuf>) {
        let mut roots: Vec<PathBuf> = roots.into_iter().collect();
        roots.append(&mut self.steam_roots);
        self.steam_roots = roots;
    }

    /// The most likely installation, preferring `game` over the other game.
    pub fn detect(&self, game: Game) -> Option<Detected> {
        for g in [game, game.other()] {
            if let Some(root) = self.steam_libraries().iter().find_map(|l| probe_library(l, g)) {
                return Some(Detected { game: g, root });
            }
        }
        for root in self.search_roots.iter() {
            for g in [game, game.other()] {
                if let Some(found) = find_game_dir(g, root, self.max_depth) {
                    return Some(Detected { game: g, root: found });
                }
            }
        }
        None
    }

    /// Every installation found, Steam libraries first. Duplicates are removed.
    pub fn candidates(&self) -> Vec<Detected> {
        let mut found: Vec<Detected> = Vec::new();
        let mut push = |detected: Detected| {
            if !found.contains(&detected) {
                found.push(detected);
            }
        };
        let libraries = self.steam_libraries();
        for game in Game::ALL {
            for library in libraries.iter() {
                if let Some(root) = probe_library(library, game) {
                    push(Detected { game, root });
                }
            }
        }
        for root in self.search_roots.iter() {
            for game in Game::ALL {
                if let Some(found) = find_game_dir(game, root, self.max_depth) {
                    push(Detected { game, root: found });
                }
            }
        }
        found
    }

    fn steam_libraries(&self) -> Vec<PathBuf> {
        let mut libraries = Vec::new();
        for steam_root in self.steam_roots.iter() {
            match steam_libraries(steam_root) {
                Ok(found) => libraries.extend(found),
                Err(e) => log::debug!("skipping steam root {}: {e}", steam_root.display()),
            }
        }
        libraries.dedup();
        libraries
    }
}

/// Library folders of the Steam installation at `steam_root`, the root itself included.
pub fn steam_libraries(steam_root: &Path) -> Result<Vec<PathBuf>> {
    if !utils::is_directory(steam_root).with_path(steam_root)? {
        return Ok(Vec::new());
    }
    let mut libraries = vec![steam_root.to_owned()];
    for candidate in [
        steam_root.join("steamapps").join("libraryfolders.vdf"),
        steam_root.join("config").join("libraryfolders.vdf"),
    ] {
        if !utils::is_file(&candidate).with_path(&candidate)? {
            continue;
        }
        let content = std::fs::read_to_string(&candidate).with_path(&candidate)?;
        let document = vdf::parse(&content).map_err(|source| Error::Vdf {
            path: candidate.clone(),
            source,
        })?;
        for library in library_folders(&document) {
            if !libraries.contains(&library) {
                libraries.push(library);
            }
        }
        break;
    }
    Ok(libraries)
}

/// Library paths listed in a parsed `libraryfolders.vdf`.
///
/// Handles both the current format (`"0" { "path" "..." }`) and the older one
/// (`"1" "..."`). Non numeric keys such as `contentstatsid` are ignored.
pub fn library_folders(document: &vdf::Object) -> Vec<PathBuf> {
    let folders = match document.get_object("libraryfolders") {
        Some(folders) => folders,
        None => return Vec::new(),
    };
    folders
        .iter()
        .filter(|(key, _)| key.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|(_, value)| match value {
            vdf::Value::String(path) => Some(PathBuf::from(path)),
            vdf::Value::Object(folder) => folder.get_str("path").map(PathBuf::from),
        })
        .collect()
}

/// The installation root inside a Steam library holding `game`, if any.
fn probe_library(library: &Path, game: Game) -> Option<PathBuf> {
    let common = library.join("steamapps").join("common");
    STEAM_GAME_DIRS
        .iter()
        .map(|dir| common.join(dir))
        .find(|root| {
            log::debug!("probing {} for {}", root.display(), game.dir_name());
            is_game_content_dir(&root.join(game.dir_name()))
        })
}

/// Walks `root` breadth-first for `game`'s content directory and returns its parent.
///
/// Content directories at most `max_depth` levels below `root` are found, so `0` finds
/// nothing and `1` only looks at the children of `root`. Names are compared ignoring case.
pub fn find_game_dir(game: Game, root: &Path, max_depth: usize) -> Option<PathBuf> {
    let mut queue = VecDeque::new();
    queue.push_back((root.to_owned(), 0usize));

    while let Some((dir, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("cannot read {}: {e}", dir.display());
                continue;
            }
        };
        let mut subdirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        subdirs.sort();

        for subdir in subdirs {
            if utils::has_name(&subdir, game.dir_name()) && is_game_content_dir(&subdir) {
                log::info!("found {} at {}", game, subdir.display());
                return Some(dir);
            }
            queue.push_back((subdir, depth + 1));
        }
    }
    None
}

fn is_game_content_dir(dir: &Path) -> bool {
    utils::is_file(dir.join(GAME_MARKER_FILE)).unwrap_or(false)
}

/// Steam installations on this platform.
pub fn default_steam_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if cfg!(windows) {
        roots.push(PathBuf::from(r"C:\Program Files (x86)\Steam"));
        roots.push(PathBuf::from(r"C:\Program Files\Steam"));
    } else if let Some(home) = utils::home_directory() {
        if cfg!(target_os = "macos") {
            roots.push(home.join("Library/Application Support/Steam"));
        } else {
            roots.push(home.join(".local/share/Steam"));
            roots.push(home.join(".steam/steam"));
        }
    }
    roots
}

/// Directories walked looking for non-Steam installations.
pub fn default_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if cfg!(windows) {
        for drive in utils::windows_drives() {
            roots.push(drive.join("Program Files (x86)"));
            roots.push(drive.join("Program Files"));
            roots.push(drive);
        }
    } else if let Some(home) = utils::home_directory() {
        roots.push(home.join(".wine/drive_c/Program Files (x86)"));
        roots.push(home.join(".wine/drive_c/Program Files"));
        roots.push(home);
    }
    roots
}

/// Where the map picker starts.
pub fn default_map_directory() -> PathBuf {
    if cfg!(windows) {
        if let Some(drive) = utils::windows_drives().into_iter().next() {
            return drive;
        }
    }
    utils::home_directory().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_game(content_dir: &Path) {
        std::fs::create_dir_all(content_dir.join("maps")).unwrap();
        std::fs::write(content_dir.join(GAME_MARKER_FILE), "game \"Counter-Strike\"").unwrap();
    }

    #[test]
    fn library_folders_both_formats() {
        let document = vdf::parse(
            r#"
            "libraryfolders"
            {
                "contentstatsid" "123"
                "0" { "path" "/steam" "label" "" }
                "1" "/mnt/old"
            }
            "#,
        )
        .unwrap();
        assert_eq!(
            library_folders(&document),
            vec![PathBuf::from("/steam"), PathBuf::from("/mnt/old")]
        );
    }

    #[test]
    fn find_game_dir_respects_depth() {
        let dir = TempDir::new().unwrap();
        create_game(&dir.path().join("a/b/Half-Life/cstrike"));

        assert_eq!(
            find_game_dir(Game::CounterStrike, dir.path(), 4),
            Some(dir.path().join("a/b/Half-Life"))
        );
        assert_eq!(find_game_dir(Game::CounterStrike, dir.path(), 2), None);
        assert_eq!(find_game_dir(Game::ConditionZero, dir.path(), 4), None);
    }

    #[test]
    fn find_game_dir_depth_bounds() {
        let dir = TempDir::new().unwrap();
        create_game(&dir.path().join("cstrike"));

        assert_eq!(find_game_dir(Game::CounterStrike, dir.path(), 0), None);
        assert_eq!(
            find_game_dir(Game::CounterStrike, dir.path(), 1),
            Some(dir.path().to_owned())
        );
    }

    #[test]
    fn find_game_dir_ignores_case() {
        let dir = TempDir::new().unwrap();
        create_game(&dir.path().join("Half-Life/CStrike"));

        assert_eq!(
            find_game_dir(Game::CounterStrike, dir.path(), 2),
            Some(dir.path().join("Half-Life"))
        );
    }

    #[test]
    fn map_folders_are_not_installations() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("downloads/de_x/cstrike/maps")).unwrap();
        assert_eq!(find_game_dir(Game::CounterStrike, dir.path(), 4), None);
    }

    #[test]
    fn detect_through_steam_library() {
        let steam = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        std::fs::create_dir_all(steam.path().join("steamapps")).unwrap();
        std::fs::write(
            steam.path().join("steamapps/libraryfolders.vdf"),
            format!(
                "\"libraryfolders\" {{ \"1\" {{ \"path\" \"{}\" }} }}",
                library.path().display().to_string().replace('\\', "\\\\")
            ),
        )
        .unwrap();
        create_game(&library.path().join("steamapps/common/Half-Life/cstrike"));

        let detector = Detector::new(2).steam_root(steam.path());
        assert_eq!(
            detector.detect(Game::ConditionZero),
            Some(Detected {
                game: Game::CounterStrike,
                root: library.path().join("steamapps/common/Half-Life"),
            })
        );
        assert_eq!(detector.candidates().len(), 1);
    }

    #[test]
    fn detect_prefers_selected_game() {
        let dir = TempDir::new().unwrap();
        create_game(&dir.path().join("Games/Half-Life/cstrike"));
        create_game(&dir.path().join("Games/Half-Life/czero"));

        let detector = Detector::new(3).search_root(dir.path());
        let detected = detector.detect(Game::ConditionZero).unwrap();
        assert_eq!(detected.game, Game::ConditionZero);
        assert_eq!(detected.root, dir.path().join("Games/Half-Life"));
        assert_eq!(detector.candidates().len(), 2);
    }

    #[test]
    fn nothing_detected() {
        let dir = TempDir::new().unwrap();
        let detector = Detector::new(3)
            .search_root(dir.path())
            .steam_root(dir.path().join("no-steam"));
        assert_eq!(detector.detect(Game::CounterStrike), None);
        assert!(detector.candidates().is_empty());
    }
}
