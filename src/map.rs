use std::{
    fs::File,
    path::{Path, PathBuf},
};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::{
    error::{Error, IoResultExt, Result},
    game::Game,
    utils,
};

pub const DEFAULT_MAP_PATTERNS: &[&str] = &["*.bsp"];
pub const MAPS_DIR_NAME: &str = "maps";

/// Decides which file names are maps.
#[derive(Debug, Clone)]
pub struct MapMatcher {
    set: GlobSet,
}

impl MapMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern.as_ref())
                .case_insensitive(true)
                .literal_separator(true)
                .build()?;
            builder.add(glob);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    pub fn is_map_file(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.set.is_match(name),
            None => false,
        }
    }
}

impl Default for MapMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_PATTERNS).unwrap_or_else(|_| Self {
            set: GlobSet::empty(),
        })
    }
}

/// File extensions of the plain `*.ext` patterns, for file pickers that filter by extension.
/// Other patterns have no extension equivalent and are left out.
pub fn pattern_extensions<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for pattern in patterns {
        let extension = match pattern.as_ref().strip_prefix("*.") {
            Some(extension) => extension.to_ascii_lowercase(),
            None => continue,
        };
        let plain = !extension.is_empty()
            && extension
                .chars()
                .all(|c| !matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '/' | '.'));
        if plain && !extensions.contains(&extension) {
            extensions.push(extension);
        }
    }
    extensions
}

/// How the files of a map source map onto a game's content directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayout {
    /// A single map file, installed into `maps/`.
    File,
    /// `<dir>/<game>/maps/...`, copied from `<dir>/<game>`.
    Game,
    /// `<dir>/maps/...`, copied from `<dir>`.
    Content,
    /// Map files directly under `<dir>`, copied into `maps/`.
    Loose,
}

/// A file of a map source and where it goes, relative to the game's content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFile {
    pub source: PathBuf,
    pub relative: PathBuf,
}

/// A validated map, ready to be planned into a game installation.
#[derive(Debug, Clone)]
pub struct MapSource {
    path: PathBuf,
    layout: MapLayout,
    files: Vec<MapFile>,
}

impl MapSource {
    /// Validates `path` as a map file or map folder for `game`.
    pub fn locate(path: &Path, game: Game, matcher: &MapMatcher) -> Result<Self> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MapNotFound(path.to_owned()))
            }
            Err(e) => return Err(Error::MapUnreadable(path.to_owned(), e)),
        };
        let path = path.canonicalize().with_path(path)?;

        let source = if metadata.is_file() {
            Self::locate_file(path, matcher)?
        } else {
            Self::locate_dir(path, game, matcher)?
        };
        log::debug!(
            "map source {} ({:?}, {} files)",
            source.path.display(),
            source.layout,
            source.files.len()
        );
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> MapLayout {
        self.layout
    }

    pub fn files(&self) -> &[MapFile] {
        &self.files
    }

    /// File names of the map files that will end up in `maps/`.
    pub fn map_names(&self, matcher: &MapMatcher) -> Vec<String> {
        let maps_dir = Path::new(MAPS_DIR_NAME);
        self.files
            .iter()
            .filter(|f| f.relative.parent() == Some(maps_dir) && matcher.is_map_file(&f.source))
            .filter_map(|f| f.relative.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    fn locate_file(path: PathBuf, matcher: &MapMatcher) -> Result<Self> {
        if !matcher.is_map_file(&path) {
            return Err(Error::NotAMapFile(path));
        }
        if let Err(e) = File::open(&path) {
            return Err(Error::MapUnreadable(path, e));
        }
        let file_name = match path.file_name() {
            Some(name) => name.to_owned(),
            None => return Err(Error::NotAMapFile(path)),
        };
        Ok(Self {
            files: vec![MapFile {
                source: path.clone(),
                relative: Path::new(MAPS_DIR_NAME).join(file_name),
            }],
            path,
            layout: MapLayout::File,
        })
    }

    fn locate_dir(path: PathBuf, game: Game, matcher: &MapMatcher) -> Result<Self> {
        let game_dir = path.join(game.dir_name());
        let (layout, base, prefix) = if utils::is_directory(&game_dir).with_path(&game_dir)? {
            let maps_dir = game_dir.join(MAPS_DIR_NAME);
            if !utils::is_directory(&maps_dir).with_path(&maps_dir)? {
                return Err(Error::InvalidMapDirectory {
                    reason: format!("directory '{}' not found", maps_dir.display()),
                    path,
                });
            }
            (MapLayout::Game, game_dir, PathBuf::new())
        } else if utils::is_directory(path.join(MAPS_DIR_NAME)).with_path(&path)? {
            (MapLayout::Content, path.clone(), PathBuf::new())
        } else if has_top_level_map(&path, matcher)? {
            (MapLayout::Loose, path.clone(), PathBuf::from(MAPS_DIR_NAME))
        } else {
            return Err(Error::InvalidMapDirectory {
                reason: format!(
                    "no '{}' or '{}' directory and no map files found",
                    game.dir_name(),
                    MAPS_DIR_NAME
                ),
                path,
            });
        };

        let files: Vec<MapFile> = utils::collect_files_in_dir_recursive(&base)
            .with_path(&base)?
            .into_iter()
            .filter_map(|source| {
                let relative = prefix.join(source.strip_prefix(&base).ok()?);
                Some(MapFile { source, relative })
            })
            .collect();

        if files.is_empty() {
            return Err(Error::InvalidMapDirectory {
                reason: "it contains no files".to_string(),
                path,
            });
        }

        Ok(Self {
            path,
            layout,
            files,
        })
    }
}

fn has_top_level_map(dir: &Path, matcher: &MapMatcher) -> Result<bool> {
    for entry in std::fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        if entry.file_type().with_path(entry.path())?.is_file() && matcher.is_map_file(&entry.path())
        {
            return Ok(true);
        }
    }
    Ok(false)
}
