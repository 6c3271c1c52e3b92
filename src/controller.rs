use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    detect::{self, Detected, Detector},
    error::{Error, Result},
    frontend::{ConflictChoice, Frontend, Notice},
    game::Game,
    installation::GameInstall,
    map::{MapMatcher, MapSource},
    plan::{InstallPlan, InstallReport, OverwritePolicy, Resolution},
};

/// Outcome of a prompt the user may dismiss. Dismissing is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Selected(T),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(InstallReport),
    Cancelled,
}

/// Counts of what happened during an interactive session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub installs: usize,
    pub errors: usize,
}

enum Step {
    Next,
    Restart,
    Quit,
}

/// Drives the selection of a map and a game installation and the install itself.
#[derive(Debug)]
pub struct Controller {
    config: Config,
    matcher: MapMatcher,
    detector: Detector,
    game: Game,
    map: Option<MapSource>,
    install: Option<GameInstall>,
    last_map_dir: Option<PathBuf>,
    last_game_dir: Option<PathBuf>,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self> {
        let mut detector = Detector::with_platform_defaults(config.detect_depth);
        detector.prepend_search_roots(config.search_roots.iter().cloned());
        detector.prepend_steam_roots(config.steam_roots.iter().cloned());
        Self::with_detector(config, detector)
    }

    pub fn with_detector(config: Config, detector: Detector) -> Result<Self> {
        let matcher = MapMatcher::new(&config.map_patterns)?;
        Ok(Self {
            game: config.game,
            config,
            matcher,
            detector,
            map: None,
            install: None,
            last_map_dir: None,
            last_game_dir: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn game(&self) -> Game {
        self.game
    }

    /// Changing the game discards previous selections, they were validated for the old game.
    pub fn set_game(&mut self, game: Game) {
        if game != self.game {
            log::info!("selected game {}", game);
            self.map = None;
            self.install = None;
        }
        self.game = game;
    }

    pub fn map(&self) -> Option<&MapSource> {
        self.map.as_ref()
    }

    pub fn install_target(&self) -> Option<&GameInstall> {
        self.install.as_ref()
    }

    /// Asks the frontend for a map and validates it.
    pub fn select_map(&mut self, frontend: &mut dyn Frontend) -> Result<Selection<PathBuf>> {
        let start = self
            .last_map_dir
            .clone()
            .unwrap_or_else(detect::default_map_directory);
        match frontend.pick_map(&start) {
            Some(path) => self.set_map_path(&path).map(Selection::Selected),
            None => {
                log::info!("no map selected");
                Ok(Selection::Cancelled)
            }
        }
    }

    /// Validates `path` as the map to install. Returns its canonical path.
    pub fn set_map_path(&mut self, path: &Path) -> Result<PathBuf> {
        self.map = None;
        let source = MapSource::locate(path, self.game, &self.matcher)?;
        let canonical = source.path().to_owned();
        self.last_map_dir = canonical.parent().map(Path::to_owned);
        log::info!(
            "selected map {} ({})",
            canonical.display(),
            source.map_names(&self.matcher).join(", ")
        );
        self.map = Some(source);
        Ok(canonical)
    }

    pub fn detect_game_dir(&self) -> Option<Detected> {
        self.detector.detect(self.game)
    }

    /// Asks the frontend for the game directory, prefilled with the detected one, and
    /// validates it.
    pub fn select_game_dir(&mut self, frontend: &mut dyn Frontend) -> Result<Selection<PathBuf>> {
        let start = match self.last_game_dir.clone() {
            Some(dir) => dir,
            None => match self.detect_game_dir() {
                Some(detected) => detected.root,
                None => detect::default_map_directory(),
            },
        };
        match frontend.pick_game_dir(self.game, &start) {
            Some(path) => self.set_game_dir(&path).map(Selection::Selected),
            None => {
                log::info!("no game directory selected");
                Ok(Selection::Cancelled)
            }
        }
    }

    /// Validates `path` as the installation to install into. Returns its canonical root.
    pub fn set_game_dir(&mut self, path: &Path) -> Result<PathBuf> {
        self.install = None;
        let install = GameInstall::locate(path, self.game, self.config.maps_dir)?;
        let root = install.root().to_owned();
        self.last_game_dir = Some(root.clone());
        log::info!("selected game directory {}", root.display());
        self.install = Some(install);
        Ok(root)
    }

    /// Uses the detected installation of the selected game as the game directory.
    /// An installation of the other game is ignored, the map was validated for this one.
    pub fn use_detected_game_dir(&mut self) -> Result<Option<PathBuf>> {
        match self.detect_game_dir() {
            Some(detected) if detected.game == self.game => {
                self.set_game_dir(&detected.root).map(Some)
            }
            Some(detected) => {
                log::debug!(
                    "ignoring {} installation at {}",
                    detected.game,
                    detected.root.display()
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Copies the selected map into the selected installation.
    pub fn install(&mut self, frontend: &mut dyn Frontend) -> Result<InstallOutcome> {
        let map = self.map.as_ref().ok_or(Error::NotSelected("map"))?;
        let install = self
            .install
            .as_ref()
            .ok_or(Error::NotSelected("game directory"))?;

        let plan = InstallPlan::build(map, install)?;
        let resolution = if plan.has_conflicts() {
            match self.config.overwrite {
                OverwritePolicy::Replace => Resolution::Replace,
                OverwritePolicy::Skip => Resolution::Skip,
                OverwritePolicy::Ask => match frontend.resolve_conflicts(install, &plan.conflicts()) {
                    ConflictChoice::Replace => Resolution::Replace,
                    ConflictChoice::Skip => Resolution::Skip,
                    ConflictChoice::Cancel => {
                        log::info!("install canceled");
                        return Ok(InstallOutcome::Cancelled);
                    }
                },
            }
        } else {
            Resolution::Skip
        };

        let report = plan.execute(resolution)?;
        Ok(InstallOutcome::Installed(report))
    }

    /// Interactive loop: pick game, map and directory, install, repeat until the user quits.
    /// Errors are reported through the frontend and never end the session on their own.
    pub fn run(&mut self, frontend: &mut dyn Frontend) -> Session {
        let mut session = Session::default();
        loop {
            match frontend.pick_game(self.game) {
                Some(game) => self.set_game(game),
                None => break,
            }

            let step = self.select_map(frontend);
            match self.settle(frontend, &mut session, step, "No map was selected.") {
                Step::Next => {}
                Step::Restart => continue,
                Step::Quit => break,
            }

            let step = self.select_game_dir(frontend);
            match self.settle(frontend, &mut session, step, "No game directory was selected.") {
                Step::Next => {}
                Step::Restart => continue,
                Step::Quit => break,
            }

            match self.install(frontend) {
                Ok(InstallOutcome::Installed(report)) => {
                    session.installs += 1;
                    frontend.notify(Notice::Success(&report));
                }
                Ok(InstallOutcome::Cancelled) => frontend.notify(Notice::Cancelled),
                Err(e) => {
                    log::error!("{e}");
                    session.errors += 1;
                    frontend.notify(Notice::Error(&e));
                }
            }

            if !frontend.confirm("Install map", "Install another map?") {
                break;
            }
        }
        session
    }

    fn settle(
        &self,
        frontend: &mut dyn Frontend,
        session: &mut Session,
        step: Result<Selection<PathBuf>>,
        cancelled: &str,
    ) -> Step {
        match step {
            Ok(Selection::Selected(_)) => Step::Next,
            Ok(Selection::Cancelled) => {
                if frontend.confirm("Nothing selected", &format!("{cancelled} Try again?")) {
                    Step::Restart
                } else {
                    Step::Quit
                }
            }
            Err(e) => {
                log::error!("{e}");
                session.errors += 1;
                frontend.notify(Notice::Error(&e));
                if frontend.confirm("Error", "Try again?") {
                    Step::Restart
                } else {
                    Step::Quit
                }
            }
        }
    }
}
