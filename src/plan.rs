use std::{
    collections::HashMap,
    ops::Index,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::{
    error::{Error, IoResultExt, Result},
    game::Game,
    installation::GameInstall,
    map::MapSource,
    utils,
};

slotmap::new_key_type! {
    pub struct CopyID;
}

/// How existing, different files in the game directory are treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Let the user decide when conflicts are found.
    #[default]
    Ask,
    Replace,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Replace,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    /// Nothing exists at the target.
    New,
    /// The target already has the same content.
    Identical,
    /// The target exists with different content.
    Conflict,
}

#[derive(Debug)]
pub struct CopyAction {
    source: PathBuf,
    target: PathBuf,
    status: CopyStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub created_dirs: Vec<PathBuf>,
}

/// The copies needed to install a map, keyed by target path.
#[derive(Debug)]
pub struct InstallPlan {
    game: Game,
    actions: SlotMap<CopyID, CopyAction>,
    targets: HashMap<PathBuf, CopyID>,
}

// -------------------- CopyAction -------------------- //

impl CopyAction {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn status(&self) -> CopyStatus {
        self.status
    }
}

// -------------------- InstallReport -------------------- //

impl InstallReport {
    /// Nothing was copied, the map was already installed.
    pub fn is_noop(&self) -> bool {
        self.copied.is_empty()
    }
}

// -------------------- InstallPlan -------------------- //

impl Index<CopyID> for InstallPlan {
    type Output = CopyAction;

    fn index(&self, index: CopyID) -> &Self::Output {
        &self.actions[index]
    }
}

impl InstallPlan {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            actions: Default::default(),
            targets: Default::default(),
        }
    }

    /// Plans every file of `map` into `install` and classifies the targets.
    ///
    /// A map source that is, or contains, the installation is rejected.
    pub fn build(map: &MapSource, install: &GameInstall) -> Result<Self> {
        let map_path = utils::canonical_or_self(map.path());
        if install.root().starts_with(&map_path)
            || install.content_dir().starts_with(&map_path)
            || map_path == utils::canonical_or_self(&install.maps_dir())
        {
            return Err(Error::SameDirectory(map_path));
        }

        let mut plan = Self::new(install.game());
        for file in map.files() {
            plan.insert(&file.source, install.content_dir().join(&file.relative));
        }
        plan.classify()?;
        Ok(plan)
    }

    /// Adds a copy to `target`. A previous copy to the same target is replaced.
    pub fn insert(&mut self, source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> CopyID {
        let source = source.into();
        let target = target.into();
        if let Some(&copy_id) = self.targets.get(&target) {
            log::trace!("replacing planned copy to {}", target.display());
            self.actions[copy_id].source = source;
            self.actions[copy_id].status = CopyStatus::New;
            return copy_id;
        }
        let copy_id = self.actions.insert(CopyAction {
            source,
            target: target.clone(),
            status: CopyStatus::New,
        });
        self.targets.insert(target, copy_id);
        copy_id
    }

    /// Compares every target with its source.
    pub fn classify(&mut self) -> Result<()> {
        for action in self.actions.values_mut() {
            action.status = if !utils::is_file(&action.target).with_path(&action.target)? {
                CopyStatus::New
            } else if utils::same_content(&action.source, &action.target)
                .with_path(&action.target)?
            {
                CopyStatus::Identical
            } else {
                CopyStatus::Conflict
            };
        }
        Ok(())
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action_ids(&self) -> impl Iterator<Item = CopyID> + '_ {
        self.actions.keys()
    }

    pub fn actions(&self) -> impl Iterator<Item = &CopyAction> {
        self.actions.values()
    }

    pub fn find(&self, target: impl AsRef<Path>) -> Option<CopyID> {
        self.targets.get(target.as_ref()).copied()
    }

    pub fn conflicts(&self) -> Vec<&CopyAction> {
        self.actions()
            .filter(|a| a.status == CopyStatus::Conflict)
            .collect()
    }

    pub fn has_conflicts(&self) -> bool {
        self.actions().any(|a| a.status == CopyStatus::Conflict)
    }

    /// Performs the copies. Identical targets are always skipped, conflicts follow `resolution`.
    pub fn execute(&self, resolution: Resolution) -> Result<InstallReport> {
        let mut report = InstallReport::default();
        for copy_id in self.action_ids() {
            let action = &self[copy_id];
            let skip = match action.status {
                CopyStatus::New => false,
                CopyStatus::Identical => true,
                CopyStatus::Conflict => resolution == Resolution::Skip,
            };
            if skip {
                log::info!(
                    "SKIPPED Copying {} to {}",
                    action.source.display(),
                    action.target.display()
                );
                report.skipped.push(action.target.clone());
                continue;
            }

            if let Some(parent) = action.target.parent() {
                if !utils::is_directory(parent).with_path(parent)? {
                    log::warn!("Directory {} did not exist, creating", parent.display());
                    std::fs::create_dir_all(parent).map_err(|e| self.write_error(parent, e))?;
                    report.created_dirs.push(parent.to_owned());
                }
            }

            log::info!(
                "Copying {} to {}",
                action.source.display(),
                action.target.display()
            );
            std::fs::copy(&action.source, &action.target)
                .map_err(|e| self.write_error(&action.target, e))?;
            report.copied.push(action.target.clone());
        }
        log::info!(
            "Finished copying ({} copied, {} skipped)",
            report.copied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn write_error(&self, path: &Path, e: std::io::Error) -> Error {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path: path.to_owned(),
                game: self.game,
            },
            _ => Error::io(path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_plan() {
        let plan = InstallPlan::new(Game::CounterStrike);
        assert!(plan.is_empty());
        assert!(!plan.has_conflicts());
    }

    #[test]
    fn insert_replaces_same_target() {
        let mut plan = InstallPlan::new(Game::CounterStrike);
        let first = plan.insert("/a/de_x.bsp", "/games/cstrike/maps/de_x.bsp");
        let second = plan.insert("/b/de_x.bsp", "/games/cstrike/maps/de_x.bsp");
        assert_eq!(first, second);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[first].source(), Path::new("/b/de_x.bsp"));
        assert_eq!(plan.find("/games/cstrike/maps/de_x.bsp"), Some(first));
    }

    #[test]
    fn classify_and_execute() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst/maps");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(src.join("new.bsp"), "new").unwrap();
        std::fs::write(src.join("same.bsp"), "same").unwrap();
        std::fs::write(src.join("diff.bsp"), "theirs").unwrap();
        std::fs::write(dst.join("same.bsp"), "same").unwrap();
        std::fs::write(dst.join("diff.bsp"), "mine").unwrap();

        let mut plan = InstallPlan::new(Game::CounterStrike);
        let new = plan.insert(src.join("new.bsp"), dst.join("new.bsp"));
        let same = plan.insert(src.join("same.bsp"), dst.join("same.bsp"));
        let diff = plan.insert(src.join("diff.bsp"), dst.join("diff.bsp"));
        plan.classify().unwrap();

        assert_eq!(plan[new].status(), CopyStatus::New);
        assert_eq!(plan[same].status(), CopyStatus::Identical);
        assert_eq!(plan[diff].status(), CopyStatus::Conflict);
        assert_eq!(plan.conflicts().len(), 1);

        let report = plan.execute(Resolution::Skip).unwrap();
        assert_eq!(report.copied, vec![dst.join("new.bsp")]);
        assert_eq!(std::fs::read_to_string(dst.join("diff.bsp")).unwrap(), "mine");

        let report = plan.execute(Resolution::Replace).unwrap();
        assert!(report.copied.contains(&dst.join("diff.bsp")));
        assert_eq!(
            std::fs::read_to_string(dst.join("diff.bsp")).unwrap(),
            "theirs"
        );
    }

    #[test]
    fn execute_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("de_x.bsp"), "x").unwrap();
        let dst = dir.path().join("cstrike/maps");

        let mut plan = InstallPlan::new(Game::CounterStrike);
        plan.insert(dir.path().join("de_x.bsp"), dst.join("de_x.bsp"));
        plan.classify().unwrap();
        let report = plan.execute(Resolution::Skip).unwrap();

        assert_eq!(report.created_dirs, vec![dst.clone()]);
        assert_eq!(std::fs::read(dst.join("de_x.bsp")).unwrap(), b"x");
    }

    #[test]
    fn permission_denied_names_the_game() {
        let plan = InstallPlan::new(Game::ConditionZero);
        let err = plan.write_error(
            Path::new("/games/czero/maps/de_x.bsp"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(
            err,
            Error::PermissionDenied {
                game: Game::ConditionZero,
                ..
            }
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(err.to_string().starts_with(
            "No permission to write to Condition Zero directory, did you run the application as administrator?"
        ));

        let err = plan.write_error(
            Path::new("/games/czero/maps"),
            std::io::Error::from(std::io::ErrorKind::Other),
        );
        assert!(matches!(err, Error::Io { .. }));
    }
}
