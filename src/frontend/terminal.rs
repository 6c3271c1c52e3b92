use std::path::{Path, PathBuf};

use colored::Colorize;
use inquire::{Confirm, InquireError, Select, Text};

use super::{conflict_message, success_message, ConflictChoice, Frontend, Notice};
use crate::{error::ErrorKind, game::Game, installation::GameInstall, plan::CopyAction};

/// Prompts on the terminal.
#[derive(Debug, Default)]
pub struct TerminalFrontend;

impl TerminalFrontend {
    pub fn new() -> Self {
        Self
    }
}

/// A dismissed or failed prompt counts as no answer.
fn answer<T>(result: Result<T, InquireError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => None,
        Err(e) => {
            log::warn!("prompt failed: {e}");
            None
        }
    }
}

fn path_prompt(message: &str, start: &Path) -> Option<PathBuf> {
    let start = start.display().to_string();
    let input = answer(Text::new(message).with_default(&start).prompt())?;
    let input = input.trim();
    if input.is_empty() {
        None
    } else {
        Some(PathBuf::from(input))
    }
}

impl Frontend for TerminalFrontend {
    fn pick_game(&mut self, current: Game) -> Option<Game> {
        let cursor = Game::ALL.iter().position(|g| *g == current).unwrap_or(0);
        answer(
            Select::new("Game:", Game::ALL.to_vec())
                .with_starting_cursor(cursor)
                .prompt(),
        )
    }

    fn pick_map(&mut self, start: &Path) -> Option<PathBuf> {
        path_prompt("Map file or folder:", start)
    }

    fn pick_game_dir(&mut self, game: Game, start: &Path) -> Option<PathBuf> {
        path_prompt(&format!("{game} game directory:"), start)
    }

    fn resolve_conflicts(
        &mut self,
        install: &GameInstall,
        conflicts: &[&CopyAction],
    ) -> ConflictChoice {
        println!("{}", conflict_message(install, conflicts).yellow());
        answer(
            Select::new(
                "Replace files?",
                vec![
                    ConflictChoice::Replace,
                    ConflictChoice::Skip,
                    ConflictChoice::Cancel,
                ],
            )
            .prompt(),
        )
        .unwrap_or(ConflictChoice::Cancel)
    }

    fn confirm(&mut self, _title: &str, question: &str) -> bool {
        answer(Confirm::new(question).with_default(false).prompt()).unwrap_or(false)
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Success(report) => {
                println!("{}", success_message(report).green());
                for path in report.copied.iter() {
                    println!("  {} {}", "copied".green(), path.display());
                }
            }
            Notice::Cancelled => println!("{}", "Operation canceled".yellow()),
            Notice::Error(e) => {
                let label = match e.kind() {
                    ErrorKind::Validation => "invalid selection",
                    ErrorKind::Io => "error",
                };
                eprintln!("{}: {}", label.red().bold(), e);
            }
        }
    }
}
