use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use colored::Colorize;
use env_logger::{Env, Target};

use mapinstaller::{
    map::pattern_extensions, Config, Controller, DialogFrontend, Frontend, Game, InstallOutcome, MapsDirPolicy, Notice,
    OverwritePolicy, Selection, TerminalFrontend,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Use terminal prompts instead of native dialogs.
    #[clap(long)]
    terminal: bool,

    /// Map file or map folder to install.
    #[clap(long)]
    map: Option<PathBuf>,

    /// Game installation to install into.
    #[clap(long)]
    game_dir: Option<PathBuf>,

    /// czero or cstrike.
    #[clap(long)]
    game: Option<Game>,

    /// Replace files that already exist with different contents.
    #[clap(long, conflicts_with = "skip")]
    replace: bool,

    /// Keep files that already exist with different contents.
    #[clap(long)]
    skip: bool,

    /// Fail instead of creating a missing maps directory.
    #[clap(long)]
    require_maps_dir: bool,

    /// Print the detected game installations and exit.
    #[clap(long)]
    detect: bool,

    /// Path to the configuration file.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity, can be used multiple times.
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Disable logging.
    #[clap(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Append logs to this file instead of stderr.
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(game) = self.game {
            config.game = game;
        }
        if self.replace {
            config.overwrite = OverwritePolicy::Replace;
        }
        if self.skip {
            config.overwrite = OverwritePolicy::Skip;
        }
        if self.require_maps_dir {
            config.maps_dir = MapsDirPolicy::Require;
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logger(&args)?;

    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    let mut controller = Controller::new(config).context("Invalid map patterns")?;
    log::debug!("config : {:?}", controller.config());

    if args.detect {
        print_detected(&controller);
        return Ok(ExitCode::SUCCESS);
    }

    let mut frontend: Box<dyn Frontend> = if args.terminal {
        Box::new(TerminalFrontend::new())
    } else {
        Box::new(DialogFrontend::new(pattern_extensions(
            &controller.config().map_patterns,
        )))
    };

    if args.map.is_some() || args.game_dir.is_some() {
        let result = install_once(
            &mut controller,
            frontend.as_mut(),
            args.map.as_deref(),
            args.game_dir.as_deref(),
        );
        return Ok(match result {
            Ok(InstallOutcome::Installed(report)) => {
                frontend.notify(Notice::Success(&report));
                ExitCode::SUCCESS
            }
            Ok(InstallOutcome::Cancelled) => {
                frontend.notify(Notice::Cancelled);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{e}");
                frontend.notify(Notice::Error(&e));
                ExitCode::FAILURE
            }
        });
    }

    let session = controller.run(frontend.as_mut());
    log::info!(
        "session finished : {} install(s), {} error(s)",
        session.installs,
        session.errors
    );
    if session.installs == 0 && session.errors > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_logger(args: &Args) -> anyhow::Result<()> {
    let level = if args.quiet {
        "off"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));
    if let Some(ref path) = args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("Failed to initialize logger")?;
    Ok(())
}

fn print_detected(controller: &Controller) {
    let candidates = controller.detector().candidates();
    if candidates.is_empty() {
        println!("{}", "No game installation found".yellow());
        return;
    }
    for detected in candidates {
        let marker = if detected.game == controller.game() {
            "*".green()
        } else {
            " ".normal()
        };
        println!(
            "{} {:<16} {}",
            marker,
            detected.game.display_name(),
            detected.root.display()
        );
    }
}

/// Installs a single map, prompting only for what was not given on the command line.
fn install_once(
    controller: &mut Controller,
    frontend: &mut dyn Frontend,
    map: Option<&Path>,
    game_dir: Option<&Path>,
) -> mapinstaller::Result<InstallOutcome> {
    match map {
        Some(path) => {
            controller.set_map_path(path)?;
        }
        None => {
            if controller.select_map(frontend)? == Selection::Cancelled {
                return Ok(InstallOutcome::Cancelled);
            }
        }
    }

    match game_dir {
        Some(path) => {
            controller.set_game_dir(path)?;
        }
        None => {
            if controller.use_detected_game_dir()?.is_none()
                && controller.select_game_dir(frontend)? == Selection::Cancelled
            {
                return Ok(InstallOutcome::Cancelled);
            }
        }
    }

    controller.install(frontend)
}
