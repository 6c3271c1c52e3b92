use assert_cmd::{assert::Assert, prelude::*};
use std::{path::Path, process::Command};
use tempfile::TempDir;

const BIN_NAME: &str = "cs-cz-map-installer";
const CONFIG_FILE_NAME: &str = "config.toml";

fn create_file(path: impl AsRef<Path>, contents: &str) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

fn prepare_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    create_file(dir.path().join(CONFIG_FILE_NAME), "");
    create_file(dir.path().join("downloads/de_dust3.bsp"), "de_dust3");
    std::fs::create_dir_all(dir.path().join("games/Half-Life/cstrike/maps")).unwrap();
    create_file(dir.path().join("games/Half-Life/cstrike/liblist.gam"), "game \"Counter-Strike\"");
    dir
}

fn prepare_command(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).unwrap();
    cmd.current_dir(dir.path());
    cmd.env("HOME", dir.path());
    cmd.env_remove("RUST_LOG");
    cmd.arg("--config").arg(dir.path().join(CONFIG_FILE_NAME));
    cmd
}

fn run_command(dir: &TempDir, cmd: &str) -> Assert {
    let mut c = prepare_command(dir);
    c.args(cmd.split_whitespace());
    c.assert()
}

#[test]
fn test_cli_install() {
    let dir = prepare_dir();
    let assert = run_command(
        &dir,
        "--terminal --game cstrike --replace --map downloads/de_dust3.bsp --game-dir games/Half-Life",
    );

    assert.success().code(0);
    let installed = dir.path().join("games/Half-Life/cstrike/maps/de_dust3.bsp");
    assert_eq!(std::fs::read_to_string(installed).unwrap(), "de_dust3");
}

#[test]
fn test_cli_install_missing_game_dir() {
    let dir = prepare_dir();
    let assert = run_command(
        &dir,
        "--terminal --replace --map downloads/de_dust3.bsp --game-dir games/missing",
    );

    assert.failure().code(1);
    assert!(!dir.path().join("games/missing").exists());
}

#[test]
fn test_cli_require_maps_dir() {
    let dir = prepare_dir();
    std::fs::create_dir_all(dir.path().join("other/cstrike")).unwrap();
    let assert = run_command(
        &dir,
        "--terminal --game cstrike --require-maps-dir --map downloads/de_dust3.bsp --game-dir other",
    );

    assert.failure().code(1);
    assert!(!dir.path().join("other/cstrike/maps").exists());
}

#[test]
fn test_cli_invalid_arguments() {
    let dir = prepare_dir();
    run_command(&dir, "--replace --skip --detect").failure();
    run_command(&dir, "--game quake --detect").failure();
}

#[test]
fn test_cli_detect() {
    let dir = prepare_dir();
    create_file(
        dir.path().join(CONFIG_FILE_NAME),
        &format!(
            "search_roots = [{:?}]\n",
            dir.path().join("games").display().to_string()
        ),
    );

    let output = prepare_command(&dir).arg("--detect").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Counter-Strike"));
    assert!(stdout.contains("Half-Life"));
}
