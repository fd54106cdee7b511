//! Profile load/save through CLI invocations (non-interactive paths only).
//!
//! Profiles are written before the socket is checked, so a missing socket
//! (exit code 2) is enough to exercise them without a running balancer.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn run_hatop(config: &Path, args: &[&str]) -> (Option<i32>, String) {
    let exe = env!("CARGO_BIN_EXE_hatop");
    let output = Command::new(exe)
        .args(args)
        .env("XDG_CONFIG_HOME", config)
        .env_remove("HATOP_LOG_FILE")
        .output()
        .expect("run hatop");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.code(), text)
}

fn profiles_path(config: &Path) -> PathBuf {
    config.join("hatop").join("profiles.json")
}

#[test]
fn test_profile_created_on_first_use() {
    let td = tempfile::tempdir().unwrap();
    let (code, _out) = run_hatop(td.path(), &["--profile", "unittest", "-s", "/nonexistent/a.sock"]);
    assert_eq!(code, Some(2));
    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    assert!(data.contains("unittest"), "profiles.json missing profile entry: {data}");
    assert!(data.contains("/nonexistent/a.sock"));
}

#[test]
fn test_profile_overwrite_only_with_save() {
    let td = tempfile::tempdir().unwrap();
    run_hatop(td.path(), &["-P", "prod", "-s", "/nonexistent/one.sock"]);
    let first = fs::read_to_string(profiles_path(td.path())).unwrap();

    // identical input leaves the file alone
    run_hatop(td.path(), &["-P", "prod", "-s", "/nonexistent/one.sock"]);
    let second = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, second, "Profile file changed despite identical input");

    // different socket without --save: kept, with a hint
    let (_, out) = run_hatop(td.path(), &["-P", "prod", "-s", "/nonexistent/two.sock"]);
    assert!(out.contains("--save"), "{out}");
    let third = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, third);

    run_hatop(td.path(), &["-P", "prod", "--save", "-s", "/nonexistent/two.sock"]);
    let fourth = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(fourth.contains("two.sock"), "Updated socket not written: {fourth}");
}

#[test]
fn test_profile_loaded_by_name() {
    let td = tempfile::tempdir().unwrap();
    run_hatop(td.path(), &["-P", "stage", "-s", "/nonexistent/stage.sock", "-i", "7", "-n"]);
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("\"interval\": 7"), "{data}");
    assert!(data.contains("\"read_only\": true"), "{data}");

    // loading the profile reaches the socket check with the saved path
    let (code, out) = run_hatop(td.path(), &["-P", "stage"]);
    assert_eq!(code, Some(2));
    assert!(out.contains("stage.sock"), "{out}");
}

#[test]
fn test_unknown_profile_alone_is_an_error() {
    let td = tempfile::tempdir().unwrap();
    let (code, out) = run_hatop(td.path(), &["-P", "ghost"]);
    assert_eq!(code, Some(1));
    assert!(out.contains("ghost"));
    assert!(!profiles_path(td.path()).exists());
}

#[test]
fn test_invalid_values_are_not_saved() {
    let td = tempfile::tempdir().unwrap();
    let (code, _) = run_hatop(td.path(), &["-P", "bad", "-s", "/nonexistent/x.sock", "-i", "99"]);
    assert_eq!(code, Some(1));
    assert!(!profiles_path(td.path()).exists());
}
