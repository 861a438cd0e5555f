use std::path::Path;
use std::process::{Command, Output};

use toolbox::data::{self, Dataset};

fn toolbox(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_toolbox"))
        .args(args)
        .env_remove("TOOLBOX_LOG")
        .env_remove("TOOLBOX_MAX_NESTING")
        .env_remove("TOOLBOX_USE_LEGACY_BINDING")
        .output()
        .unwrap()
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

fn write_dataset(dir: &Path, file: &str, values: &[f64]) -> String {
    let path = dir.join(file);
    let ds = Dataset::new("rain", "mm", vec![values.len()], values.to_vec());
    data::save_dataset(&ds, &path).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn version_command() {
    let out = toolbox(&["version"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), format!("{}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn result_is_printed() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_dataset(dir.path(), "a.json", &[1.0, 2.0]);
    let out = toolbox(&["describe", "[", "combine", &a, &a, "--new-name=double", "]"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("name: double\n"));
    assert!(text.contains("max: 4"));
}

#[test]
fn persisted_result_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_dataset(dir.path(), "a.json", &[1.0]);
    let dest = dir.path().join("sum.json");
    let out_arg = format!("--output={}", dest.display());
    let out = toolbox(&["combine", &a, &a, &out_arg]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert_eq!(data::load_dataset(&dest).unwrap().values, vec![2.0]);
}

#[test]
fn verbose_echoes_each_invocation() {
    let out = toolbox(&["-v", "describe", "[", "version", "]"]);
    // version yields text, which describe cannot use as a dataset path.
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.starts_with("toolbox version  ->  <toolbox.Text@"));
}

#[test]
fn dry_run_echoes_structure() {
    let out = toolbox(&["--dry-run", "combine", "[", "threshold", "x.json", "1", "]", "y.json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "toolbox threshold x.json 1  ->  [ threshold x.json 1 ]\n\
         toolbox combine [ threshold x.json 1 ] y.json  ->  \
         [ combine [ threshold x.json 1 ] y.json ]\n"
    );
}

#[test]
fn bracket_mismatch_exits_two() {
    let out = toolbox(&["combine", "a", "]"]);
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(stderr(&out), "Error: Mismatched bracket at position 1.\n");
    assert!(stdout(&out).is_empty());
}

#[test]
fn bracket_as_command_is_a_mismatch() {
    let out = toolbox(&["[", "version", "]"]);
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(stderr(&out), "Error: Mismatched bracket at position 1.\n");
}

#[test]
fn unknown_command_exits_two() {
    let out = toolbox(&["frobnicate"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unknown command 'frobnicate'"));
}

#[test]
fn help_and_command_help() {
    let out = toolbox(&["help"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Spaces around brackets are mandatory."));

    let out = toolbox(&["threshold", "--help"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Usage: toolbox threshold "));
    assert!(text.contains("<DATASET> <THRESHOLD>"));
    assert!(text.contains("--intermediate-output <PATH>"));
}

#[test]
fn help_as_option_value_is_bound() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_dataset(dir.path(), "a.json", &[1.0]);
    let out = toolbox(&["describe", "[", "combine", &a, "--new-name", "--help", "]"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).starts_with("name: --help\n"));
}

#[test]
fn log_filter_from_environment() {
    let out = Command::new(env!("CARGO_BIN_EXE_toolbox"))
        .arg("version")
        .env("TOOLBOX_LOG", "debug")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(stderr(&out).contains("[DEBUG] toolbox::cmd - registered"));
}

#[test]
fn nesting_limit_from_environment() {
    let out = Command::new(env!("CARGO_BIN_EXE_toolbox"))
        .args(["describe", "[", "describe", "[", "version", "]", "]"])
        .env("TOOLBOX_MAX_NESTING", "1")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("nesting deeper than 1"));
}
