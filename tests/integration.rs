use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn read_ini_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_read_ini"));
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn drinks(dir: &TempDir) -> PathBuf {
    write(dir, "drinks.ini", "[drinks]\nfav = coffee\n")
}

// ===========================================
// Reading values
// ===========================================

#[test]
fn test_read_value_from_flags() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "drinks", "--option", "fav"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result = json(&output);
    assert_eq!(result["changed"], Value::Bool(true));
    assert_eq!(result["value"], "coffee");
    assert_eq!(result["path"], ini.to_str().unwrap());
}

#[test]
fn test_missing_option_fails() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "drinks", "--option", "soda"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let result = json(&output);
    assert_eq!(result["failed"], Value::Bool(true));
    assert_eq!(result["msg"], "option does not exist: soda");
    assert!(result.get("value").is_none());
}

#[test]
fn test_missing_section_fails() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "snacks", "--option", "fav"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json(&output)["msg"], "section does not exist: snacks");
}

#[test]
fn test_missing_file_fails_without_crash() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.ini");

    let output = read_ini_cmd(dir.path())
        .args(["--path", missing.to_str().unwrap()])
        .args(["--section", "s", "--option", "o"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let msg = json(&output)["msg"].as_str().unwrap().to_string();
    assert!(msg.starts_with(&format!("failed to read {}", missing.display())));
}

#[test]
fn test_option_is_case_sensitive() {
    let dir = TempDir::new().unwrap();
    let ini = write(&dir, "case.ini", "[S]\nKey = 1\n");

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "S", "--option", "key"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json(&output)["msg"], "option does not exist: key");
}

#[test]
fn test_latin1_comment_does_not_block_read() {
    let dir = TempDir::new().unwrap();
    let ini = dir.path().join("legacy.ini");
    fs::write(&ini, b"# caf\xe9 settings\n[drinks]\nfav = coffee\n").unwrap();

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "drinks", "--option", "fav"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(json(&output)["value"], "coffee");
}

#[test]
fn test_semicolon_value_after_delimiter() {
    let dir = TempDir::new().unwrap();
    let ini = write(&dir, "semi.ini", "[s]\nk = ;x\n");

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "s", "--option", "k"])
        .output()
        .unwrap();

    assert_eq!(json(&output)["value"], ";x");
}

#[test]
fn test_multiline_value() {
    let dir = TempDir::new().unwrap();
    let ini = write(&dir, "multi.ini", "[s]\nhosts = a\n  b\n  c\n");

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "s", "--option", "hosts"])
        .output()
        .unwrap();

    assert_eq!(json(&output)["value"], "a\nb\nc");
}

#[test]
fn test_repeated_runs_identical() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);

    let run = || {
        read_ini_cmd(dir.path())
            .args(["--path", ini.to_str().unwrap()])
            .args(["--section", "drinks", "--option", "fav"])
            .output()
            .unwrap()
            .stdout
    };

    let first = run();
    assert_eq!(run(), first);
    assert_eq!(fs::read_to_string(&ini).unwrap(), "[drinks]\nfav = coffee\n");
}

// ===========================================
// Module arguments
// ===========================================

#[test]
fn test_json_args_file() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);
    let args = write(
        &dir,
        "args.json",
        &format!(
            r#"{{"ANSIBLE_MODULE_ARGS": {{"path": "{}", "section": "drinks", "option": "fav", "_ansible_debug": false}}}}"#,
            ini.display()
        ),
    );

    let output = read_ini_cmd(dir.path()).arg(&args).output().unwrap();

    assert!(output.status.success());
    let result = json(&output);
    assert_eq!(result["value"], "coffee");
    assert_eq!(result["invocation"]["module_args"]["option"], "fav");
}

#[test]
fn test_key_value_args_file() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);
    let args = write(
        &dir,
        "args",
        &format!("path={} section=drinks option=fav", ini.display()),
    );

    let output = read_ini_cmd(dir.path()).arg(&args).output().unwrap();

    assert!(output.status.success());
    assert_eq!(json(&output)["value"], "coffee");
}

#[test]
fn test_flags_override_args_file() {
    let dir = TempDir::new().unwrap();
    let ini = write(&dir, "app.ini", "[a]\nx = 1\ny = 2\n");
    let args = write(
        &dir,
        "args",
        &format!("path={} section=a option=x", ini.display()),
    );

    let output = read_ini_cmd(dir.path())
        .arg(&args)
        .args(["--option", "y"])
        .output()
        .unwrap();

    assert_eq!(json(&output)["value"], "2");
}

#[test]
fn test_missing_arguments_fail() {
    let dir = TempDir::new().unwrap();

    let output = read_ini_cmd(dir.path())
        .args(["--section", "s"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        json(&output)["msg"],
        "missing required arguments: path, option"
    );
}

#[test]
fn test_unsupported_argument_fails() {
    let dir = TempDir::new().unwrap();
    let args = write(&dir, "args", "path=/x section=s option=o backup=yes");

    let output = read_ini_cmd(dir.path()).arg(&args).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let msg = json(&output)["msg"].as_str().unwrap().to_string();
    assert!(msg.starts_with("Unsupported parameters for (read_ini) module: backup"));
}

#[test]
fn test_unreadable_args_file_fails() {
    let dir = TempDir::new().unwrap();

    let output = read_ini_cmd(dir.path())
        .arg(dir.path().join("absent-args"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let result = json(&output);
    assert!(result["msg"]
        .as_str()
        .unwrap()
        .starts_with("failed to read arguments file"));
    assert!(result.get("invocation").is_none());
}

#[test]
fn test_tilde_path_expanded() {
    let home = TempDir::new().unwrap();
    drinks(&home);

    let output = read_ini_cmd(home.path())
        .env("HOME", home.path())
        .args(["--path", "~/drinks.ini", "--section", "drinks", "--option", "fav"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result = json(&output);
    assert_eq!(result["value"], "coffee");
    assert_eq!(
        result["path"],
        home.path().join("drinks.ini").to_str().unwrap()
    );
}

// ===========================================
// Parser options
// ===========================================

#[test]
fn test_interpolation_and_raw_flag() {
    let dir = TempDir::new().unwrap();
    let ini = write(&dir, "app.ini", "[app]\nroot = /opt\nbin = %(root)s/bin\n");

    let read = |extra: &[&str]| {
        let output = read_ini_cmd(dir.path())
            .args(["--path", ini.to_str().unwrap()])
            .args(["--section", "app", "--option", "bin"])
            .args(extra)
            .output()
            .unwrap();
        json(&output)["value"].as_str().unwrap().to_string()
    };

    assert_eq!(read(&[]), "/opt/bin");
    assert_eq!(read(&["--raw"]), "%(root)s/bin");
}

#[test]
fn test_default_section_inherited() {
    let dir = TempDir::new().unwrap();
    let ini = write(&dir, "app.ini", "[common]\nport = 22\n[ssh]\n");

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "ssh", "--option", "port"])
        .args(["--default-section", "common"])
        .output()
        .unwrap();

    assert_eq!(json(&output)["value"], "22");
}

// ===========================================
// Output format
// ===========================================

#[test]
fn test_text_format() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "drinks", "--option", "fav"])
        .args(["--format", "text"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "coffee\n");
}

#[test]
fn test_text_format_error_on_stderr() {
    let dir = TempDir::new().unwrap();
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "snacks", "--option", "fav"])
        .args(["--format", "text"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: section does not exist: snacks"));
}

// ===========================================
// Configuration file
// ===========================================

#[test]
fn test_init_creates_config_file() {
    let dir = TempDir::new().unwrap();

    let output = read_ini_cmd(dir.path()).arg("--init").output().unwrap();

    assert!(output.status.success());
    let content = fs::read_to_string(dir.path().join("read-ini.toml")).unwrap();
    assert!(content.contains("[parser]"));
}

#[test]
fn test_init_fails_if_config_exists() {
    let dir = TempDir::new().unwrap();
    write(&dir, "read-ini.toml", "existing");

    let output = read_ini_cmd(dir.path()).arg("--init").output().unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_config_file_applies() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "read-ini.toml",
        "[parser]\ninterpolation = false\n\n[output]\nformat = \"text\"\n",
    );
    let ini = write(&dir, "app.ini", "[app]\nbin = %(root)s/bin\n");

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "app", "--option", "bin"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "%(root)s/bin\n");
}

#[test]
fn test_cli_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "read-ini.toml", "[output]\nformat = \"text\"\n");
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "drinks", "--option", "fav"])
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert_eq!(json(&output)["value"], "coffee");
}

#[test]
fn test_broken_config_file_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "custom.toml", "not valid {{{");
    let ini = drinks(&dir);

    let output = read_ini_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--path", ini.to_str().unwrap()])
        .args(["--section", "drinks", "--option", "fav"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(json(&output)["value"], "coffee");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Warning: Failed to load"));
}
