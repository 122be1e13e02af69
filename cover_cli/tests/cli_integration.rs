use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

const COVERS: &str = r#"
[device]
mac = "34-EA-34-B4-3C-8A"

[[covers]]
name = "Living room"
device_class = "shutter"
command_open = "JgAcAB0dHB44HhweDQU="
command_close = "JgAcAB0dOB4cHhweDQU="
command_stop = "JgAcADgeHR0cHhweDQU="
opening_time = 25.0
closing_time = 20.0

[[covers]]
name = "Garage"
command_open = "JgAcAB0dHB44HhweDQU="
command_close = "JgAcAB0dOB4cHhweDQU="
"#;

// Build a config file in `dir`, optionally with extra TOML appended
fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let path = dir.path().join("covers.toml");
    fs::write(&path, format!("{COVERS}{extra}")).unwrap();
    path
}

fn cover_cmd(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("cover_cli").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["list"], 0, "Living room [34:ea:34:b4:3c:8a-Living room]", "stdout")]
#[case(&["list"], 0, "supports=open,close,stop,position", "stdout")]
#[case(&["run", "--cover", "Living room", "--fast", "open"], 0, "Living room: open position=100", "stdout")]
#[case(&["run", "--cover", "Attic", "--fast", "open"], 4, "No cover named", "stderr")]
#[case(&["run", "--cover", "Garage", "--fast", "spin"], 2, "unknown step", "stderr")]
#[case(&["run", "--cover", "Garage"], 2, "required", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let mut cmd = cover_cmd(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn self_check_reports_each_bad_cover() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        r#"
[[covers]]
name = "Broken"
command_open = "!!!not base64"

[[covers]]
name = "Garage"
"#,
    );

    cover_cmd(&cfg)
        .arg("self-check")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("ok: Living room"))
        .stdout(predicate::str::contains("invalid: Broken: command_open"))
        .stdout(predicate::str::contains("invalid: Garage: duplicate cover name"));
}

#[rstest]
fn run_persists_and_restores_state() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let state = dir.path().join("state.json");

    cover_cmd(&cfg)
        .arg("--state")
        .arg(&state)
        .args(["run", "--cover", "Living room", "--fast", "close"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Living room: closed position=0"));

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    let entry = &saved["34:ea:34:b4:3c:8a-Living room"];
    assert_eq!(entry["state"], "closed");
    assert_eq!(entry["position"], 0);

    // From a restored position the cover can move to an intermediate target.
    cover_cmd(&cfg)
        .arg("--state")
        .arg(&state)
        .args(["run", "--cover", "Living room", "--fast", "position=40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Living room: closed position=0"))
        .stdout(predicate::str::contains("Living room: open position=40"));

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["34:ea:34:b4:3c:8a-Living room"]["position"], 40);
}

#[rstest]
fn run_stop_mid_travel_with_wait() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let state = dir.path().join("state.json");
    fs::write(
        &state,
        r#"{"34:ea:34:b4:3c:8a-Living room": {"state": "open", "position": 100}}"#,
    )
    .unwrap();

    // 5 s of a 20 s close covers 25 units.
    cover_cmd(&cfg)
        .arg("--state")
        .arg(&state)
        .args(["run", "--cover", "Living room", "--fast", "close", "wait=5", "stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Living room: open position=75"));
}

#[rstest]
fn json_run_emits_state_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let out = cover_cmd(&cfg)
        .args(["--json", "run", "--cover", "Garage", "--fast", "open", "stop"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let last = lines.last().unwrap();
    assert_eq!(last["id"], "34:ea:34:b4:3c:8a-Garage");
    // Open/close-only: no stop capability and no reported position.
    assert_eq!(last["capabilities"]["stop"], false);
    assert!(last["position"].is_null());
    assert_eq!(last["state"], "open");
}

#[rstest]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let out = cover_cmd(&cfg)
        .args(["--json", "run", "--cover", "Attic", "open"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    let err: serde_json::Value = serde_json::from_str(String::from_utf8(out.stderr).unwrap().lines().last().unwrap()).unwrap();
    assert_eq!(err["reason"], "UnknownCover");
    assert_eq!(err["details"]["cover"], "Attic");
}

#[rstest]
fn missing_config_file_is_explained() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    cover_cmd(&missing)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reading config"));
}
