//! End-to-end tests for complete probe runs
//!
//! Every test probes loopback only: a bound `TcpListener` stands in for a
//! reachable relay and a released port for a refusing one.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use std::fs;
use std::net::TcpListener;
use std::process::Command;
use tempfile::TempDir;

const CONFIG_VARS: &[&str] = &[
    "INPUT_FILE",
    "OUTPUT_FILE",
    "CONCURRENCY",
    "ROUND_COUNT",
    "TIMEOUT_SECONDS",
    "ENABLE_COLOR",
];

fn rlp(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rlp").unwrap();
    cmd.current_dir(dir.path()).arg("--no-color");
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// A port on loopback with nothing listening
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn test_full_run_ranks_reachable_before_failed() {
    let dir = TempDir::new().unwrap();
    let open = TcpListener::bind("127.0.0.1:0").unwrap();
    let open_port = open.local_addr().unwrap().port();
    let refused_port = closed_port();

    let input = format!(
        "127.0.0.1,{refused},Closed\n\
         127.0.0.1,{open},US, Local Relay \n\
         \n\
         999.1.1.1,443,Bad\n\
         127.0.0.1,{open},US, Local Relay \n",
        refused = refused_port,
        open = open_port
    );
    fs::write(dir.path().join("proxy.txt"), input).unwrap();

    let assert = rlp(&dir)
        .args(["--rounds", "2", "--concurrency", "2", "--timeout", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Loaded 2 endpoint(s) from 'proxy.txt' (2 skipped: 1 invalid, 1 duplicate)",
        ))
        .stdout(predicate::str::contains("--- Round 1/2 ---"))
        .stdout(predicate::str::contains("--- Round 2/2 ---"))
        .stdout(predicate::str::contains("[100.00%]"))
        .stdout(predicate::str::contains("Reachable endpoints: 1/2"))
        .stderr(predicate::str::contains("Skipped 1 invalid line(s)"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let progress = Regex::new(r"(?m)^\[\s*\d{1,3}\.\d{2}%\] Tested 127\.0\.0\.1,\d+,.*: (\d+\.\d{2} ms|Failed)$").unwrap();
    assert_eq!(progress.find_iter(&stdout).count(), 4);

    let lines = read_lines(&dir.path().join("latencyresult.txt"));
    assert_eq!(lines.len(), 2);

    let ok_line = Regex::new(&format!(r"^127\.0\.0\.1:{}#US Local Relay \d+\.\d{{2}} ms$", open_port)).unwrap();
    assert!(ok_line.is_match(&lines[0]), "unexpected first line: {}", lines[0]);
    assert_eq!(lines[1], format!("127.0.0.1:{}#Closed Failed", refused_port));
}

#[test]
fn test_default_paths_and_untagged_endpoint() {
    let dir = TempDir::new().unwrap();
    let open = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = open.local_addr().unwrap().port();
    fs::write(dir.path().join("proxy.txt"), format!("127.0.0.1,{}\n", port)).unwrap();

    rlp(&dir)
        .args(["-r", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved to 'latencyresult.txt'"));

    let lines = read_lines(&dir.path().join("latencyresult.txt"));
    let untagged = Regex::new(&format!(r"^127\.0\.0\.1:{}#\d+\.\d{{2}} ms$", port)).unwrap();
    assert!(untagged.is_match(&lines[0]), "unexpected line: {}", lines[0]);
}

#[test]
fn test_output_file_is_truncated() {
    let dir = TempDir::new().unwrap();
    let refused_port = closed_port();
    fs::write(dir.path().join("proxy.txt"), format!("127.0.0.1,{},Gone\n", refused_port)).unwrap();
    fs::write(dir.path().join("latencyresult.txt"), "old\n".repeat(50)).unwrap();

    rlp(&dir).args(["-r", "1"]).assert().success();

    assert_eq!(
        fs::read_to_string(dir.path().join("latencyresult.txt")).unwrap(),
        format!("127.0.0.1:{}#Gone Failed\n", refused_port)
    );
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();

    rlp(&dir)
        .args(["--input", "nowhere.txt"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("nowhere.txt"));

    assert!(!dir.path().join("latencyresult.txt").exists());
}

#[test]
fn test_empty_input_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("proxy.txt"), "\n\n   \n").unwrap();

    rlp(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is empty"))
        .stdout(predicate::str::contains("--- Round").not());

    assert!(!dir.path().join("latencyresult.txt").exists());
}

#[test]
fn test_all_invalid_input_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("proxy.txt"), "1.1.1.1\n1.1.1.1,0\n1.1.1,443\nhost.example,443\n").unwrap();

    rlp(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Skipped 4 invalid line(s)"))
        .stderr(predicate::str::contains("contains no valid endpoints"));

    assert!(!dir.path().join("latencyresult.txt").exists());
}

#[test]
fn test_unwritable_output_path() {
    let dir = TempDir::new().unwrap();
    let refused_port = closed_port();
    fs::write(dir.path().join("proxy.txt"), format!("127.0.0.1,{}\n", refused_port)).unwrap();
    fs::create_dir(dir.path().join("results")).unwrap();

    rlp(&dir)
        .args(["-r", "1", "-o", "results"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("results"));
}

#[test]
fn test_proxy_variables_are_ignored() {
    let dir = TempDir::new().unwrap();
    let open = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = open.local_addr().unwrap().port();
    fs::write(dir.path().join("proxy.txt"), format!("127.0.0.1,{},Direct\n", port)).unwrap();

    rlp(&dir)
        .env("HTTPS_PROXY", "http://127.0.0.1:9")
        .env("all_proxy", "socks5://127.0.0.1:9")
        .args(["-r", "1", "--debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed proxy variables"))
        .stdout(predicate::str::contains("Reachable endpoints: 1/1"));
}

#[test]
fn test_many_endpoints_with_small_pool() {
    let dir = TempDir::new().unwrap();
    let listeners: Vec<TcpListener> = (0..12).map(|_| TcpListener::bind("127.0.0.1:0").unwrap()).collect();
    let input: String = listeners
        .iter()
        .enumerate()
        .map(|(i, l)| format!("127.0.0.1,{},E{}\n", l.local_addr().unwrap().port(), i))
        .collect();
    fs::write(dir.path().join("proxy.txt"), input).unwrap();

    rlp(&dir)
        .args(["-r", "3", "-c", "3", "-t", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reachable endpoints: 12/12"))
        .stdout(predicate::str::contains("(36 of 36 probes)"));

    let lines = read_lines(&dir.path().join("latencyresult.txt"));
    assert_eq!(lines.len(), 12);
    assert!(lines.iter().all(|line| line.ends_with(" ms")));
}
