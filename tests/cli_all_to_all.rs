use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "anasim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

const RING3: &str =
    r#"{ "topology": ["Ring"], "npus_count": [3], "bandwidth": [10.0], "latency": [1.0] }"#;

const RING3_MATRIX: &str = "0 100 100\n100 0 100\n100 100 0\n";

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_all_to_all"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run all_to_all")
}

#[test]
fn all_to_all_prints_summary() {
    let dir = unique_temp_dir("a2a-text");
    let network = write_file(&dir, "network.json", RING3);
    let matrix = write_file(&dir, "matrix.txt", RING3_MATRIX);

    let output = run(&[
        "--network",
        network.to_str().unwrap(),
        "--matrix",
        matrix.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "all_to_all failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total NPUs Count: 3"), "stdout: {stdout}");
    assert!(stdout.contains("Total devices Count: 3"), "stdout: {stdout}");
    assert!(
        stdout.contains("Simulation finished at time: 11 ns"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("delivered_chunks=6"), "stdout: {stdout}");
}

#[test]
fn all_to_all_json_summary_on_switch() {
    let dir = unique_temp_dir("a2a-json");
    let network = write_file(
        &dir,
        "network.json",
        r#"{ "topology": ["Switch"], "npus_count": [2], "bandwidth": [10.0], "latency": [2.0] }"#,
    );
    let matrix = write_file(&dir, "matrix.txt", "0 100\n0 0\n");

    let output = run(&[
        "--network",
        network.to_str().unwrap(),
        "--matrix",
        matrix.to_str().unwrap(),
        "--json",
    ]);
    assert!(
        output.status.success(),
        "all_to_all failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().expect("json line");
    let v: Value = serde_json::from_str(line).expect("summary json");
    assert_eq!(v["npus_count"], 2);
    assert_eq!(v["devices_count"], 3);
    // 两跳 store-and-forward：2 * (100/10 + 2)
    assert_eq!(v["finish_time_ns"], 24);
    assert_eq!(v["delivered_chunks"], 1);
    assert_eq!(v["delivered_bytes"], 100);
    assert_eq!(v["rejected"], 0);
}

#[test]
fn all_to_all_sharing_override() {
    let dir = unique_temp_dir("a2a-sharing");
    let network = write_file(&dir, "network.json", RING3);
    let matrix = write_file(&dir, "matrix.txt", RING3_MATRIX);

    let ok = run(&[
        "--network",
        network.to_str().unwrap(),
        "--matrix",
        matrix.to_str().unwrap(),
        "--sharing",
        "max-min",
    ]);
    assert!(ok.status.success());

    let bad = run(&[
        "--network",
        network.to_str().unwrap(),
        "--matrix",
        matrix.to_str().unwrap(),
        "--sharing",
        "lottery",
    ]);
    assert_eq!(bad.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("unknown sharing policy"));
}

#[test]
fn all_to_all_rejects_multi_dim_network() {
    let dir = unique_temp_dir("a2a-dims");
    let network = write_file(
        &dir,
        "network.json",
        r#"{ "topology": ["Ring", "Switch"], "npus_count": [4, 2], "bandwidth": [10, 10], "latency": [1, 1] }"#,
    );
    let matrix = write_file(&dir, "matrix.txt", "0 1\n1 0\n");

    let output = run(&[
        "--network",
        network.to_str().unwrap(),
        "--matrix",
        matrix.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("[Error] only support 1-dim topology"),
        "stderr: {stderr}"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn all_to_all_rejects_matrix_size_mismatch() {
    let dir = unique_temp_dir("a2a-mismatch");
    let network = write_file(&dir, "network.json", RING3);
    let matrix = write_file(&dir, "matrix.txt", "0 1\n1 0\n");

    let output = run(&[
        "--network",
        network.to_str().unwrap(),
        "--matrix",
        matrix.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("covers 2 devices"), "stderr: {stderr}");
}
