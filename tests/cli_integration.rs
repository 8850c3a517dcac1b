// CLI integration tests for the peel/flatten flows.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_husk");
    Command::new(exe)
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

fn stdout_json(output: &std::process::Output) -> Value {
    parse_json(std::str::from_utf8(&output.stdout).expect("utf8").trim())
}

fn stderr_lines(output: &std::process::Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(parse_json)
        .collect()
}

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> std::process::Output {
    let mut child = cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(stdin)
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

#[test]
fn peel_inline_envelope() {
    let output = cmd()
        .args(["peel", "{\"data\": \"[\\\"1\\\", \\\"{\\\\\\\"a\\\\\\\":1}\\\", \\\"plain\\\"]\"}"])
        .output()
        .expect("peel");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), parse_json("[1,{\"a\":1},\"plain\"]"));
}

#[test]
fn peel_keeps_undecodable_payload() {
    let output = cmd()
        .args(["peel", "{\"data\": \"not valid json\"}"])
        .output()
        .expect("peel");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), Value::String("not valid json".to_string()));
}

#[test]
fn peel_malformed_envelope_exits_parse() {
    let output = cmd().args(["peel", "{not json"]).output().expect("peel");
    assert_eq!(output.status.code().unwrap(), 3);
    let errors = stderr_lines(&output);
    let error = errors[0].get("error").expect("error object");
    assert_eq!(error.get("kind").and_then(|v| v.as_str()), Some("Parse"));
}

#[test]
fn peel_file_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("envelope.json");
    std::fs::write(&path, "{\"data\": \"{\\\"x\\\": 1}\"}").expect("write");

    let output = cmd()
        .args(["peel", "--file", path.to_str().unwrap()])
        .output()
        .expect("peel");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), parse_json("{\"x\":1}"));
}

#[test]
fn peel_missing_file_exits_io() {
    let output = cmd()
        .args(["peel", "--file", "/no/such/input.json"])
        .output()
        .expect("peel");
    assert_eq!(output.status.code().unwrap(), 4);
    let errors = stderr_lines(&output);
    let error = errors[0].get("error").expect("error object");
    assert_eq!(error.get("kind").and_then(|v| v.as_str()), Some("Io"));
    assert!(error.get("path").is_some());
}

#[test]
fn peel_jsonl_skip_emits_notice_and_good_records() {
    let stdin = b"{\"data\": 1}\nnot-json\n{\"data\": 2}\n";
    let output = run_with_stdin(["peel", "--in", "jsonl", "--errors", "skip"].as_slice(), stdin);
    assert!(output.status.success());

    let values: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(parse_json)
        .collect();
    assert_eq!(values, vec![parse_json("1"), parse_json("2")]);

    let notices = stderr_lines(&output);
    let notice = notices[0].get("notice").expect("notice object");
    assert_eq!(notice.get("kind").and_then(|v| v.as_str()), Some("skip"));
    assert_eq!(notice.get("cmd").and_then(|v| v.as_str()), Some("peel"));
    assert_eq!(notice["details"]["record"], parse_json("2"));
}

#[test]
fn peel_jsonl_stop_fails_on_first_bad_record() {
    let stdin = b"not-json\n{\"data\": 1}\n";
    let output = run_with_stdin(["peel", "--in", "jsonl"].as_slice(), stdin);
    assert_eq!(output.status.code().unwrap(), 3);
    let errors = stderr_lines(&output);
    assert_eq!(
        errors[0]["error"]["record"],
        parse_json("1"),
        "stop policy reports the failing record"
    );
}

#[test]
fn peel_auto_stdin_single_envelope() {
    let stdin = b"{\n  \"data\": \"[\\\"1\\\"]\"\n}\n";
    let output = run_with_stdin(["peel"].as_slice(), stdin);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), parse_json("[1]"));
}

#[test]
fn flatten_inline_batches() {
    let output = cmd()
        .args([
            "flatten",
            "[{\"batch_num\":1,\"result\":\"[{\\\"is_valid\\\":true,\\\"sentiment\\\":\\\"positive\\\"}]\"}]",
        ])
        .output()
        .expect("flatten");
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        parse_json("[{\"is_valid\":true,\"keywords\":[],\"sentiment\":\"positive\"}]")
    );
}

#[test]
fn flatten_rejects_non_array_input() {
    let output = cmd()
        .args(["flatten", "{\"result\": []}"])
        .output()
        .expect("flatten");
    assert_eq!(output.status.code().unwrap(), 3);
    let errors = stderr_lines(&output);
    let error = errors[0].get("error").expect("error object");
    assert_eq!(error.get("kind").and_then(|v| v.as_str()), Some("Parse"));
    assert!(error.get("hint").is_some());
}

#[test]
fn version_emits_json() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("husk"));
    assert!(value.get("version").is_some());
}

#[test]
fn bare_invocation_exits_usage() {
    let output = cmd().output().expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
}

#[test]
fn unknown_flag_exits_usage_with_json_error() {
    let output = cmd().args(["peel", "--bogus"]).output().expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
    let errors = stderr_lines(&output);
    let error = errors[0].get("error").expect("error object");
    assert_eq!(error.get("kind").and_then(|v| v.as_str()), Some("Usage"));
}
