use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn fencrypt() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fencrypt"))
}

fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // The child may exit without reading stdin.
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

fn paths(dir: &Path) -> [std::path::PathBuf; 3] {
    [dir.join("in.txt"), dir.join("out.txt"), dir.join("log.txt")]
}

#[test]
fn test_wrong_argument_count_exits_1() {
    let output = fencrypt().arg("only-one").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));

    let output = fencrypt().args(["a", "b", "c", "d"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_encrypts_with_capacities_from_options() {
    let dir = tempfile::tempdir().unwrap();
    let [input, output, log] = paths(dir.path());
    fs::write(&input, "Hello, World!").unwrap();

    let result = fencrypt()
        .args([&input, &output, &log])
        .args(["--input-capacity", "2", "--output-capacity", "3"])
        .output()
        .unwrap();
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("End of file reached."));

    // Key 1: forward, backward, forward, ... over letters only.
    assert_eq!(fs::read_to_string(&output).unwrap(), "Idmkp, Vpqmc!");
    let log_text = fs::read_to_string(&log).unwrap();
    assert!(log_text.starts_with("Total input count with current key is 13\n"));
    assert!(log_text.contains("Total output count with current key is 13\n"));
    assert!(log_text.contains("H:1 W:1 d:1 e:1 l:3 o:2 r:1"));
}

#[test]
fn test_prompts_until_capacity_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let [input, output, log] = paths(dir.path());
    fs::write(&input, "abc").unwrap();

    let mut cmd = fencrypt();
    cmd.args([&input, &output, &log]).args(["--key", "2"]);
    let result = run_with_stdin(cmd, "0\nbogus\n4\n1\n");
    assert!(result.status.success());

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Enter buffer size for the input: "));
    assert!(stdout.contains("Enter buffer size for the output: "));
    assert_eq!(
        stdout.matches("Invalid buffer, must be greater than 0").count(),
        2
    );
    assert_eq!(fs::read_to_string(&output).unwrap(), "cze");
}

#[test]
fn test_prompt_eof_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let [input, output, log] = paths(dir.path());
    fs::write(&input, "abc").unwrap();

    let mut cmd = fencrypt();
    cmd.args([&input, &output, &log]);
    let result = run_with_stdin(cmd, "5\n");
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).starts_with("fencrypt: "));
}

#[test]
fn test_missing_input_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let [input, output, log] = paths(dir.path());

    let result = fencrypt()
        .args([&input, &output, &log])
        .args(["--input-capacity", "1", "--output-capacity", "1"])
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert_eq!(
        stderr,
        format!("fencrypt: {}: No such file or directory\n", input.display())
    );
}

#[test]
fn test_output_is_directory_reports_once() {
    let dir = tempfile::tempdir().unwrap();
    let [input, _, log] = paths(dir.path());
    fs::write(&input, "abc").unwrap();

    let result = fencrypt()
        .args([&input, dir.path(), &log])
        .args(["--input-capacity", "1", "--output-capacity", "1"])
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with(&format!("fencrypt: {}: ", dir.path().display())));
    assert!(!stderr.contains("os error"));
    assert_eq!(stderr.lines().count(), 1);
    assert_eq!(stderr.matches("Is a directory").count(), 1);
}

#[test]
fn test_bad_path_fails_before_prompting() {
    let dir = tempfile::tempdir().unwrap();
    let [input, output, log] = paths(dir.path());

    let mut cmd = fencrypt();
    cmd.args([&input, &output, &log]);
    let result = run_with_stdin(cmd, "4\n4\n");
    assert_eq!(result.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&result.stdout).contains("Enter buffer size"));
    assert!(String::from_utf8_lossy(&result.stderr).contains("in.txt"));
}

#[test]
fn test_periodic_rekey_keeps_every_byte() {
    let dir = tempfile::tempdir().unwrap();
    let [input, output, log] = paths(dir.path());
    let text = "the quick brown fox jumps over the lazy dog\n".repeat(200);
    fs::write(&input, &text).unwrap();

    let result = fencrypt()
        .args([&input, &output, &log])
        .args(["--input-capacity", "4", "--output-capacity", "4"])
        .args(["--reset-every", "1"])
        .output()
        .unwrap();
    assert!(result.status.success());

    let encrypted = fs::read(&output).unwrap();
    assert_eq!(encrypted.len(), text.len());
    // Non-letters are never touched, whatever the key.
    for (plain, cipher) in text.bytes().zip(encrypted) {
        if !plain.is_ascii_alphabetic() {
            assert_eq!(plain, cipher);
        }
    }
}
