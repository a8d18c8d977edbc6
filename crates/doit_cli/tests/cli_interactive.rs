use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("doit-{nanos}-{name}"))
}

fn run_interactive(input: &str) -> std::process::Output {
    run_interactive_bytes(input.as_bytes())
}

fn run_interactive_bytes(input: &[u8]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_doit");
    let store_dir = temp_dir("cli-interactive");

    let mut child = Command::new(exe)
        .env("DOIT_STORE_DIR", &store_dir)
        .env("DOIT_CONFIG_PATH", store_dir.join("missing-config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input)
            .expect("failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("failed to read interactive output");

    std::fs::remove_dir_all(&store_dir).ok();
    output
}

#[test]
fn interactive_help_shows_usage() {
    let output = run_interactive("help\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_question_mark_shows_usage() {
    let output = run_interactive("?\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_invalid_command_prints_error() {
    let output = run_interactive("nope\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn interactive_add_command_succeeds() {
    let output = run_interactive("add \"demo task\"\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: demo task"));
}

#[test]
fn interactive_session_keeps_state_between_commands() {
    let output = run_interactive("add \"Drink water\"\nlist --json\nstats --json\nquit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"text\":\"Drink water\""));
    assert!(stdout.contains("\"active\":1"));
}

#[test]
fn interactive_clear_confirmation_reads_next_line() {
    let output = run_interactive("history clear\nno\nexit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cancelled"));
}

#[test]
fn interactive_errors_do_not_end_session() {
    let output = run_interactive("done 42\nadd after\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
    assert!(stdout.contains("Added task: after"));
}

#[test]
fn interactive_invalid_utf8_line_does_not_end_session() {
    let output = run_interactive_bytes(b"add one\n\xff\xfe\nadd two\nexit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stderr.contains("ERROR: invalid_input - line is not valid UTF-8"));
    assert!(stdout.contains("Added task: one"));
    assert!(stdout.contains("Added task: two"));
}
