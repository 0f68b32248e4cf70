use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;

fn memoria() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("memoria"));
    cmd.args(["--config", "/nonexistent/memoria/config.toml"]);
    cmd
}

#[test]
fn test_cli_help() {
    memoria()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Memoria"));
}

#[test]
fn test_cli_version() {
    memoria().arg("--version").assert().success();
}

#[test]
fn test_extract_from_stdin() {
    memoria()
        .args(["--format", "json", "extract"])
        .write_stdin(
            "<observations>\n* 🔴 (10:00) User stated they like tea\n</observations>\n<current-task>brew</current-task>",
        )
        .assert()
        .success()
        .stdout(contains("\"currentTask\": \"brew\""))
        .stdout(contains("User stated they like tea"));
}

#[test]
fn test_extract_reflector_passthrough() {
    memoria()
        .args(["extract", "--source", "reflector"])
        .write_stdin("plain prose summary")
        .assert()
        .success()
        .stdout(contains("plain prose summary"));
}

#[test]
fn test_extract_threads() {
    memoria()
        .args(["--format", "json", "extract-threads"])
        .write_stdin(
            "<observations>\n<thread id=\"t1\">X</thread>\n<thread id=\"t2\">Y</thread>\n</observations>",
        )
        .assert()
        .success()
        .stdout(contains("\"attributed\": true"))
        .stdout(contains("\"t2\""));
}

#[test]
fn test_extract_threads_fallback() {
    memoria()
        .args(["--format", "json", "extract-threads"])
        .write_stdin("<observations>\n* 🔴 (10:00) flat\n</observations>")
        .assert()
        .success()
        .stdout(contains("\"attributed\": false"));
}

#[test]
fn test_optimize_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "* 🟡 (10:00) detail [tag]\n* 🔴 (10:01) key fact").unwrap();

    memoria()
        .arg("optimize")
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("* (10:00) detail"))
        .stdout(contains("* 🔴 (10:01) key fact"))
        .stdout(contains("[tag]").not());
}

#[test]
fn test_format_single_thread() {
    memoria()
        .args(["format", "--max-part-length", "4"])
        .write_stdin(r#"[{"role": "user", "createdAt": "2025-12-04T14:30:00Z", "content": "abcdefgh"}]"#)
        .assert()
        .success()
        .stdout(contains("**User (Dec 4, 2025, 2:30 PM):**\nabcd\n... [truncated 4 characters]"));
}

#[test]
fn test_format_multi_thread_order() {
    memoria()
        .args(["format", "--thread-order", "b,a"])
        .write_stdin(
            r#"{"a": [{"role": "user", "content": "from a"}], "b": [{"role": "assistant", "content": "from b"}]}"#,
        )
        .assert()
        .success()
        .stdout(contains(
            "<thread id=\"b\">\n**Assistant:**\nfrom b\n</thread>\n\n<thread id=\"a\">",
        ));
}

#[test]
fn test_format_rejects_bad_json() {
    memoria()
        .arg("format")
        .write_stdin("not json")
        .assert()
        .failure();
}

#[test]
fn test_stats_json() {
    memoria()
        .args(["--format", "json", "stats"])
        .write_stdin("日期：2025年12月4日\n* 🔴 (10:00) a\n* 🟢 (10:05) b\n  * -> c")
        .assert()
        .success()
        .stdout(contains("\"high\": 1"))
        .stdout(contains("\"low\": 1"))
        .stdout(contains("\"sub_lines\": 1"));
}

#[test]
fn test_prompt_variant_flag() {
    memoria()
        .args(["prompt", "reflector", "--variant", "condensed"])
        .assert()
        .success()
        .stdout(contains("观察反思者"));
}

#[test]
fn test_prompt_unknown_variant_fails() {
    memoria()
        .args(["prompt", "observer", "--variant", "bogus"])
        .assert()
        .failure()
        .stderr(contains("unknown prompt variant"));
}
