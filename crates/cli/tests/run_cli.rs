// Integration tests for the `pairmatch` binary.
// Run with: cargo test -p pairmatch-cli --test run_cli

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use httpmock::prelude::*;
use pairmatch_core::{Cell, ColumnLayout, Table};
use pairmatch_io::Workbook;
use tempfile::TempDir;

fn pairmatch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pairmatch"));
    // Clear env to avoid leaking a real key or settings into tests
    cmd.env_remove("PAIRMATCH_API_KEY");
    cmd.env_remove("OPENAI_API_KEY");
    cmd.env_remove("PAIRMATCH_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {}, got {:?}\nstderr: {}",
        code,
        output.status.code(),
        stderr(output),
    );
}

/// Settings with no inter-row delay; extra TOML appended verbatim.
fn write_settings(dir: &TempDir, extra: &str) -> PathBuf {
    let path = dir.path().join("settings.toml");
    fs::write(&path, format!("delay_ms = 0\n{extra}")).unwrap();
    path
}

/// One CSV line with D..G, K and L filled in.
fn csv_line(fields: [&str; 4], status: &str, instruction: &str) -> String {
    let mut cols = vec![String::new(); 12];
    cols[3] = fields[0].to_string();
    cols[4] = fields[1].to_string();
    cols[5] = fields[2].to_string();
    cols[6] = fields[3].to_string();
    cols[10] = status.to_string();
    cols[11] = instruction.to_string();
    cols.join(",")
}

fn sample_csv(dir: &TempDir) -> PathBuf {
    let lines = [
        csv_line(["Product A", "Product B", "Publisher A", "Publisher B"], "Status", "Instruction"),
        csv_line(["Adobe Photoshop", "adobe photoshop ", "Adobe Inc.", "Adobe Inc."], "", "Compare"),
        csv_line(["Zoom", "Slack", "Zoom Video", "Zoom Video"], "", "Compare"),
        csv_line(["Vim", "Vim", "Bram", "Bram"], "Not Match", "Compare"),
        csv_line(["Git", "Git", "SFC", "SFC"], "", ""),
    ];
    let path = dir.path().join("pairs.csv");
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn status_column(path: &Path) -> Vec<Option<String>> {
    let workbook = pairmatch_io::load(path, None).unwrap();
    let table = workbook.active();
    let status = ColumnLayout::default().status;
    (0..table.height()).map(|r| table.text(r, status)).collect()
}

#[test]
fn exact_run_writes_verdicts_in_place() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let input = sample_csv(&dir);

    let output = pairmatch()
        .args(["run", input.to_str().unwrap(), "--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 0);
    assert!(stderr(&output).contains("match:"));

    let statuses = status_column(&input);
    assert_eq!(statuses[0].as_deref(), Some("Status"));
    assert_eq!(statuses[1].as_deref(), Some("Match"));
    assert_eq!(statuses[2].as_deref(), Some("Not Match"));
    // Already processed: untouched even though the pair is identical
    assert_eq!(statuses[3].as_deref(), Some("Not Match"));
    // No instruction: untouched
    assert_eq!(statuses[4], None);
}

#[test]
fn rerun_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let input = sample_csv(&dir);
    let args = ["run", input.to_str().unwrap(), "--config", settings.to_str().unwrap(), "--json"];

    assert_code(&pairmatch().args(args).output().unwrap(), 0);
    let after_first = fs::read(&input).unwrap();

    let second = pairmatch().args(args).output().unwrap();
    assert_code(&second, 0);
    assert_eq!(fs::read(&input).unwrap(), after_first);

    let report: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert_eq!(report["saved"], false);
    assert_eq!(report["summary"]["matched"], 0);
    assert_eq!(report["summary"]["already_done"], 3);
    assert_eq!(report["summary"]["no_instruction"], 1);
}

#[test]
fn dry_run_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let input = sample_csv(&dir);
    let before = fs::read(&input).unwrap();

    let output = pairmatch()
        .args(["run", input.to_str().unwrap(), "--config", settings.to_str().unwrap()])
        .args(["--dry-run", "--json"])
        .output()
        .unwrap();
    assert_code(&output, 0);
    assert_eq!(fs::read(&input).unwrap(), before);

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["summary"]["matched"], 1);
    assert_eq!(report["summary"]["not_matched"], 1);
}

#[test]
fn limit_leaves_later_rows_pending() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let input = sample_csv(&dir);

    let output = pairmatch()
        .args(["run", input.to_str().unwrap(), "--config", settings.to_str().unwrap()])
        .args(["--limit", "1"])
        .output()
        .unwrap();
    assert_code(&output, 0);

    let statuses = status_column(&input);
    assert_eq!(statuses[1].as_deref(), Some("Match"));
    assert_eq!(statuses[2], None);
}

#[test]
fn ai_without_key_exits_11_before_reading_input() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let missing = dir.path().join("does-not-exist.xlsx");

    let output = pairmatch()
        .args(["run", missing.to_str().unwrap(), "--strategy", "ai"])
        .args(["--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 11);
    let err = stderr(&output);
    assert!(err.contains("PAIRMATCH_API_KEY"), "stderr: {}", err);
}

#[test]
fn missing_input_exits_3() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let missing = dir.path().join("nope.csv");

    let output = pairmatch()
        .args(["run", missing.to_str().unwrap(), "--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 3);
}

#[test]
fn unknown_sheet_exits_3() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let input = dir.path().join("batch.xlsx");
    let mut table = Table::new("Batch 5");
    table.set(0, 3, Cell::text("Product A"));
    pairmatch_io::save(&Workbook::single(table), &input).unwrap();

    let output = pairmatch()
        .args(["run", input.to_str().unwrap(), "--sheet", "Batch 9"])
        .args(["--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 3);
    assert!(stderr(&output).contains("Batch 5"));
}

#[test]
fn read_only_output_format_exits_4() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "");
    let input = sample_csv(&dir);
    let out = dir.path().join("out.ods");

    let output = pairmatch()
        .args(["run", input.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .args(["--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 4);
    assert!(!out.exists());
}

#[test]
fn invalid_settings_exit_5() {
    let dir = TempDir::new().unwrap();
    let settings = write_settings(&dir, "[columns]\nstatus = \"L\"\n");
    let input = sample_csv(&dir);

    let output = pairmatch()
        .args(["run", input.to_str().unwrap(), "--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 5);
}

#[test]
fn ai_run_against_mock_endpoint() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("Authorization", "Bearer sk-test")
            .body_includes("Item A: Zoom by Zoom Video");
        then.status(200).json_body(serde_json::json!({
            "choices": [{ "message": { "content":
                "5) Conclusion\n- Brand: Same\n- Product: Different\n\nFinal result: Not same" } }]
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(serde_json::json!({
            "choices": [{ "message": { "content":
                "**Conclusion**\n- **Brand:** Same\n- **Product:** Same\n\nFinal result: Same" } }]
        }));
    });

    let dir = TempDir::new().unwrap();
    let settings = write_settings(
        &dir,
        &format!("[ai]\nendpoint = \"{}/v1\"\n", server.base_url()),
    );
    let input = sample_csv(&dir);
    let out = dir.path().join("checked.xlsx");

    let output = pairmatch()
        .env("PAIRMATCH_API_KEY", "sk-test")
        .args(["run", input.to_str().unwrap(), "--strategy", "ai"])
        .args(["--output", out.to_str().unwrap()])
        .args(["--config", settings.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 0);

    let workbook = pairmatch_io::load(&out, None).unwrap();
    let table = workbook.active();
    let layout = ColumnLayout::default();
    assert_eq!(table.text(1, layout.status).as_deref(), Some("Match"));
    assert_eq!(table.text(2, layout.status).as_deref(), Some("Not Match"));
    let report = table.text(2, layout.report.unwrap()).unwrap();
    assert!(report.contains("Product: Different"));
    // Input untouched when --output is given
    assert_eq!(status_column(&input)[1], None);
}

#[test]
fn parse_reads_stdin() {
    let mut child = pairmatch()
        .args(["parse", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"... Conclusion\n- Brand: Same\n- Product: Different\n\nFinal result: Not same")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_code(&output, 0);

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["brand"], "Same");
    assert_eq!(parsed["product"], "Different");
    assert_eq!(parsed["final_result"], "Not same");
    assert_eq!(parsed["verdict"], "Not Match");
}

#[test]
fn init_config_then_doctor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf").join("settings.toml");

    let output = pairmatch()
        .args(["init-config", "--path", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&output, 0);
    assert!(path.exists());

    // Second write without --force is refused
    let again = pairmatch()
        .args(["init-config", "--path", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&again, 2);

    let doctor = pairmatch()
        .env("PAIRMATCH_API_KEY", "sk-never-printed")
        .args(["doctor", "--json", "--config", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_code(&doctor, 0);
    let stdout = String::from_utf8_lossy(&doctor.stdout);
    assert!(!stdout.contains("sk-never-printed"));

    let diag: serde_json::Value = serde_json::from_slice(&doctor.stdout).unwrap();
    assert_eq!(diag["strategy"], "exact");
    assert_eq!(diag["columns"]["status"], "K");
    assert_eq!(diag["ai"]["key_present"], true);
    assert_eq!(diag["ai"]["key_var"], "PAIRMATCH_API_KEY");
}
