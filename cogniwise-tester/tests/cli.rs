use std::hash::Hasher;
use std::process::Command;
use twox_hash::XxHash64;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "cogniwise-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn run_csv(label: &str, extra: &[&str]) -> String {
    let exe = env!("CARGO_BIN_EXE_cogniwise-tester");
    let output_path = temp_path(label);
    let output = Command::new(exe)
        .args(["--fast", "--report", "csv", "--iterations", "1", "--output"])
        .arg(&output_path)
        .args(extra)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    std::fs::read_to_string(output_path).expect("read output")
}

fn digest(text: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(text.as_bytes());
    hasher.finish()
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_cogniwise-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("inattentive-high-risk"));
}

#[test]
fn cli_json_report_covers_requested_bands() {
    let exe = env!("CARGO_BIN_EXE_cogniwise-tester");
    let output_path = temp_path("json");
    let output = Command::new(exe)
        .args([
            "--fast",
            "--report",
            "json",
            "--scenarios",
            "attentive-low-risk,inattentive-high-risk",
            "--bands",
            "child,elderly",
            "--iterations",
            "1",
            "--seeds",
            "3",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cogniwise Level-2 Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let results: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = results.as_array().expect("array");
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_csv_report_is_reproducible() {
    let args = ["--bands", "adult", "--profiles", "typical,random", "--seeds", "5..=6"];
    let first = run_csv("csv-a", &args);
    let second = run_csv("csv-b", &args);
    assert_eq!(first.lines().count(), 5);
    assert_eq!(digest(&first), digest(&second));
}

#[test]
fn cli_rejects_unknown_band() {
    let exe = env!("CARGO_BIN_EXE_cogniwise-tester");
    let output = Command::new(exe)
        .args(["--bands", "teen", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown age band"));
}
