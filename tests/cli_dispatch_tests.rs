use std::fs;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_tribunal")
}

#[test]
fn demo_command_dispatches_and_emits_json() {
    let output = Command::new(bin())
        .args(["demo", "--seed", "11", "--size", "small"])
        .output()
        .expect("demo should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("demo should emit json");
    assert_eq!(payload["seed"], 11);
    assert_eq!(payload["stats"]["total_cases"], 10);
    assert!(payload["stats"]["total_committees"].as_u64().unwrap_or(0) >= 1);
}

#[test]
fn demo_is_reproducible_for_a_seed() {
    let run = || {
        let output = Command::new(bin())
            .args(["demo", "--seed", "5"])
            .output()
            .expect("demo should run");
        let payload: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("demo should emit json");
        payload["stats"].clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn demo_writes_result_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(bin())
        .args(["demo", "--output"])
        .arg(dir.path())
        .output()
        .expect("demo should run");

    assert_eq!(output.status.code(), Some(0));
    let names: Vec<String> = fs::read_dir(dir.path())
        .expect("output dir exists")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("assignments_") && n.ends_with(".csv")));
    assert!(names.iter().any(|n| n == "stats.json"));
    assert!(names.iter().any(|n| n == "warnings.json"));
}

#[test]
fn config_command_prints_default_yaml() {
    let output = Command::new(bin())
        .arg("config")
        .output()
        .expect("config should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("committee_size: 3"));
    assert!(stdout.contains("seed: 42"));
}

#[test]
fn run_command_reads_csv_inputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let availability = dir.path().join("availability.csv");
    let cases = dir.path().join("cases.csv");
    let config = dir.path().join("tribunal.yaml");
    let out = dir.path().join("out");

    let mut rows = String::from(";;;;Mon;Mon\n;;;;AM;PM\nname;email;times;weight;;\n");
    for i in 0..6 {
        rows.push_str(&format!("P{i};p{i}@x;0;0;Sí;Sí\n"));
    }
    fs::write(&availability, rows).expect("write availability");

    let mut table = String::from("entry;id;name;email;login;title;tutors;degree\n");
    for i in 0..10 {
        let tutor = format!("p{}@x", i % 6);
        table.push_str(&format!("{i};T{i};Student {i};;;;{tutor}(Tutor);GII\n"));
    }
    fs::write(&cases, table).expect("write cases");
    fs::write(
        &config,
        "engine:\n  slot_count: 2\navailability:\n  skip_trailing_sheets: 0\n",
    )
    .expect("write config");

    let output = Command::new(bin())
        .arg("run")
        .arg(&availability)
        .arg(&cases)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .arg("--archive")
        .output()
        .expect("run should start");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).expect("summary json");
    assert_eq!(payload["stats"]["total_cases"], 10);
    assert_eq!(
        payload["stats"]["cases_placed"].as_u64().unwrap_or(0)
            + payload["stats"]["unplaced_cases"].as_u64().unwrap_or(0),
        10
    );
    assert!(out.join("assignments_GII.csv").exists());
    assert!(out.join("committee_results.zip").exists());
}

#[test]
fn run_command_fails_on_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(bin())
        .args(["run", "missing-availability.xlsx", "missing-cases.xlsx", "--output"])
        .arg(dir.path())
        .output()
        .expect("run should start");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("run failed"));
}

#[test]
fn unknown_command_returns_usage() {
    let output = Command::new(bin())
        .arg("frobnicate")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
}
