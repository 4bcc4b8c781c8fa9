use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing a gradus test project.
struct GradusTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl GradusTestEnv {
    /// Fresh project directory with a config; raw CSVs are added per test.
    fn new(threshold: f64) -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();

        fs::create_dir_all(root.join("data/raw"))?;
        Self::write_config(&root, threshold)?;

        Ok(Self { _tmp: tmp, root })
    }

    fn write_config(root: &PathBuf, threshold: f64) -> Result<()> {
        let config = format!(
            "name: edu-data-platform\n\
             version: \"0.1.0\"\n\
             quality:\n\
               threshold_fail_ratio: {threshold}\n\
             pipeline:\n\
               stage_retry_count: 0\n\
               stage_retry_delay_secs: 0\n"
        );
        fs::write(root.join("gradus.yaml"), config)?;
        Ok(())
    }

    /// Semicolon-separated CSV in the UCI student layout.
    fn write_raw_csv(&self, name: &str, rows: usize, bad_rows: usize) -> Result<()> {
        let mut content = String::from("school;sex;age;absences;G1;G2;G3\n");
        for i in 0..rows {
            let g3 = if i < bad_rows { 25 } else { 8 + (i % 12) };
            content.push_str(&format!(
                "GP;{};{};{};{};{};{}\n",
                if i % 2 == 0 { "F" } else { "M" },
                15 + (i % 5),
                i % 10,
                7 + (i % 13),
                8 + (i % 12),
                g3
            ));
        }
        fs::write(self.root.join("data/raw").join(name), content)?;
        Ok(())
    }

    fn gradus(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gradus"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn runs_log(&self) -> Result<String> {
        Ok(fs::read_to_string(self.root.join("logs/runs_log.csv"))?)
    }
}

#[test]
fn test_gold_builds_parquet_from_raw_csvs() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 10, 0)?;
    env.write_raw_csv("student-por.csv", 10, 0)?;

    env.gradus()
        .arg("gold")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gold layer built (20 rows)"));

    assert!(env.root.join("data/gold/student_all.parquet").exists());
    Ok(())
}

#[test]
fn test_gold_without_raw_csvs_fails() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;

    env.gradus()
        .arg("gold")
        .assert()
        .failure()
        .stderr(predicate::str::contains("produced no artifact"));
    Ok(())
}

/// The end-to-end threshold scenario: 100 rows, 3 of them with G3 = 25.
/// failed_ratio = 0.03 -> FAIL at threshold 0.02, PASS at 0.05.
#[test]
fn test_dq_threshold_boundary_end_to_end() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 50, 3)?;
    env.write_raw_csv("student-por.csv", 50, 0)?;

    env.gradus().arg("gold").assert().success();

    // Strict threshold: FAIL, with a triage artifact
    env.gradus()
        .arg("dq")
        .assert()
        .success()
        .stdout(predicate::str::contains("FAIL"));

    let log = env.runs_log()?;
    let first_record = log.lines().nth(1).unwrap().to_string();
    assert!(first_record.contains("FAIL"));
    assert!(first_record.contains(",100,3,0.030000,"));

    // The failure detail artifact lists exactly the 3 failing rows
    let detail = fs::read_dir(env.root.join("logs"))?
        .filter_map(Result::ok)
        .find(|e| e.file_name().to_string_lossy().starts_with("dq_failures_"))
        .expect("failure detail artifact");
    let detail_content = fs::read_to_string(detail.path())?;
    assert_eq!(detail_content.lines().count(), 4); // header + 3 rows
    assert!(detail_content.lines().next().unwrap().contains("check_range_G3_0_20"));

    // Loosened tolerance: the same data passes
    GradusTestEnv::write_config(&env.root, 0.05)?;
    env.gradus()
        .arg("dq")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));

    // Append-only: two records now, the first byte-for-byte unchanged
    let log = env.runs_log()?;
    assert_eq!(log.lines().count(), 3);
    assert_eq!(log.lines().nth(1).unwrap(), first_record);
    assert!(log.lines().nth(2).unwrap().contains("PASS"));
    Ok(())
}

#[test]
fn test_full_pipeline_success() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 30, 0)?;
    env.write_raw_csv("student-por.csv", 30, 0)?;

    env.gradus()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS! Pipeline finished"));

    // All three stages materialized their artifacts
    assert!(env.root.join("data/gold/student_all.parquet").exists());
    let reports: Vec<_> = fs::read_dir(env.root.join("reports"))?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(reports.iter().any(|name| name.starts_with("report_daily_")));
    assert!(reports.iter().any(|name| name.starts_with("kpi_corr_")));
    assert!(reports.iter().any(|name| name.starts_with("kpi_percentiles_")));
    assert!(env.runs_log()?.contains("PASS"));

    // One timestamped summary artifact per run
    let summaries = fs::read_dir(env.root.join("logs"))?
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("pipeline_summary_")
        })
        .count();
    assert_eq!(summaries, 1);
    Ok(())
}

#[test]
fn test_full_pipeline_halts_on_dq_fail() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 50, 3)?;
    env.write_raw_csv("student-por.csv", 50, 0)?;

    env.gradus()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Data Quality FAIL"));

    // The verdict was still recorded before the halt
    assert!(env.runs_log()?.contains("FAIL"));
    Ok(())
}

#[test]
fn test_full_pipeline_completes_with_no_stop_on_fail() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 50, 3)?;
    env.write_raw_csv("student-por.csv", 50, 0)?;

    env.gradus()
        .args(["run", "--no-stop-on-fail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DQ: FAIL"));
    Ok(())
}

#[test]
fn test_dq_uniqueness_flag_detects_duplicates() -> Result<()> {
    let env = GradusTestEnv::new(0.5)?;
    // Duplicate the first data row so exactly one composite key repeats
    env.write_raw_csv("student-mat.csv", 10, 0)?;
    let raw = env.root.join("data/raw/student-mat.csv");
    let mut content = fs::read_to_string(&raw)?;
    let first_row = content.lines().nth(1).unwrap().to_string();
    content.push_str(&first_row);
    content.push('\n');
    fs::write(&raw, content)?;

    env.gradus().arg("gold").assert().success();

    env.gradus()
        .args(["dq", "--enable-uniqueness"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unique_student_key"));

    // 11 rows, 1 duplicate: the second occurrence alone fails
    let log = env.runs_log()?;
    let record = log.lines().nth(1).unwrap();
    assert!(record.contains(",11,1,0.090909,"));
    assert!(record.ends_with("true"));
    Ok(())
}

#[test]
fn test_history_renders_the_audit_table() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 10, 0)?;

    env.gradus().arg("gold").assert().success();
    env.gradus().arg("dq").assert().success();

    env.gradus()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("run_ts"))
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("1 run(s) total"));
    Ok(())
}

#[test]
fn test_clean_preserves_the_runs_log() -> Result<()> {
    let env = GradusTestEnv::new(0.02)?;
    env.write_raw_csv("student-mat.csv", 10, 0)?;

    env.gradus().arg("gold").assert().success();
    env.gradus().arg("dq").assert().success();

    env.gradus().arg("clean").assert().success();

    assert!(!env.root.join("data/gold").exists());
    assert!(env.root.join("logs/runs_log.csv").exists());
    Ok(())
}
