// gradus-core/src/infrastructure/config/project.rs

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::pipeline::PipelineConfig;
use crate::domain::quality::QualityConfig;
use crate::infrastructure::error::InfrastructureError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(rename = "config-paths", default = "default_config_paths")]
    pub config_paths: Vec<String>,

    #[serde(rename = "raw-path", default = "default_raw_path")]
    pub raw_path: String,

    #[serde(rename = "gold-path", default = "default_gold_path")]
    pub gold_path: String,

    #[serde(rename = "reports-path", default = "default_reports_path")]
    pub reports_path: String,

    #[serde(rename = "logs-path", default = "default_logs_path")]
    pub logs_path: String,

    // The logs dir is deliberately not a clean target: the runs log is an
    // append-only audit trail.
    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[serde(default)]
    pub quality: QualityConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ProjectConfig {
    pub fn gold_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.gold_path)
    }
    pub fn raw_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.raw_path)
    }
    pub fn reports_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.reports_path)
    }
    pub fn logs_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.logs_path)
    }
}

// --- LOADER ---

// No environment-variable layering here: every toggle flows through this
// struct, passed explicitly to the gate and the orchestrator.
#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Chargement YAML Base
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Hydratation des Satellites (Fail-Secure)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            // Ici, si une erreur survient, on propage avec '?'
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["gradus_project_conf.yaml", "gradus.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

// --- LOGIQUE GÉNÉRIQUE ---

/// Charge un fragment de configuration typé depuis un fichier.
fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(Into::into)
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    // Quality rules fragment, overrides the inline section when present
    let qual_path = config_dir.join("quality.yml");
    if qual_path.exists() {
        #[derive(Deserialize)]
        struct QualityWrapper {
            quality: QualityConfig,
        }

        let wrapper: QualityWrapper = load_fragment(&qual_path)?;
        config.quality = wrapper.quality;
        info!("  ✅ Quality rules loaded");
    }

    Ok(())
}

fn default_config_paths() -> Vec<String> {
    vec!["config".to_string()]
}
fn default_raw_path() -> String {
    "data/raw".to_string()
}
fn default_gold_path() -> String {
    "data/gold".to_string()
}
fn default_reports_path() -> String {
    "reports".to_string()
}
fn default_logs_path() -> String {
    "logs".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["data/gold".to_string(), "reports".to_string()]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    const MINIMAL: &str = "name: edu-data-platform\nversion: \"0.1.0\"\n";

    #[test]
    fn test_load_minimal_config_with_defaults() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("gradus.yaml"), MINIMAL)?;

        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "edu-data-platform");
        assert_eq!(config.gold_path, "data/gold");
        assert_eq!(config.logs_path, "logs");
        assert_eq!(config.quality.threshold_fail_ratio, 0.02);
        assert!(config.pipeline.stop_on_fail);
        assert_eq!(config.clean_targets, vec!["data/gold", "reports"]);
        Ok(())
    }

    #[test]
    fn test_main_conf_takes_precedence() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("gradus_project_conf.yaml"),
            "name: primary\nversion: \"1\"\n",
        )?;
        fs::write(dir.path().join("gradus.yaml"), "name: secondary\nversion: \"1\"\n")?;

        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "primary");
        Ok(())
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = tempdir().unwrap();
        let result = load_project_config(dir.path());
        assert!(matches!(
            result,
            Err(InfrastructureError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_satellite_quality_override() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("gradus.yaml"), MINIMAL)?;
        fs::create_dir(dir.path().join("config"))?;
        fs::write(
            dir.path().join("config/quality.yml"),
            "quality:\n  threshold_fail_ratio: 0.1\n  enable_uniqueness: true\n",
        )?;

        let config = load_project_config(dir.path())?;
        assert_eq!(config.quality.threshold_fail_ratio, 0.1);
        assert!(config.quality.enable_uniqueness);
        Ok(())
    }

    #[test]
    fn test_inline_quality_and_pipeline_sections() -> Result<()> {
        let dir = tempdir()?;
        let yaml = r#"
name: edu-data-platform
version: "0.1.0"
quality:
  threshold_fail_ratio: 0.05
pipeline:
  stop_on_fail: false
  stage_retry_count: 0
"#;
        fs::write(dir.path().join("gradus.yaml"), yaml)?;

        let config = load_project_config(dir.path())?;
        assert_eq!(config.quality.threshold_fail_ratio, 0.05);
        assert!(!config.pipeline.stop_on_fail);
        assert_eq!(config.pipeline.stage_retry_count, 0);
        Ok(())
    }
}
