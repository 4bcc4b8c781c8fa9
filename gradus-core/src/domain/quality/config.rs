// gradus-core/src/domain/quality/config.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QualityConfig {
    /// A run FAILs when failed_rows / rows strictly exceeds this ratio.
    #[serde(default = "default_threshold")]
    pub threshold_fail_ratio: f64,

    #[serde(default)]
    pub enable_uniqueness: bool,

    /// Ordered columns feeding the composite student key digest.
    #[serde(default = "default_id_columns")]
    pub id_columns: Vec<String>,

    /// Declarative rules. Empty means the built-in student catalogue.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            threshold_fail_ratio: default_threshold(),
            enable_uniqueness: false,
            id_columns: default_id_columns(),
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuleSpec {
    /// Overrides the derived rule name when set.
    pub name: Option<String>,
    pub check: CheckKind,
    pub column: String,

    // Bounds, only meaningful for `check: range`
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    NotNull,
    Range,
    NonNegative,
}

fn default_threshold() -> f64 {
    0.02 // 2 %
}

fn default_id_columns() -> Vec<String> {
    ["school", "sex", "age", "subject", "G1", "G2", "G3", "absences"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QualityConfig::default();
        assert_eq!(config.threshold_fail_ratio, 0.02);
        assert!(!config.enable_uniqueness);
        assert_eq!(config.id_columns.len(), 8);
        assert_eq!(config.id_columns[0], "school");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let config: QualityConfig =
            serde_yaml::from_str("threshold_fail_ratio: 0.05\nenable_uniqueness: true\n").unwrap();
        assert_eq!(config.threshold_fail_ratio, 0.05);
        assert!(config.enable_uniqueness);
        // Unspecified fields fall back to the defaults
        assert_eq!(config.id_columns.len(), 8);
    }

    #[test]
    fn test_deserialize_rule_specs() {
        let yaml = r#"
rules:
  - check: range
    column: G3
    min: 0
    max: 20
  - check: not_null
    column: school
"#;
        let config: QualityConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].check, CheckKind::Range);
        assert_eq!(config.rules[0].max, Some(20.0));
        assert_eq!(config.rules[1].check, CheckKind::NotNull);
    }
}
