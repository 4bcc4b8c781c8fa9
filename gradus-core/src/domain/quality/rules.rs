// gradus-core/src/domain/quality/rules.rs

use std::collections::{BTreeMap, HashSet};

use crate::domain::quality::config::{CheckKind, QualityConfig, RuleSpec};
use crate::domain::quality::key::composite_key;
use crate::domain::snapshot::{Scalar, Snapshot};

/// A named, executable validation rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub check: RuleCheck,
}

#[derive(Debug, Clone)]
pub enum RuleCheck {
    NotNull { column: String },
    Range { column: String, min: f64, max: f64 },
    NonNegative { column: String },
    UniqueKey { id_columns: Vec<String> },
}

/// Per-rule outcome vectors, one boolean per row.
/// BTreeMap keeps the rule order stable across runs and artifacts.
#[derive(Debug, Default)]
pub struct RuleMatrix {
    outcomes: BTreeMap<String, Vec<bool>>,
    rows: usize,
}

impl RuleMatrix {
    pub fn rule_names(&self) -> impl Iterator<Item = &String> {
        self.outcomes.keys()
    }

    pub fn outcomes(&self, rule: &str) -> Option<&[bool]> {
        self.outcomes.get(rule).map(Vec::as_slice)
    }

    /// A row passes only when every rule passes it.
    pub fn row_passes(&self, index: usize) -> bool {
        self.outcomes.values().all(|col| col[index])
    }

    pub fn failing_rows(&self) -> Vec<usize> {
        (0..self.rows).filter(|&i| !self.row_passes(i)).collect()
    }

    /// Failing-row count per rule, descending, for the run summary.
    pub fn breakdown(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .outcomes
            .iter()
            .map(|(name, col)| (name.clone(), col.iter().filter(|ok| !**ok).count()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

/// Resolve the configured catalogue into executable rules.
/// An empty `rules` list means the built-in student catalogue; the
/// uniqueness rule is appended only when the flag is set.
pub fn compile_catalogue(config: &QualityConfig) -> Vec<CompiledRule> {
    let mut compiled: Vec<CompiledRule> = if config.rules.is_empty() {
        builtin_catalogue()
    } else {
        config.rules.iter().map(compile_spec).collect()
    };

    if config.enable_uniqueness {
        compiled.push(CompiledRule {
            name: "unique_student_key".to_string(),
            check: RuleCheck::UniqueKey {
                id_columns: config.id_columns.clone(),
            },
        });
    }

    compiled
}

fn compile_spec(spec: &RuleSpec) -> CompiledRule {
    let check = match spec.check {
        CheckKind::NotNull => RuleCheck::NotNull {
            column: spec.column.clone(),
        },
        CheckKind::Range => RuleCheck::Range {
            column: spec.column.clone(),
            min: spec.min.unwrap_or(f64::NEG_INFINITY),
            max: spec.max.unwrap_or(f64::INFINITY),
        },
        CheckKind::NonNegative => RuleCheck::NonNegative {
            column: spec.column.clone(),
        },
    };

    let name = spec.name.clone().unwrap_or_else(|| match &check {
        RuleCheck::NotNull { column } => format!("not_null_{column}"),
        RuleCheck::Range { column, min, max } => format!("range_{column}_{min}_{max}"),
        RuleCheck::NonNegative { column } => format!("{column}_ge_0"),
        RuleCheck::UniqueKey { .. } => "unique_student_key".to_string(),
    });

    CompiledRule { name, check }
}

fn builtin_catalogue() -> Vec<CompiledRule> {
    let mut rules = Vec::new();

    // Required dimensions
    for column in ["school", "subject"] {
        rules.push(CompiledRule {
            name: format!("not_null_{column}"),
            check: RuleCheck::NotNull {
                column: column.to_string(),
            },
        });
    }

    // Grades live on the 0-20 scale, inclusive on both ends
    for grade in ["G1", "G2", "G3"] {
        rules.push(CompiledRule {
            name: format!("range_{grade}_0_20"),
            check: RuleCheck::Range {
                column: grade.to_string(),
                min: 0.0,
                max: 20.0,
            },
        });
    }

    rules.push(CompiledRule {
        name: "absences_ge_0".to_string(),
        check: RuleCheck::NonNegative {
            column: "absences".to_string(),
        },
    });

    rules.push(CompiledRule {
        name: "age_between_10_30".to_string(),
        check: RuleCheck::Range {
            column: "age".to_string(),
            min: 10.0,
            max: 30.0,
        },
    });

    rules
}

/// Evaluate every rule over the snapshot. Pure: no side effects.
///
/// A rule whose column is absent from the schema fails every row instead of
/// raising — schema absence is a data-quality defect, not a program error.
pub fn evaluate(snapshot: &Snapshot, rules: &[CompiledRule]) -> RuleMatrix {
    let n = snapshot.row_count();
    let mut matrix = RuleMatrix {
        outcomes: BTreeMap::new(),
        rows: n,
    };

    for rule in rules {
        let column = match &rule.check {
            RuleCheck::NotNull { column }
            | RuleCheck::Range { column, .. }
            | RuleCheck::NonNegative { column } => {
                if !snapshot.has_column(column) {
                    matrix.outcomes.insert(rule.name.clone(), vec![false; n]);
                    continue;
                }
                column
            }
            RuleCheck::UniqueKey { id_columns } => {
                matrix
                    .outcomes
                    .insert(rule.name.clone(), evaluate_uniqueness(snapshot, id_columns));
                continue;
            }
        };

        let outcomes = snapshot
            .rows()
            .iter()
            .map(|row| {
                let value = row.get(column).unwrap_or(&Scalar::Null);
                match &rule.check {
                    RuleCheck::NotNull { .. } => !value.is_null(),
                    RuleCheck::Range { min, max, .. } => value
                        .as_f64()
                        .map(|v| v >= *min && v <= *max)
                        .unwrap_or(false),
                    RuleCheck::NonNegative { .. } => {
                        value.as_f64().map(|v| v >= 0.0).unwrap_or(false)
                    }
                    RuleCheck::UniqueKey { .. } => unreachable!("handled above"),
                }
            })
            .collect();

        matrix.outcomes.insert(rule.name.clone(), outcomes);
    }

    matrix
}

/// First occurrence of a key passes; every later duplicate fails.
fn evaluate_uniqueness(snapshot: &Snapshot, id_columns: &[String]) -> Vec<bool> {
    let mut seen: HashSet<String> = HashSet::with_capacity(snapshot.row_count());
    snapshot
        .rows()
        .iter()
        .map(|row| seen.insert(composite_key(row, id_columns)))
        .collect()
}
