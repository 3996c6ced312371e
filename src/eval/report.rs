//! Report types for evaluation results.
//!
//! These are the values handed to external renderers (spreadsheets, tables,
//! charts). All of them serialize with serde.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::distance::ComparisonResult;
use crate::eval::record::{HashRecord, ImageSetType};

/// One sample compared against its group's baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    /// Design identifier.
    pub name: String,

    /// Fingerprint token of the sample.
    pub phash: String,

    /// Token of the baseline the sample was compared to.
    pub baseline: String,

    /// Differing bits against the baseline.
    pub hamming: u32,

    /// Fingerprint length in bits.
    pub bit_len: usize,

    /// Normalized similarity against the baseline.
    pub normalized: f64,

    /// Transformation category.
    pub modifier: String,

    /// Transformation parameter.
    pub value: String,

    /// Set the sample belongs to.
    pub image_set_type: ImageSetType,

    /// Group/folder identifier.
    pub module: String,

    /// Whether `normalized` reached the set's threshold.
    pub valid: bool,

    /// Average pairwise similarity to the other members of a versions group.
    #[serde(default)]
    pub cohesion: Option<f64>,
}

impl EvaluationRow {
    /// Join a record with its comparison against `baseline_token`.
    #[must_use]
    pub fn new(record: &HashRecord, baseline_token: &str, result: ComparisonResult) -> Self {
        Self {
            name: record.meta.name.clone(),
            phash: record.fingerprint.to_token(),
            baseline: baseline_token.to_string(),
            hamming: result.hamming,
            bit_len: record.fingerprint.bit_len(),
            normalized: result.normalized,
            modifier: record.meta.modifier.clone(),
            value: record.meta.value.clone(),
            image_set_type: record.meta.image_set_type,
            module: record.meta.module.clone(),
            valid: result.valid,
            cohesion: None,
        }
    }

    /// Whether this row describes an untouched rendering.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.value == crate::eval::record::UNTOUCHED_VALUE
    }
}

/// Sort rows by name, then transformation value.
pub fn sort_rows(rows: &mut [EvaluationRow]) {
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.value.cmp(&b.value)));
}

/// Baseline comparison of two designs from different modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalsePositiveRow {
    /// First design.
    pub name_a: String,
    /// Second design.
    pub name_b: String,
    /// Module of the first design.
    pub module_a: String,
    /// Module of the second design.
    pub module_b: String,
    /// Baseline token of the first design.
    pub phash_a: String,
    /// Baseline token of the second design.
    pub phash_b: String,
    /// Differing bits.
    pub hamming: u32,
    /// Normalized similarity.
    pub normalized: f64,
    /// Classified as similar, i.e. a false positive.
    pub valid: bool,
}

/// Sort false-positive rows by similarity descending, then by first name.
pub fn sort_false_positives(rows: &mut [FalsePositiveRow]) {
    rows.sort_by(|a, b| {
        b.normalized
            .partial_cmp(&a.normalized)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name_a.cmp(&b.name_a))
            .then_with(|| a.name_b.cmp(&b.name_b))
    });
}

/// Result of evaluating one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Group/folder identifier.
    pub module: String,
    /// Set the group belongs to.
    pub image_set_type: ImageSetType,
    /// Baseline token of the group.
    pub baseline: String,
    /// Rows sorted by name and value.
    pub rows: Vec<EvaluationRow>,
    /// Samples excluded because they could not be read.
    pub skipped: Vec<String>,
}

/// A group that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFailure {
    /// Group/folder identifier.
    pub module: String,
    /// Rendered error.
    pub error: String,
}

/// Combined result of evaluating many groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Report label.
    pub name: String,

    /// Rows of every successful group, sorted by name and value.
    pub rows: Vec<EvaluationRow>,

    /// Groups that failed.
    pub failures: Vec<GroupFailure>,

    /// Samples excluded because they could not be read.
    #[serde(default)]
    pub skipped: Vec<String>,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Configuration used for this evaluation.
    pub config_summary: String,
}

impl EvaluationReport {
    /// Create an empty report.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
            timestamp: chrono::Utc::now(),
            config_summary: String::new(),
        }
    }

    /// Append a group's rows.
    pub fn push_group(&mut self, group: GroupReport) {
        self.rows.extend(group.rows);
        self.skipped.extend(group.skipped);
    }

    /// Record a failed group.
    pub fn push_failure(&mut self, module: impl Into<String>, error: &crate::error::Error) {
        self.failures.push(GroupFailure {
            module: module.into(),
            error: error.to_string(),
        });
    }

    /// Rows of untouched renderings.
    pub fn untouched_rows(&self) -> impl Iterator<Item = &EvaluationRow> {
        self.rows.iter().filter(|r| r.is_untouched())
    }

    /// Rows of one module.
    pub fn rows_for_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a EvaluationRow> {
        self.rows.iter().filter(move |r| r.module == module)
    }

    /// Unique module identifiers, sorted.
    #[must_use]
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self.rows.iter().map(|r| r.module.clone()).collect();
        modules.sort();
        modules.dedup();
        modules
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(name: &str, value: &str, module: &str, normalized: f64, valid: bool) -> EvaluationRow {
        EvaluationRow {
            name: name.to_string(),
            phash: "0000".to_string(),
            baseline: "0000".to_string(),
            hamming: ((1.0 - normalized) * 16.0).round() as u32,
            bit_len: 16,
            normalized,
            modifier: "res".to_string(),
            value: value.to_string(),
            image_set_type: ImageSetType::Single,
            module: module.to_string(),
            valid,
            cohesion: None,
        }
    }

    #[test]
    fn test_sort_rows_by_name_then_value() {
        let mut rows = vec![
            row("b", "na", "m2", 1.0, true),
            row("a", "na", "m1", 1.0, true),
            row("a", "0.5", "m1", 0.9, true),
        ];
        sort_rows(&mut rows);
        let keys: Vec<_> = rows.iter().map(|r| (r.name.as_str(), r.value.as_str())).collect();
        assert_eq!(keys, vec![("a", "0.5"), ("a", "na"), ("b", "na")]);
    }

    #[test]
    fn test_report_modules_and_untouched() {
        let mut report = EvaluationReport::new("single");
        report.push_group(GroupReport {
            module: "m1".to_string(),
            image_set_type: ImageSetType::Single,
            baseline: "0000".to_string(),
            rows: vec![row("a", "na", "m1", 1.0, true), row("a", "2", "m1", 0.8, false)],
            skipped: Vec::new(),
        });
        report.push_group(GroupReport {
            module: "m0".to_string(),
            image_set_type: ImageSetType::Single,
            baseline: "ffff".to_string(),
            rows: vec![row("b", "na", "m0", 1.0, true)],
            skipped: Vec::new(),
        });
        assert_eq!(report.modules(), vec!["m0".to_string(), "m1".to_string()]);
        assert_eq!(report.untouched_rows().count(), 2);
        assert_eq!(report.rows_for_module("m1").count(), 2);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut report = EvaluationReport::new("versions");
        report.rows.push(row("a", "na", "m1", 0.75, false));
        report.push_failure("m2", &crate::error::Error::EmptySet("m2".to_string()));
        let json = serde_json::to_string(&report).unwrap();
        let back: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rows, report.rows);
        assert_eq!(back.failures, report.failures);
        assert_eq!(back.timestamp.timestamp(), report.timestamp.timestamp());
    }

    #[test]
    fn test_sort_false_positives() {
        let fp = |a: &str, n: f64| FalsePositiveRow {
            name_a: a.to_string(),
            name_b: "z".to_string(),
            module_a: "m1".to_string(),
            module_b: "m2".to_string(),
            phash_a: String::new(),
            phash_b: String::new(),
            hamming: 0,
            normalized: n,
            valid: false,
        };
        let mut rows = vec![fp("b", 0.5), fp("a", 0.9), fp("a", 0.5)];
        sort_false_positives(&mut rows);
        let keys: Vec<_> = rows.iter().map(|r| (r.name_a.as_str(), r.normalized)).collect();
        assert_eq!(keys, vec![("a", 0.9), ("a", 0.5), ("b", 0.5)]);
    }
}
