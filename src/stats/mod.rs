//! Statistics over evaluation rows.
//!
//! ## Core Statistics
//!
//! - [`median`], [`mean`]: basic statistical functions
//!
//! ## Row Summaries
//!
//! - [`Scored`]: the comparison columns shared by evaluation and false-positive rows
//! - [`valid_rate`], [`false_positive_rate`]: share of rows classified valid
//! - [`summarize`]: [`RowSummary`] of a slice of rows
//! - [`by_modifier`]: [`ModifierSummary`] per transformation category

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::eval::report::{EvaluationRow, FalsePositiveRow};

/// Compute median of a slice.
///
/// For even-length slices, returns the average of the two middle values.
///
/// # Example
///
/// ```
/// use phash_eval::stats::median;
///
/// assert_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
/// assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
/// ```
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Compute arithmetic mean.
///
/// # Example
///
/// ```
/// use phash_eval::stats::mean;
///
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of the absolute deviations from the median.
///
/// # Example
///
/// ```
/// use phash_eval::stats::median_absolute_deviation;
///
/// // median 3, deviations [2, 1, 0, 1, 97]
/// assert_eq!(median_absolute_deviation(&[1.0, 2.0, 3.0, 4.0, 100.0]), 1.0);
/// ```
#[must_use]
pub fn median_absolute_deviation(values: &[f64]) -> f64 {
    let center = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// A row carrying the outcome of one fingerprint comparison.
pub trait Scored {
    /// Differing bits.
    fn hamming(&self) -> u32;
    /// Normalized similarity.
    fn normalized(&self) -> f64;
    /// Whether the similarity reached the threshold.
    fn valid(&self) -> bool;
    /// Average similarity to the other members of a versions group.
    fn cohesion(&self) -> Option<f64> {
        None
    }
}

impl Scored for EvaluationRow {
    fn hamming(&self) -> u32 {
        self.hamming
    }

    fn normalized(&self) -> f64 {
        self.normalized
    }

    fn valid(&self) -> bool {
        self.valid
    }

    fn cohesion(&self) -> Option<f64> {
        self.cohesion
    }
}

impl Scored for FalsePositiveRow {
    fn hamming(&self) -> u32 {
        self.hamming
    }

    fn normalized(&self) -> f64 {
        self.normalized
    }

    fn valid(&self) -> bool {
        self.valid
    }
}

impl<T: Scored + ?Sized> Scored for &T {
    fn hamming(&self) -> u32 {
        (**self).hamming()
    }

    fn normalized(&self) -> f64 {
        (**self).normalized()
    }

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn cohesion(&self) -> Option<f64> {
        (**self).cohesion()
    }
}

/// Fraction of rows classified valid; `None` for no rows.
#[must_use]
pub fn valid_rate<T: Scored>(rows: &[T]) -> Option<f64> {
    rate(rows.iter().map(Scored::valid))
}

/// Fraction of cross-design pairs classified similar; `None` for no pairs.
#[must_use]
pub fn false_positive_rate(rows: &[FalsePositiveRow]) -> Option<f64> {
    valid_rate(rows)
}

fn rate(flags: impl Iterator<Item = bool>) -> Option<f64> {
    let (total, valid) = flags.fold((0usize, 0usize), |(t, v), f| (t + 1, v + usize::from(f)));
    (total > 0).then(|| valid as f64 / total as f64)
}

/// Descriptive statistics of a set of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSummary {
    /// Number of rows.
    pub count: usize,
    /// Number of valid rows.
    pub valid: usize,
    /// `valid / count`.
    pub valid_rate: f64,
    /// Mean Hamming distance.
    pub mean_hamming: f64,
    /// Median absolute deviation of the Hamming distances.
    pub hamming_mad: f64,
    /// Mean normalized similarity.
    pub mean_normalized: f64,
    /// Median normalized similarity.
    pub median_normalized: f64,
    /// Lowest normalized similarity.
    pub min_normalized: f64,
    /// Highest normalized similarity.
    pub max_normalized: f64,
    /// Mean pairwise cohesion, for rows that carry one.
    pub mean_cohesion: Option<f64>,
}

/// Summarize rows. Returns `None` if `rows` is empty.
#[must_use]
pub fn summarize<T: Scored>(rows: &[T]) -> Option<RowSummary> {
    if rows.is_empty() {
        return None;
    }
    let hamming: Vec<f64> = rows.iter().map(|r| f64::from(r.hamming())).collect();
    let normalized: Vec<f64> = rows.iter().map(Scored::normalized).collect();
    let cohesion: Vec<f64> = rows.iter().filter_map(Scored::cohesion).collect();
    let valid = rows.iter().filter(|r| r.valid()).count();
    Some(RowSummary {
        count: rows.len(),
        valid,
        valid_rate: valid as f64 / rows.len() as f64,
        mean_hamming: mean(&hamming),
        hamming_mad: median_absolute_deviation(&hamming),
        mean_normalized: mean(&normalized),
        median_normalized: median(&normalized),
        min_normalized: normalized.iter().copied().fold(f64::INFINITY, f64::min),
        max_normalized: normalized.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean_cohesion: (!cohesion.is_empty()).then(|| mean(&cohesion)),
    })
}

/// Summary of one transformation category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSummary {
    /// Transformation category.
    pub modifier: String,
    /// Transformation parameter.
    pub value: String,
    /// Statistics of the matching rows.
    pub summary: RowSummary,
}

/// Group rows by `(modifier, value)` and summarize each group, sorted by key.
#[must_use]
pub fn by_modifier(rows: &[EvaluationRow]) -> Vec<ModifierSummary> {
    let mut groups: BTreeMap<(&str, &str), Vec<&EvaluationRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.modifier.as_str(), row.value.as_str()))
            .or_default()
            .push(row);
    }
    groups
        .into_iter()
        .filter_map(|((modifier, value), group)| {
            summarize(&group).map(|summary| ModifierSummary {
                modifier: modifier.to_string(),
                value: value.to_string(),
                summary,
            })
        })
        .collect()
}
