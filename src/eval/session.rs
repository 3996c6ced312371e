//! Evaluation session with a callback-based decode interface.
//!
//! This module provides [`EvalSession`], the main entry point for evaluation.
//! The caller supplies a decode callback that turns sample metadata into
//! decoded pixels; the session hashes, aggregates, compares and assembles
//! rows.

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::baseline::aggregate;
use crate::config::EvalConfig;
use crate::distance::{compare, distance};
use crate::error::{Error, Result};
use crate::eval::false_positive::{baseline_records, false_positive_sweep};
use crate::eval::record::{HashRecord, SampleGroup, SampleMeta};
use crate::eval::report::{
    EvaluationReport, EvaluationRow, FalsePositiveRow, GroupReport, sort_rows,
};
use crate::hash::{Fingerprint, FrequencyHasher};
use crate::pixels::ImageData;
use crate::stats;

/// Decode callback type.
///
/// Takes sample metadata, returns decoded image data. Any error it returns is
/// treated as an unreadable image.
pub type DecodeFn = Box<dyn Fn(&SampleMeta) -> Result<ImageData> + Send + Sync>;

/// Records hashed from a list of samples, plus the ones that could not be read.
#[derive(Debug, Clone, Default)]
pub struct HashedSamples {
    /// Successfully hashed samples, in input order.
    pub records: Vec<HashRecord>,
    /// Sources of samples excluded because they could not be read.
    pub skipped: Vec<String>,
}

/// Evaluation session for fingerprint robustness.
///
/// # Example
///
/// ```rust,ignore
/// use phash_eval::{EvalConfig, EvalSession, ImageSetType, SampleGroup, SampleMeta};
///
/// let config = EvalConfig::builder().hash_size(16).build()?;
/// let session = EvalSession::new(config, Box::new(|meta| load_png(&meta.source)))?;
///
/// let group = SampleGroup::partition("board1", ImageSetType::Single, samples, "res");
/// let report = session.evaluate_groups("single", &[group]);
/// let false_positives = session.false_positives(&report)?;
/// ```
pub struct EvalSession {
    config: EvalConfig,
    hasher: FrequencyHasher,
    decode: DecodeFn,
}

impl EvalSession {
    /// Create a new evaluation session. The configuration is validated.
    pub fn new(config: EvalConfig, decode: DecodeFn) -> Result<Self> {
        config.validate()?;
        let hasher = FrequencyHasher::new(config.hash)?;
        Ok(Self {
            config,
            hasher,
            decode,
        })
    }

    /// Configuration of this session.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Decode and hash one sample.
    pub fn hash_sample(&self, meta: &SampleMeta) -> Result<HashRecord> {
        let image = (self.decode)(meta).map_err(|e| match e {
            e @ Error::ImageRead { .. } => e,
            other => Error::image_read(&meta.source, other.to_string()),
        })?;
        let fingerprint = self.hasher.hash_image(&image, &meta.source)?;
        debug!(source = %meta.source, phash = %fingerprint, "hashed sample");
        Ok(HashRecord {
            meta: meta.clone(),
            fingerprint,
        })
    }

    /// Hash samples in parallel.
    ///
    /// Unreadable samples are logged and skipped; any other failure aborts.
    pub fn hash_samples(&self, samples: &[SampleMeta]) -> Result<HashedSamples> {
        let results: Vec<Result<HashRecord>> =
            samples.par_iter().map(|meta| self.hash_sample(meta)).collect();

        let mut hashed = HashedSamples::default();
        for (meta, result) in samples.iter().zip(results) {
            match result {
                Ok(record) => hashed.records.push(record),
                Err(e) if e.is_recoverable() => {
                    warn!(source = %meta.source, error = %e, "skipping unreadable image");
                    hashed.skipped.push(meta.source.clone());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(hashed)
    }

    /// Evaluate one group against its baseline.
    ///
    /// Versions groups always get a row per baseline member, carrying the
    /// member's average similarity to the other members. Other groups get
    /// baseline rows only if `include_baseline_rows` is set. Targets are always
    /// compared with the baseline.
    pub fn evaluate_group(&self, group: &SampleGroup) -> Result<GroupReport> {
        let threshold = self.config.threshold_for(group.image_set_type);
        let HashedSamples {
            records: members,
            mut skipped,
        } = self.hash_samples(&group.baseline)?;

        if members.is_empty() {
            return Err(Error::EmptySet(format!(
                "{}: no readable baseline images ({} listed)",
                group.module,
                group.baseline.len()
            )));
        }

        let fingerprints: Vec<Fingerprint> =
            members.iter().map(|r| r.fingerprint.clone()).collect();
        let baseline = aggregate(&fingerprints)?;
        let token = baseline.to_token();

        let mut rows = Vec::with_capacity(members.len() + group.targets.len());
        if group.image_set_type.is_versions() {
            let cohesions = cohesion(&fingerprints)?;
            for (record, cohesion) in members.iter().zip(cohesions) {
                let mut row =
                    EvaluationRow::new(record, &token, compare(&record.fingerprint, &baseline, threshold)?);
                row.cohesion = cohesion;
                rows.push(row);
            }
        } else if group.include_baseline_rows {
            for record in &members {
                rows.push(EvaluationRow::new(
                    record,
                    &token,
                    compare(&record.fingerprint, &baseline, threshold)?,
                ));
            }
        }

        let targets = self.hash_samples(&group.targets)?;
        skipped.extend(targets.skipped);
        for record in &targets.records {
            rows.push(EvaluationRow::new(
                record,
                &token,
                compare(&record.fingerprint, &baseline, threshold)?,
            ));
        }

        sort_rows(&mut rows);
        info!(
            module = %group.module,
            set = %group.image_set_type,
            rows = rows.len(),
            skipped = skipped.len(),
            valid_rate = stats::valid_rate(&rows).unwrap_or(0.0),
            "evaluated group"
        );

        Ok(GroupReport {
            module: group.module.clone(),
            image_set_type: group.image_set_type,
            baseline: token,
            rows,
            skipped,
        })
    }

    /// Evaluate many groups in parallel.
    ///
    /// A failing group is logged and recorded in `failures`; the other groups
    /// still contribute their rows.
    pub fn evaluate_groups(&self, name: &str, groups: &[SampleGroup]) -> EvaluationReport {
        let results: Vec<Result<GroupReport>> =
            groups.par_iter().map(|g| self.evaluate_group(g)).collect();

        let mut report = EvaluationReport::new(name);
        report.config_summary = self.config.summary();
        for (group, result) in groups.iter().zip(results) {
            match result {
                Ok(group_report) => report.push_group(group_report),
                Err(e) => {
                    error!(module = %group.module, error = %e, "group evaluation failed");
                    report.push_failure(group.module.clone(), &e);
                }
            }
        }
        sort_rows(&mut report.rows);

        let untouched: Vec<EvaluationRow> = report.untouched_rows().cloned().collect();
        info!(
            report = name,
            rows = report.rows.len(),
            failures = report.failures.len(),
            untouched_valid_rate = stats::valid_rate(&untouched).unwrap_or(0.0),
            threshold = self.config.ave_threshold,
            "evaluation finished"
        );
        report
    }

    /// Run the false-positive sweep over the baselines of a report's
    /// untouched renderings, using the single-image threshold.
    pub fn false_positives(&self, report: &EvaluationReport) -> Result<Vec<FalsePositiveRow>> {
        let records = baseline_records(&report.rows)?;
        let rows = false_positive_sweep(&records, self.config.ave_threshold)?;
        info!(
            report = %report.name,
            pairs = rows.len(),
            false_positive_rate = stats::false_positive_rate(&rows).unwrap_or(0.0),
            threshold = self.config.ave_threshold,
            "false-positive sweep finished"
        );
        Ok(rows)
    }
}

/// Average similarity of each fingerprint to every other one.
///
/// `None` for a lone fingerprint, which has nothing to compare against.
fn cohesion(fingerprints: &[Fingerprint]) -> Result<Vec<Option<f64>>> {
    let n = fingerprints.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            if n < 2 {
                return Ok(None);
            }
            let mut sum = 0.0;
            for (j, other) in fingerprints.iter().enumerate() {
                if j != i {
                    sum += distance(&fingerprints[i], other)?.normalized;
                }
            }
            Ok(Some(sum / (n - 1) as f64))
        })
        .collect()
}
