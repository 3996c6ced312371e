//! Evaluation session and report generation.
//!
//! This module provides the core evaluation infrastructure:
//!
//! - [`session::EvalSession`]: Main evaluation session with a decode callback
//! - [`record`]: Sample metadata, hashed records and evaluation groups
//! - [`report`]: Report types for evaluation results
//! - [`false_positive`]: Cross-design comparison of untouched renderings

pub mod false_positive;
pub mod record;
pub mod report;
pub mod session;

pub use false_positive::{baseline_records, false_positive_sweep};
pub use record::{HashRecord, ImageSetType, SampleGroup, SampleMeta};
pub use report::{EvaluationReport, EvaluationRow, FalsePositiveRow, GroupFailure, GroupReport};
pub use session::{DecodeFn, EvalSession, HashedSamples};
