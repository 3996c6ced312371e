//! Fingerprint distance and validity classification.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hash::Fingerprint;

/// Hamming distance together with its normalized similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    /// Number of differing bits.
    pub hamming: u32,
    /// `1 - hamming / bit_len`, in `[0, 1]`; 1 means identical.
    pub normalized: f64,
}

/// Distance plus the verdict under a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Number of differing bits.
    pub hamming: u32,
    /// Normalized similarity in `[0, 1]`.
    pub normalized: f64,
    /// Whether `normalized` reached the threshold.
    pub valid: bool,
}

/// Hamming distance and normalized similarity of two same-size fingerprints.
///
/// Fails with `SizeMismatch` when the fingerprints were produced under
/// different `hash_size` settings.
pub fn distance(a: &Fingerprint, b: &Fingerprint) -> Result<Distance> {
    let hamming = a.hamming(b)?;
    let normalized = 1.0 - f64::from(hamming) / a.bit_len() as f64;
    Ok(Distance {
        hamming,
        normalized,
    })
}

/// Inclusive threshold test: `normalized >= threshold`.
#[must_use]
pub fn classify(normalized: f64, threshold: f64) -> bool {
    normalized >= threshold
}

/// Distance and classification in one step.
pub fn compare(a: &Fingerprint, b: &Fingerprint, threshold: f64) -> Result<ComparisonResult> {
    let Distance {
        hamming,
        normalized,
    } = distance(a, b)?;
    Ok(ComparisonResult {
        hamming,
        normalized,
        valid: classify(normalized, threshold),
    })
}
