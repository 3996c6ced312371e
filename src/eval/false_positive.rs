//! Cross-design false-positive sweep.
//!
//! Every pair of untouched renderings from different modules is compared
//! once. A design is never compared with itself, with another rendering in its
//! own module, or with a rendering carrying the same design name. Pairs that
//! classify as similar are false positives.

use rayon::prelude::*;

use crate::distance::compare;
use crate::error::{Error, Result};
use crate::eval::record::{HashRecord, SampleMeta};
use crate::eval::report::{EvaluationRow, FalsePositiveRow, sort_false_positives};
use crate::hash::Fingerprint;

/// Compare all eligible pairs of untouched records against `threshold`.
///
/// Records whose value is not `na` are ignored. The result is sorted by
/// similarity, highest first.
pub fn false_positive_sweep(records: &[HashRecord], threshold: f64) -> Result<Vec<FalsePositiveRow>> {
    let untouched: Vec<&HashRecord> = records.iter().filter(|r| r.meta.is_untouched()).collect();
    let n = untouched.len();

    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .filter(|&(i, j)| {
            let (a, b) = (&untouched[i].meta, &untouched[j].meta);
            a.module != b.module && a.name != b.name
        })
        .collect();

    let mut rows = pairs
        .par_iter()
        .map(|&(i, j)| {
            let (a, b) = (untouched[i], untouched[j]);
            let result = compare(&a.fingerprint, &b.fingerprint, threshold)?;
            Ok(FalsePositiveRow {
                name_a: a.meta.name.clone(),
                name_b: b.meta.name.clone(),
                module_a: a.meta.module.clone(),
                module_b: b.meta.module.clone(),
                phash_a: a.fingerprint.to_token(),
                phash_b: b.fingerprint.to_token(),
                hamming: result.hamming,
                normalized: result.normalized,
                valid: result.valid,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    sort_false_positives(&mut rows);
    Ok(rows)
}

/// Rebuild records of untouched rows, carrying each row's baseline.
///
/// The sweep runs on the per-design references rather than on individual
/// renderings, so the baseline token stands in for the fingerprint.
pub fn baseline_records(rows: &[EvaluationRow]) -> Result<Vec<HashRecord>> {
    rows.iter()
        .filter(|r| r.is_untouched())
        .map(|r| {
            let size = side_for_bits(r.bit_len)?;
            Ok(HashRecord {
                meta: SampleMeta::new(
                    r.name.clone(),
                    r.modifier.clone(),
                    r.value.clone(),
                    r.name.clone(),
                    r.image_set_type,
                    r.module.clone(),
                ),
                fingerprint: Fingerprint::from_token(&r.baseline, size)?,
            })
        })
        .collect()
}

fn side_for_bits(bit_len: usize) -> Result<usize> {
    let side = (bit_len as f64).sqrt().round() as usize;
    if side > 0 && side * side == bit_len {
        Ok(side)
    } else {
        Err(Error::InvalidToken(format!("{bit_len} bits do not form a square")))
    }
}
