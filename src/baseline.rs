//! Baseline ("average hash") aggregation.
//!
//! Several renderings of one design are folded into a single reference
//! fingerprint by per-bit majority. A bit is set only when strictly more than
//! half of the inputs set it, so an even split resolves to zero.

use crate::error::{Error, Result};
use crate::hash::Fingerprint;

/// Aggregate same-size fingerprints into one baseline fingerprint.
///
/// The result does not depend on input order and equals the input when all
/// inputs are identical.
///
/// # Example
///
/// ```
/// use phash_eval::{Fingerprint, baseline::aggregate};
///
/// let a = Fingerprint::from_token("f0f0", 4)?;
/// let b = Fingerprint::from_token("f0f1", 4)?;
/// let c = Fingerprint::from_token("f0f1", 4)?;
/// assert_eq!(aggregate(&[a, b, c])?.to_token(), "f0f1");
/// # Ok::<(), phash_eval::Error>(())
/// ```
pub fn aggregate(fingerprints: &[Fingerprint]) -> Result<Fingerprint> {
    let Some(first) = fingerprints.first() else {
        return Err(Error::EmptySet("no fingerprints to aggregate".to_string()));
    };
    let size = first.size();
    if let Some(other) = fingerprints.iter().find(|f| f.size() != size) {
        return Err(Error::SizeMismatch {
            expected: first.bit_len(),
            actual: other.bit_len(),
        });
    }

    let mut ones = vec![0usize; first.bit_len()];
    for fingerprint in fingerprints {
        for (count, bit) in ones.iter_mut().zip(fingerprint.bits()) {
            *count += usize::from(bit);
        }
    }

    let half = fingerprints.len() / 2;
    Fingerprint::from_bits(size, ones.into_iter().map(|count| count > half))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(size: usize, seed: usize) -> Fingerprint {
        Fingerprint::from_fn(size, |r, c| (r * 7 + c * 3 + seed) % 5 < 2)
    }

    #[test]
    fn test_identical_inputs_unchanged() {
        for size in [4, 8, 16, 32] {
            let f = pattern(size, 1);
            let agg = aggregate(&[f.clone(), f.clone(), f.clone()]).unwrap();
            assert_eq!(agg, f);
        }
    }

    #[test]
    fn test_single_input_is_identity() {
        let f = pattern(8, 3);
        assert_eq!(aggregate(std::slice::from_ref(&f)).unwrap(), f);
    }

    #[test]
    fn test_tie_resolves_to_zero() {
        let f0 = Fingerprint::from_fn(8, |r, c| r == c);
        let f1 = Fingerprint::from_fn(8, |r, c| r == c || (r == 2 && c == 5));
        let agg = aggregate(&[f0.clone(), f1]).unwrap();
        assert!(!agg.bit(2, 5));
        assert_eq!(agg, f0);
    }

    #[test]
    fn test_tie_with_both_set_keeps_one() {
        let f = Fingerprint::from_fn(4, |_, _| true);
        let agg = aggregate(&[f.clone(), f.clone()]).unwrap();
        assert_eq!(agg, f);
    }

    #[test]
    fn test_majority() {
        let ones = Fingerprint::from_fn(4, |_, _| true);
        let zeros = Fingerprint::from_fn(4, |_, _| false);
        let agg = aggregate(&[ones.clone(), zeros.clone(), ones.clone()]).unwrap();
        assert_eq!(agg, ones);
        let agg = aggregate(&[zeros.clone(), ones.clone(), zeros.clone(), ones.clone(), ones]).unwrap();
        assert_eq!(agg.count_ones(), 16);
        let agg = aggregate(&[zeros.clone(), zeros.clone(), Fingerprint::from_fn(4, |_, _| true)]).unwrap();
        assert_eq!(agg, zeros);
    }

    #[test]
    fn test_order_invariant() {
        let inputs = [pattern(8, 0), pattern(8, 1), pattern(8, 2), pattern(8, 3)];
        let forward = aggregate(&inputs).unwrap();
        let mut reversed = inputs.to_vec();
        reversed.reverse();
        assert_eq!(aggregate(&reversed).unwrap(), forward);
        reversed.swap(0, 2);
        assert_eq!(aggregate(&reversed).unwrap(), forward);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(aggregate(&[]), Err(Error::EmptySet(_))));
    }

    #[test]
    fn test_size_mismatch() {
        let err = aggregate(&[pattern(8, 0), pattern(16, 0)]).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                expected: 64,
                actual: 256
            }
        ));
    }
}
