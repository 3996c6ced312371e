//! Square bit-matrix fingerprint and its canonical hex token.

use crate::error::{Error, Result};

const WORD_BITS: usize = 64;

/// Immutable `size × size` bit matrix, stored row-major in packed words.
///
/// Bits past `size²` in the last word are always zero, so derived equality
/// and hashing compare only meaningful bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    size: usize,
    words: Vec<u64>,
}

impl Fingerprint {
    /// Build a fingerprint from `size²` row-major bits. `size` must be positive.
    pub fn from_bits(size: usize, bits: impl IntoIterator<Item = bool>) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig("fingerprint side must be positive".to_string()));
        }
        let bit_len = size * size;
        let mut words = vec![0u64; bit_len.div_ceil(WORD_BITS)];
        let mut count = 0;
        for (i, bit) in bits.into_iter().enumerate() {
            if i >= bit_len {
                return Err(Error::SizeMismatch {
                    expected: bit_len,
                    actual: i + 1,
                });
            }
            if bit {
                words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
            }
            count += 1;
        }
        if count != bit_len {
            return Err(Error::SizeMismatch {
                expected: bit_len,
                actual: count,
            });
        }
        Ok(Self { size, words })
    }

    /// Build a fingerprint by evaluating `f(row, col)` for every position.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[must_use]
    pub fn from_fn(size: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        assert!(size > 0, "fingerprint side must be positive");
        let mut words = vec![0u64; (size * size).div_ceil(WORD_BITS)];
        for row in 0..size {
            for col in 0..size {
                if f(row, col) {
                    let i = row * size + col;
                    words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
                }
            }
        }
        Self { size, words }
    }

    /// Side length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bits (`size²`).
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.size * self.size
    }

    /// Bit at row-major index `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.bit_len());
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// Bit at `(row, col)`.
    #[must_use]
    pub fn bit(&self, row: usize, col: usize) -> bool {
        self.get(row * self.size + col)
    }

    /// Iterate bits in row-major order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_len()).map(|i| self.get(i))
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Bitwise complement of this fingerprint.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self::from_fn(self.size, |row, col| !self.bit(row, col))
    }

    /// Count of differing bit positions.
    pub fn hamming(&self, other: &Self) -> Result<u32> {
        if self.bit_len() != other.bit_len() {
            return Err(Error::SizeMismatch {
                expected: self.bit_len(),
                actual: other.bit_len(),
            });
        }
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Canonical lowercase hex token.
    ///
    /// The row-major bit string is read as one big-endian number, left-padded
    /// to a whole number of hex digits.
    #[must_use]
    pub fn to_token(&self) -> String {
        let bit_len = self.bit_len();
        let digits = bit_len.div_ceil(4);
        let pad = digits * 4 - bit_len;
        let mut token = String::with_capacity(digits);
        for d in 0..digits {
            let mut nibble = 0u32;
            for k in 0..4 {
                nibble <<= 1;
                let virtual_index = d * 4 + k;
                if virtual_index >= pad && self.get(virtual_index - pad) {
                    nibble |= 1;
                }
            }
            token.push(char::from_digit(nibble, 16).unwrap_or('0'));
        }
        token
    }

    /// Parse a token produced by [`to_token`](Self::to_token) for side `size`.
    pub fn from_token(token: &str, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidToken("fingerprint side must be positive".to_string()));
        }
        let bit_len = size * size;
        let digits = bit_len.div_ceil(4);
        if token.len() != digits {
            return Err(Error::InvalidToken(format!(
                "expected {digits} hex digits for size {size}, got {}",
                token.len()
            )));
        }
        let pad = digits * 4 - bit_len;
        let mut bits = Vec::with_capacity(digits * 4);
        for c in token.chars() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| Error::InvalidToken(format!("invalid hex digit {c:?}")))?;
            bits.extend((0..4).rev().map(|k| (nibble >> k) & 1 == 1));
        }
        if bits[..pad].iter().any(|&b| b) {
            return Err(Error::InvalidToken(format!(
                "token {token} has bits beyond {bit_len}"
            )));
        }
        Self::from_bits(size, bits.into_iter().skip(pad))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_token())
    }
}
