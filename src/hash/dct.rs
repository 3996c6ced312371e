//! Separable 2D DCT-II over a square grid.
//!
//! Unnormalized type-II transform, `X[k] = 2 Σ x[n] cos(π k (2n + 1) / 2N)`,
//! applied along columns and then along rows.

use std::f64::consts::PI;

/// Precomputed cosine table for transforms of one size.
#[derive(Debug, Clone)]
pub struct Dct2d {
    n: usize,
    // table[k * n + i] = 2 cos(π k (2i + 1) / 2n)
    table: Vec<f64>,
}

impl Dct2d {
    /// Prepare a transform for `n × n` grids.
    #[must_use]
    pub fn new(n: usize) -> Self {
        let mut table = Vec::with_capacity(n * n);
        for k in 0..n {
            for i in 0..n {
                let angle = PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64;
                table.push(2.0 * angle.cos());
            }
        }
        Self { n, table }
    }

    /// Grid side this transform was built for.
    #[must_use]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Transform a row-major `n × n` grid, returning the coefficient grid.
    ///
    /// Only the top-left `keep × keep` coefficients are computed on the second
    /// pass; the rest of the returned grid is zero. Pass `n` to get all of them.
    #[must_use]
    pub fn transform(&self, grid: &[f64], keep: usize) -> Vec<f64> {
        let n = self.n;
        assert_eq!(grid.len(), n * n, "grid must be {n}x{n}");
        let keep = keep.min(n);

        // Columns first: only the first `keep` frequency rows are needed later.
        let mut cols = vec![0.0; n * n];
        for k in 0..keep {
            let basis = &self.table[k * n..(k + 1) * n];
            for x in 0..n {
                cols[k * n + x] = basis
                    .iter()
                    .enumerate()
                    .map(|(y, c)| c * grid[y * n + x])
                    .sum();
            }
        }

        let mut out = vec![0.0; n * n];
        for row in 0..keep {
            let line = &cols[row * n..(row + 1) * n];
            for k in 0..keep {
                let basis = &self.table[k * n..(k + 1) * n];
                out[row * n + k] = basis.iter().zip(line).map(|(c, v)| c * v).sum();
            }
        }
        out
    }

    /// Transform and return the `keep × keep` low-frequency block, row-major.
    #[must_use]
    pub fn low_frequencies(&self, grid: &[f64], keep: usize) -> Vec<f64> {
        let keep = keep.min(self.n);
        let full = self.transform(grid, keep);
        (0..keep)
            .flat_map(|row| full[row * self.n..row * self.n + keep].iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_1d(x: &[f64]) -> Vec<f64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                2.0 * x
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v * (PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64).cos())
                    .sum::<f64>()
            })
            .collect()
    }

    #[test]
    fn test_constant_grid_has_only_dc() {
        let dct = Dct2d::new(4);
        let out = dct.transform(&[1.0; 16], 4);
        // DC = 2 * 4 * 2 * 4 * 1.0
        assert!((out[0] - 64.0).abs() < 1e-9);
        for v in &out[1..] {
            assert!(v.abs() < 1e-9, "non-DC coefficient {v}");
        }
    }

    #[test]
    fn test_matches_separable_naive() {
        let n = 6;
        let grid: Vec<f64> = (0..n * n).map(|i| ((i * 37) % 11) as f64).collect();

        // Columns, then rows.
        let mut by_cols = vec![0.0; n * n];
        for x in 0..n {
            let col: Vec<f64> = (0..n).map(|y| grid[y * n + x]).collect();
            for (k, v) in naive_1d(&col).into_iter().enumerate() {
                by_cols[k * n + x] = v;
            }
        }
        let mut expected = vec![0.0; n * n];
        for y in 0..n {
            let row = &by_cols[y * n..(y + 1) * n];
            expected[y * n..(y + 1) * n].copy_from_slice(&naive_1d(row));
        }

        let out = Dct2d::new(n).transform(&grid, n);
        for (a, b) in out.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-6, "{a} != {b}");
        }
    }

    #[test]
    fn test_low_frequencies_block() {
        let n = 8;
        let grid: Vec<f64> = (0..n * n).map(|i| (i % 7) as f64).collect();
        let dct = Dct2d::new(n);
        let full = dct.transform(&grid, n);
        let low = dct.low_frequencies(&grid, 3);
        assert_eq!(low.len(), 9);
        for r in 0..3 {
            for c in 0..3 {
                assert!((low[r * 3 + c] - full[r * n + c]).abs() < 1e-9);
            }
        }
    }
}
