// src/encode/dct/transform.rs

//! Separable DCT-II of arbitrary length.
//!
//! For a length-`L` vector the forward transform is
//! `X[u] = s(u) * sum_x x[x] * cos((2x + 1) * u * pi / 2L)` with
//! `s(0) = sqrt(1/L)` and `s(u) = sqrt(2/L)` otherwise. The scaling makes the
//! basis orthonormal, so the inverse uses the same table transposed.

use std::f64::consts::PI;

/// Precomputed scaled cosine basis for one transform length.
#[derive(Debug, Clone)]
pub struct DctBasis {
    len: usize,
    // table[u * len + x] = s(u) * cos((2x + 1) * u * pi / 2L)
    table: Vec<f32>,
}

impl DctBasis {
    pub fn new(len: usize) -> Self {
        let l = len as f64;
        let mut table = Vec::with_capacity(len * len);
        for u in 0..len {
            let scale = if u == 0 { (1.0 / l).sqrt() } else { (2.0 / l).sqrt() };
            for x in 0..len {
                let angle = (2 * x + 1) as f64 * u as f64 * PI / (2.0 * l);
                table.push((scale * angle.cos()) as f32);
            }
        }
        Self { len, table }
    }

    #[inline]
    fn coeff(&self, u: usize, x: usize) -> f32 {
        self.table[u * self.len + x]
    }

    pub fn forward_1d(&self, input: &[f32], output: &mut [f32]) {
        for (u, out) in output.iter_mut().enumerate().take(self.len) {
            *out = input
                .iter()
                .enumerate()
                .map(|(x, &v)| v * self.coeff(u, x))
                .sum();
        }
    }

    pub fn inverse_1d(&self, input: &[f32], output: &mut [f32]) {
        for (x, out) in output.iter_mut().enumerate().take(self.len) {
            *out = input
                .iter()
                .enumerate()
                .map(|(u, &v)| v * self.coeff(u, x))
                .sum();
        }
    }

    /// Forward 2D transform of a row-major `len` x `len` block in place:
    /// every row first, then every column.
    pub fn forward_2d(&self, block: &mut [f32]) {
        self.rows(block, Self::forward_1d);
        self.columns(block, Self::forward_1d);
    }

    /// Inverse 2D transform in place: every column first, then every row.
    pub fn inverse_2d(&self, block: &mut [f32]) {
        self.columns(block, Self::inverse_1d);
        self.rows(block, Self::inverse_1d);
    }

    fn rows(&self, block: &mut [f32], pass: fn(&Self, &[f32], &mut [f32])) {
        let n = self.len;
        let mut scratch = vec![0f32; n];
        for row in block.chunks_exact_mut(n) {
            pass(self, row, &mut scratch);
            row.copy_from_slice(&scratch);
        }
    }

    fn columns(&self, block: &mut [f32], pass: fn(&Self, &[f32], &mut [f32])) {
        let n = self.len;
        let mut column = vec![0f32; n];
        let mut scratch = vec![0f32; n];
        for col in 0..n {
            for row in 0..n {
                column[row] = block[row * n + col];
            }
            pass(self, &column, &mut scratch);
            for row in 0..n {
                block[row * n + col] = scratch[row];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_vector_has_only_dc() {
        let basis = DctBasis::new(8);
        let input = [10f32; 8];
        let mut out = [0f32; 8];
        basis.forward_1d(&input, &mut out);
        assert!((out[0] - 10.0 * 8f32.sqrt()).abs() < 1e-4);
        for &ac in &out[1..] {
            assert!(ac.abs() < 1e-4, "AC coefficient {}", ac);
        }
    }

    #[test]
    fn test_2d_round_trip() {
        for len in [8usize, 5, 20] {
            let basis = DctBasis::new(len);
            let original: Vec<f32> = (0..len * len).map(|i| ((i * 37) % 256) as f32).collect();
            let mut block = original.clone();
            basis.forward_2d(&mut block);
            basis.inverse_2d(&mut block);
            for (a, b) in original.iter().zip(&block) {
                assert!((a - b).abs() < 0.05, "len {}: {} vs {}", len, a, b);
            }
        }
    }

    #[test]
    fn test_uniform_tile_dc_value() {
        let basis = DctBasis::new(8);
        let mut block = [128f32; 64];
        basis.forward_2d(&mut block);
        assert!((block[0] - 1024.0).abs() < 1e-2);
    }
}
