// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::f64::consts::PI;

/// `table[i][u]` is the DCT basis function `u` at sample `i`, including the
/// 1/sqrt(2) scale of the DC term.
fn basis_table() -> [[f64; 8]; 8] {
    let mut table = [[0.0; 8]; 8];
    for (i, row) in table.iter_mut().enumerate() {
        for (u, value) in row.iter_mut().enumerate() {
            let scale = if u == 0 { 1.0 / 2f64.sqrt() } else { 1.0 };
            *value = scale * (((2 * i + 1) * u) as f64 * PI / 16.0).cos();
        }
    }
    table
}

/// Floating point forward DCT of a row-major block of level-shifted
/// samples. The output is in natural order, `v * 8 + u` with `u` the
/// horizontal frequency.
pub fn forward_dct(samples: &[f64; 64]) -> [f64; 64] {
    let basis = basis_table();
    let mut rows = [0.0; 64];
    for y in 0..8 {
        for u in 0..8 {
            rows[y * 8 + u] = (0..8).map(|x| samples[y * 8 + x] * basis[x][u]).sum();
        }
    }
    let mut out = [0.0; 64];
    for v in 0..8 {
        for u in 0..8 {
            let sum: f64 = (0..8).map(|y| rows[y * 8 + u] * basis[y][v]).sum();
            out[v * 8 + u] = sum / 4.0;
        }
    }
    out
}

/// Floating point inverse of [`forward_dct`].
pub fn inverse_dct(coefficients: &[f64; 64]) -> [f64; 64] {
    let basis = basis_table();
    let mut rows = [0.0; 64];
    for v in 0..8 {
        for x in 0..8 {
            rows[v * 8 + x] = (0..8).map(|u| coefficients[v * 8 + u] * basis[x][u]).sum();
        }
    }
    let mut out = [0.0; 64];
    for y in 0..8 {
        for x in 0..8 {
            let sum: f64 = (0..8).map(|v| rows[v * 8 + x] * basis[y][v]).sum();
            out[y * 8 + x] = sum / 4.0;
        }
    }
    out
}

/// JFIF RGB to YCbCr, rounded.
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.168736 * r - 0.331264 * g + 0.5 * b + 128.0;
    let cr = 0.5 * r - 0.418688 * g - 0.081312 * b + 128.0;
    [y, cb, cr].map(|v| v.round().clamp(0.0, 255.0) as u8)
}
