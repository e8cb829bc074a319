// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Integer inverse DCT after Loeffler, Ligtenberg and Moschytz, "Practical
//! Fast 1-D DCT Algorithms with 11 Multiplications", ICASSP 1989.
//!
//! Constants are scaled by 4096 and every stage rounds exactly as below;
//! results are bit-exact with other decoders that use this factorization.
//! Arithmetic wraps at 32 bits.

use std::num::Wrapping;

use crate::{BLOCK_DIM, BLOCK_SIZE};

type W = Wrapping<i32>;

const COS1: W = Wrapping(4017); // cos(pi/16)
const SIN1: W = Wrapping(799); // sin(pi/16)
const COS3: W = Wrapping(3406); // cos(3*pi/16)
const SIN3: W = Wrapping(2276); // sin(3*pi/16)
const COS6: W = Wrapping(1567); // cos(6*pi/16)
const SIN6: W = Wrapping(3784); // sin(6*pi/16)
const SQRT2: W = Wrapping(5793); // sqrt(2)
const SQRT1D2: W = Wrapping(2896); // sqrt(2) / 2
const ONE: W = Wrapping(1);

/// Rounding of one of the two 1-D passes.
struct Pass {
    dc_round: W,
    dc_shift: usize,
    round: W,
    shift: usize,
    odd_shift: usize,
}

const ROWS: Pass = Pass {
    dc_round: Wrapping(512),
    dc_shift: 10,
    round: Wrapping(128),
    shift: 8,
    odd_shift: 4,
};

const COLUMNS: Pass = Pass {
    dc_round: Wrapping(8192),
    dc_shift: 14,
    round: Wrapping(2048),
    shift: 12,
    odd_shift: 0,
};

fn idct_1d(p: &mut [W; BLOCK_DIM], pass: &Pass) {
    if p[1..].iter().all(|v| v.0 == 0) {
        let t = (SQRT2 * p[0] + pass.dc_round) >> pass.dc_shift;
        p.fill(t);
        return;
    }

    // stage 4
    let mut v0 = (SQRT2 * p[0] + pass.round) >> pass.shift;
    let mut v1 = (SQRT2 * p[4] + pass.round) >> pass.shift;
    let mut v2 = p[2];
    let mut v3 = p[6];
    let mut v4 = (SQRT1D2 * (p[1] - p[7]) + pass.round) >> pass.shift;
    let mut v7 = (SQRT1D2 * (p[1] + p[7]) + pass.round) >> pass.shift;
    let mut v5 = p[3] << pass.odd_shift;
    let mut v6 = p[5] << pass.odd_shift;

    // stage 3
    let t = (v0 - v1 + ONE) >> 1;
    v0 = (v0 + v1 + ONE) >> 1;
    v1 = t;
    let t = (v2 * SIN6 + v3 * COS6 + pass.round) >> pass.shift;
    v2 = (v2 * COS6 - v3 * SIN6 + pass.round) >> pass.shift;
    v3 = t;
    let t = (v4 - v6 + ONE) >> 1;
    v4 = (v4 + v6 + ONE) >> 1;
    v6 = t;
    let t = (v7 + v5 + ONE) >> 1;
    v5 = (v7 - v5 + ONE) >> 1;
    v7 = t;

    // stage 2
    let t = (v0 - v3 + ONE) >> 1;
    v0 = (v0 + v3 + ONE) >> 1;
    v3 = t;
    let t = (v1 - v2 + ONE) >> 1;
    v1 = (v1 + v2 + ONE) >> 1;
    v2 = t;
    let t = (v4 * SIN3 + v7 * COS3 + Wrapping(2048)) >> 12;
    v4 = (v4 * COS3 - v7 * SIN3 + Wrapping(2048)) >> 12;
    v7 = t;
    let t = (v5 * SIN1 + v6 * COS1 + Wrapping(2048)) >> 12;
    v5 = (v5 * COS1 - v6 * SIN1 + Wrapping(2048)) >> 12;
    v6 = t;

    // stage 1
    *p = [
        v0 + v7,
        v1 + v6,
        v2 + v5,
        v3 + v4,
        v3 - v4,
        v2 - v5,
        v1 - v6,
        v0 - v7,
    ];
}

/// Multiplies `coefficients` (natural order) by `quant` and inverse
/// transforms them into level-shifted, clamped samples.
pub fn dequantize_and_idct(
    coefficients: &[i32],
    quant: &[u16; BLOCK_SIZE],
    out: &mut [u8; BLOCK_SIZE],
) {
    let mut p = [Wrapping(0i32); BLOCK_SIZE];
    for ((dst, &c), &q) in p.iter_mut().zip(coefficients).zip(quant) {
        *dst = Wrapping(c) * Wrapping(q as i32);
    }

    let mut line = [Wrapping(0i32); BLOCK_DIM];
    for row in p.chunks_exact_mut(BLOCK_DIM) {
        line.copy_from_slice(row);
        idct_1d(&mut line, &ROWS);
        row.copy_from_slice(&line);
    }
    for col in 0..BLOCK_DIM {
        for (i, v) in line.iter_mut().enumerate() {
            *v = p[i * BLOCK_DIM + col];
        }
        idct_1d(&mut line, &COLUMNS);
        for (i, v) in line.iter().enumerate() {
            p[i * BLOCK_DIM + col] = *v;
        }
    }

    for (out, v) in out.iter_mut().zip(p.iter()) {
        let sample = 128 + ((*v + Wrapping(8)) >> 4).0;
        *out = sample.clamp(0, 255) as u8;
    }
}

#[cfg(test)]
mod test {
    use rand::{Rng, SeedableRng};
    use test_log::test;

    use super::*;
    use jpeg_test_utils::{assert_almost_eq, dct::inverse_dct};

    fn reference_idct(coefficients: &[i32; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        let samples = inverse_dct(&coefficients.map(|c| c as f64));
        samples.map(|s| (s + 128.0).round().clamp(0.0, 255.0) as u8)
    }

    #[test]
    fn flat_blocks() {
        let quant = [1u16; BLOCK_SIZE];
        let mut out = [0u8; BLOCK_SIZE];
        for (dc, expected) in [(0, 128), (8, 129), (-1024, 0), (1016, 255), (2000, 255)] {
            let mut coefficients = [0i32; BLOCK_SIZE];
            coefficients[0] = dc;
            dequantize_and_idct(&coefficients, &quant, &mut out);
            assert_eq!(out, [expected; BLOCK_SIZE], "dc {dc}");
        }
    }

    #[test]
    fn dequantizes() {
        let mut quant = [1u16; BLOCK_SIZE];
        quant[0] = 16;
        let mut coefficients = [0i32; BLOCK_SIZE];
        coefficients[0] = 5;
        let mut out = [0u8; BLOCK_SIZE];
        dequantize_and_idct(&coefficients, &quant, &mut out);
        assert_eq!(out, [138; BLOCK_SIZE]);
    }

    #[test]
    fn close_to_float_transform() {
        let mut rng = rand_xorshift::XorShiftRng::seed_from_u64(7);
        let quant = [1u16; BLOCK_SIZE];
        let mut out = [0u8; BLOCK_SIZE];
        for _ in 0..100 {
            let mut coefficients = [0i32; BLOCK_SIZE];
            for (k, c) in coefficients.iter_mut().enumerate() {
                let range = if k < 16 { 120 } else { 20 };
                *c = rng.random_range(-range..=range);
            }
            dequantize_and_idct(&coefficients, &quant, &mut out);
            let expected = reference_idct(&coefficients);
            for (&a, &b) in out.iter().zip(expected.iter()) {
                assert_almost_eq!(a as i32, b as i32, 3);
            }
        }
    }

    #[test]
    fn extreme_values_do_not_panic() {
        let quant = [u16::MAX; BLOCK_SIZE];
        let coefficients = [i32::MAX; BLOCK_SIZE];
        let mut out = [0u8; BLOCK_SIZE];
        dequantize_and_idct(&coefficients, &quant, &mut out);
        let coefficients = [i32::MIN; BLOCK_SIZE];
        dequantize_and_idct(&coefficients, &quant, &mut out);
    }
}
