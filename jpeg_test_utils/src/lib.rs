// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Helpers for the decoder tests: an approximate comparison macro and a
//! small encoder that writes baseline and progressive JPEG streams.

pub mod coefficients;
pub mod dct;
pub mod huffman;
pub mod tables;
pub mod writer;

pub use coefficients::{CoefficientImage, ComponentSpec};
pub use writer::{Coding, JpegWriter, ScanSpec, TableMode, segment};

#[rustfmt::skip]
pub const ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

/// Deterministic test image with smooth gradients and some texture.
pub fn test_pattern_rgb(width: usize, height: usize, seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height * 3);
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    for y in 0..height {
        for x in 0..width {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = (state % 24) as usize;
            out.push(((x * 255) / width.max(1) + noise).min(255) as u8);
            out.push(((y * 255) / height.max(1) + noise / 2).min(255) as u8);
            out.push((((x + y) * 7) % 256) as u8);
        }
    }
    out
}
