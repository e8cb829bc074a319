// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Per-pixel color conversions. Results are clamped to [0, 255] and
//! truncated towards zero.

#[inline]
fn clamp_to_8bit(value: f64) -> f64 {
    value.clamp(0.0, 255.0)
}

#[inline]
fn ycbcr_to_rgb_f64(y: u8, cb: u8, cr: u8) -> [f64; 3] {
    let (y, cb, cr) = (y as f64, cb as f64 - 128.0, cr as f64 - 128.0);
    [
        clamp_to_8bit(y + 1.402 * cr),
        clamp_to_8bit(y - 0.3441363 * cb - 0.71413636 * cr),
        clamp_to_8bit(y + 1.772 * cb),
    ]
}

#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    ycbcr_to_rgb_f64(y, cb, cr).map(|v| v as u8)
}

/// The inverted RGB of the first three channels becomes CMY; K is kept.
#[inline]
pub fn ycck_to_cmyk(y: u8, cb: u8, cr: u8, k: u8) -> [u8; 4] {
    let [r, g, b] = ycbcr_to_rgb_f64(y, cb, cr).map(|v| (255.0 - v) as u8);
    [r, g, b, k]
}

#[inline]
pub fn cmyk_to_rgb(cmyk: [u8; 4]) -> [u8; 3] {
    let k = cmyk[3] as f64;
    let [c, m, y, _] = cmyk;
    [c, m, y].map(|v| (255.0 - clamp_to_8bit(v as f64 * (1.0 - k / 255.0) + k)) as u8)
}
