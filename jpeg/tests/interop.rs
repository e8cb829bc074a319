// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decodes streams from an independent encoder and compares the pixels with
//! an independent decoder. Chroma upsampling differs (the reference decoder
//! interpolates), so subsampled images get a looser bound on smooth content.

use jpeg::api::{JpegDecoder, JpegDecoderOptions, JpegOutputFormat, JpegPixelFormat};
use jpeg_decoder::PixelFormat;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use jpeg_test_utils::{CoefficientImage, JpegWriter};
use test_log::test;

const SIZES: [(usize, usize); 4] = [(33, 17), (64, 64), (100, 37), (1, 1)];

fn native() -> JpegDecoder {
    let mut options = JpegDecoderOptions::default();
    options.output_format = JpegOutputFormat::Native;
    JpegDecoder::new(options)
}

/// Gentle gradients; every channel changes by at most two levels per pixel.
fn smooth_rgb(width: usize, height: usize) -> Vec<u8> {
    (0..height)
        .flat_map(|y| {
            (0..width).flat_map(move |x| {
                [
                    (60 + x) as u8,
                    (80 + 2 * y) as u8,
                    (180 - (x + y) / 2) as u8,
                ]
            })
        })
        .collect()
}

fn smooth_gray(width: usize, height: usize) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (40 + x + y) as u8))
        .collect()
}

fn reference_decode(data: &[u8]) -> (PixelFormat, Vec<u8>) {
    let mut decoder = jpeg_decoder::Decoder::new(data);
    let pixels = decoder.decode().unwrap();
    (decoder.info().unwrap().pixel_format, pixels)
}

fn assert_close(ours: &[u8], reference: &[u8], max_error: u8, max_mean: f64, context: &str) {
    assert_eq!(ours.len(), reference.len(), "{context}");
    let mut max = 0;
    let mut sum = 0u64;
    for (&a, &b) in ours.iter().zip(reference.iter()) {
        let diff = a.abs_diff(b);
        max = max.max(diff);
        sum += diff as u64;
    }
    let mean = sum as f64 / ours.len() as f64;
    assert!(
        max <= max_error && mean <= max_mean,
        "{context}: max difference {max}, mean {mean:.3}"
    );
}

fn encode(
    pixels: &[u8],
    (width, height): (usize, usize),
    color_type: ColorType,
    sampling: SamplingFactor,
    progressive: bool,
    restart_interval: u16,
) -> Vec<u8> {
    let mut data = Vec::new();
    let mut encoder = Encoder::new(&mut data, 90);
    encoder.set_sampling_factor(sampling);
    encoder.set_progressive(progressive);
    encoder.set_restart_interval(restart_interval);
    encoder
        .encode(pixels, width as u16, height as u16, color_type)
        .unwrap();
    data
}

#[test]
fn external_encoder_gray() {
    let decoder = native();
    for size in SIZES {
        let gray = smooth_gray(size.0, size.1);
        for progressive in [false, true] {
            for restart_interval in [0, 3] {
                let context = format!("{size:?} progressive {progressive} rst {restart_interval}");
                let data = encode(
                    &gray,
                    size,
                    ColorType::Luma,
                    SamplingFactor::R_4_4_4,
                    progressive,
                    restart_interval,
                );
                let image = decoder.decode(&data).unwrap();
                assert_eq!((image.width, image.height), size);
                assert_eq!(image.format, JpegPixelFormat::Gray);
                let (format, reference) = reference_decode(&data);
                assert_eq!(format, PixelFormat::L8);
                assert_close(&image.pixels, &reference, 2, 0.5, &context);
            }
        }
    }
}

macro_rules! external_encoder_color {
    ($($name:ident: $sampling:expr, $max_error:expr, $max_mean:expr;)*) => {
        paste::paste! {
            $(
                #[test]
                fn [<external_encoder_ $name>]() {
                    let decoder = native();
                    for size in SIZES {
                        let rgb = smooth_rgb(size.0, size.1);
                        for progressive in [false, true] {
                            for restart_interval in [0, 3] {
                                let context = format!(
                                    "{size:?} progressive {progressive} rst {restart_interval}"
                                );
                                let data = encode(
                                    &rgb,
                                    size,
                                    ColorType::Rgb,
                                    $sampling,
                                    progressive,
                                    restart_interval,
                                );
                                let image = decoder.decode(&data).unwrap();
                                assert_eq!((image.width, image.height), size);
                                assert_eq!(image.format, JpegPixelFormat::Rgb);
                                let (format, reference) = reference_decode(&data);
                                assert_eq!(format, PixelFormat::RGB24);
                                assert_close(
                                    &image.pixels,
                                    &reference,
                                    $max_error,
                                    $max_mean,
                                    &context,
                                );
                                assert_close(&image.pixels, &rgb, 12, 3.0, &context);
                            }
                        }
                    }
                }
            )*
        }
    };
}

external_encoder_color! {
    yuv444: SamplingFactor::R_4_4_4, 5, 1.5;
    yuv420: SamplingFactor::R_4_2_0, 10, 2.0;
    yuv422: SamplingFactor::R_4_2_2, 10, 2.0;
    yuv440: SamplingFactor::R_4_4_0, 10, 2.0;
}

#[test]
fn successive_approximation_matches_reference_decoder() {
    let decoder = native();
    let (width, height) = (45, 30);
    let gray = smooth_gray(width, height);
    let image = CoefficientImage::from_gray(width, height, &gray, 85);
    for restart_interval in [0, 4] {
        let writer = JpegWriter {
            restart_interval,
            ..JpegWriter::progressive(1)
        };
        let data = writer.write(&image);
        let ours = decoder.decode(&data).unwrap();
        let (_, reference) = reference_decode(&data);
        assert_close(&ours.pixels, &reference, 2, 0.5, "gray");
    }

    let rgb = smooth_rgb(width, height);
    for sampling in [(1, 1), (2, 2), (2, 1)] {
        let image = CoefficientImage::from_rgb(width, height, &rgb, 85, sampling);
        let data = JpegWriter::progressive(3).write(&image);
        let ours = decoder.decode(&data).unwrap();
        let (format, reference) = reference_decode(&data);
        assert_eq!(format, PixelFormat::RGB24);
        let max_error = if sampling == (1, 1) { 5 } else { 10 };
        assert_close(
            &ours.pixels,
            &reference,
            max_error,
            2.0,
            &format!("{sampling:?}"),
        );
    }
}
