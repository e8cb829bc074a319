// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use jpeg::api::{JpegDecoder, JpegDecoderLimits, JpegDecoderOptions, JpegOutputFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut options = JpegDecoderOptions::default();
    options.limits = JpegDecoderLimits {
        max_megapixels: Some(16.0),
        max_memory_mb: Some(256),
    };
    // The first byte picks the output conversion.
    let Some((&selector, data)) = data.split_first() else {
        return;
    };
    options.output_format = match selector % 3 {
        0 => JpegOutputFormat::Rgba,
        1 => JpegOutputFormat::Rgb,
        _ => JpegOutputFormat::Native,
    };
    options.color_transform = match selector / 3 % 3 {
        0 => None,
        1 => Some(true),
        _ => Some(false),
    };
    let _ = JpegDecoder::new(options).decode(data);
});
