// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::api::JpegDecoderLimits;

/// Pixel layout requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JpegOutputFormat {
    /// Four interleaved channels with an opaque alpha.
    #[default]
    Rgba,
    Rgb,
    /// One channel per frame component: gray, two raw channels, RGB or CMYK.
    Native,
}

impl JpegOutputFormat {
    /// Number of interleaved channels produced for an image with the given
    /// number of components.
    pub fn channels(self, num_components: usize) -> usize {
        match self {
            JpegOutputFormat::Rgba => 4,
            JpegOutputFormat::Rgb => 3,
            JpegOutputFormat::Native => num_components,
        }
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct JpegDecoderOptions {
    /// Overrides the default YCbCr (3 components) or YCCK (4 components)
    /// interpretation. An Adobe segment with a non-zero transform code always
    /// enables the transform.
    pub color_transform: Option<bool>,
    pub output_format: JpegOutputFormat,
    pub limits: JpegDecoderLimits,
}

impl Default for JpegDecoderOptions {
    fn default() -> Self {
        Self {
            color_transform: None,
            output_format: JpegOutputFormat::Rgba,
            limits: JpegDecoderLimits::default_safe(),
        }
    }
}
