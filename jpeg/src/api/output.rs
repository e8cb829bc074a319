// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::headers::{AdobeHeader, JfifHeader};

/// Channel layout of [`JpegImage::pixels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegPixelFormat {
    Gray,
    /// Both components of a two-component image, unconverted.
    TwoChannel,
    Rgb,
    Rgba,
    Cmyk,
}

impl JpegPixelFormat {
    pub fn channels(self) -> usize {
        match self {
            JpegPixelFormat::Gray => 1,
            JpegPixelFormat::TwoChannel => 2,
            JpegPixelFormat::Rgb => 3,
            JpegPixelFormat::Rgba | JpegPixelFormat::Cmyk => 4,
        }
    }
}

/// Metadata segments found in the stream. When a segment kind repeats, the
/// last occurrence is kept; comments are kept in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JpegMetadata {
    pub jfif: Option<JfifHeader>,
    pub adobe: Option<AdobeHeader>,
    pub comments: Vec<String>,
    /// APP1 payload following the `Exif\0` identifier, unmodified.
    pub exif: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct JpegImage {
    pub width: usize,
    pub height: usize,
    pub format: JpegPixelFormat,
    /// Interleaved rows of `width * channels()` bytes, top to bottom.
    pub pixels: Vec<u8>,
    pub metadata: JpegMetadata,
}

impl JpegImage {
    pub fn channels(&self) -> usize {
        self.format.channels()
    }
}
