// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

mod decoder;
mod limits;
mod options;
mod output;

pub use decoder::*;
pub use limits::*;
pub use options::*;
pub use output::*;

use crate::error::Result;

/// Decodes a complete JPEG stream with the default options: RGBA output and
/// [`JpegDecoderLimits::default_safe`].
///
/// ```
/// assert!(jpeg::decode(b"not a jpeg").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<JpegImage> {
    JpegDecoder::default().decode(data)
}
