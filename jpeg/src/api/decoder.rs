// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    api::{JpegDecoderOptions, JpegImage, ResourceGuard},
    container::ContainerParser,
    error::Result,
    render::{ColorMode, render},
    util::tracing_wrappers::*,
    var_dct::reconstruct_frame,
};

/// Single-shot JPEG decoder. Holds only configuration, so one value may be
/// shared between threads.
#[derive(Debug, Clone, Default)]
pub struct JpegDecoder {
    options: JpegDecoderOptions,
}

impl JpegDecoder {
    pub fn new(options: JpegDecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JpegDecoderOptions {
        &self.options
    }

    /// Decodes a complete JPEG stream.
    #[cfg_attr(feature = "tracing", instrument(skip_all, err))]
    pub fn decode(&self, data: &[u8]) -> Result<JpegImage> {
        let guard = ResourceGuard::new(&self.options.limits, self.options.output_format);
        let parsed = ContainerParser::new(data, &guard).parse()?;
        let frame = &parsed.frame;
        // Checked before reconstruction so that unsupported images fail early.
        let mode = ColorMode::select(
            frame.components.len(),
            parsed.metadata.adobe.as_ref(),
            self.options.color_transform,
        )?;
        let planes = reconstruct_frame(frame, &parsed.quant_tables)?;
        let (format, pixels) = render(frame, &planes, mode, self.options.output_format)?;
        debug!(?format, len = pixels.len(), "decoded");
        Ok(JpegImage {
            width: frame.header.width,
            height: frame.header.height,
            format,
            pixels,
            metadata: parsed.metadata,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JpegDecoder>();
    }
}
