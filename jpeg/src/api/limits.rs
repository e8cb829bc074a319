// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Resource limits checked before the decoder allocates frame-sized buffers.

use crate::{
    BLOCK_DIM, BLOCK_SIZE,
    api::JpegOutputFormat,
    error::{Error, Result},
    headers::FrameHeader,
    util::tracing_wrappers::*,
};

const PIXELS_PER_MEGAPIXEL: f64 = 1e6;
const BYTES_PER_MB: u64 = 1 << 20;

/// Configurable resource limits for the JPEG decoder.
///
/// The limits are evaluated once per decode call, from the frame header,
/// before any coefficient storage is allocated. A failing check aborts the
/// call with [`Error::ResolutionLimitExceeded`] or
/// [`Error::MemoryLimitExceeded`]; nothing is retained between calls.
///
/// # Example
///
/// ```
/// use jpeg::api::JpegDecoderLimits;
///
/// // 100 megapixels and 512MB, the default
/// let limits = JpegDecoderLimits::default_safe();
///
/// // Trusted content only
/// let limits = JpegDecoderLimits::unlimited();
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct JpegDecoderLimits {
    /// Maximum number of pixels (width * height), in millions.
    /// Default: `Some(100.0)`.
    pub max_megapixels: Option<f64>,

    /// Maximum projected memory use in MiB. The projection covers the
    /// coefficient storage, the reconstructed sample planes, the upsampling
    /// lookup tables and the output buffer.
    /// Default: `Some(512)`.
    pub max_memory_mb: Option<u64>,
}

impl Default for JpegDecoderLimits {
    fn default() -> Self {
        Self::default_safe()
    }
}

impl JpegDecoderLimits {
    /// Returns limits suitable for general use: 100 megapixels and 512MB.
    pub fn default_safe() -> Self {
        Self {
            max_megapixels: Some(100.0),
            max_memory_mb: Some(512),
        }
    }

    /// Returns limits with all restrictions disabled.
    ///
    /// Use only for trusted content where resource limits are not a concern.
    pub fn unlimited() -> Self {
        Self {
            max_megapixels: None,
            max_memory_mb: None,
        }
    }
}

/// Per-call admission check for a frame.
#[derive(Debug)]
pub struct ResourceGuard<'a> {
    limits: &'a JpegDecoderLimits,
    output_format: JpegOutputFormat,
}

impl<'a> ResourceGuard<'a> {
    pub fn new(limits: &'a JpegDecoderLimits, output_format: JpegOutputFormat) -> Self {
        Self {
            limits,
            output_format,
        }
    }

    /// Bytes the decode call would need for a frame with this header.
    pub fn projected_bytes(&self, header: &FrameHeader) -> u64 {
        let mut total = 0u64;
        for component in header.components.iter() {
            let geometry = header.block_geometry(component);
            let coefficients = geometry.num_blocks_for_mcu() as u64 * BLOCK_SIZE as u64 * 4;
            let plane = (geometry.blocks_per_line * BLOCK_DIM) as u64
                * (geometry.blocks_per_column * BLOCK_DIM) as u64;
            // Column lookup table used while upsampling.
            let columns = header.width as u64 * size_of::<usize>() as u64;
            total += coefficients + plane + columns;
        }
        let channels = self.output_format.channels(header.components.len()) as u64;
        total + header.width as u64 * header.height as u64 * channels
    }

    pub fn check(&self, header: &FrameHeader) -> Result<()> {
        let pixels = header.width as u64 * header.height as u64;
        if let Some(max_megapixels) = self.limits.max_megapixels {
            let max_pixels = max_megapixels * PIXELS_PER_MEGAPIXEL;
            if pixels as f64 > max_pixels {
                let excess = pixels as f64 - max_pixels;
                let excess_mp = (excess / PIXELS_PER_MEGAPIXEL).ceil() as u64;
                warn!(pixels, max_megapixels, "resolution limit exceeded");
                return Err(Error::ResolutionLimitExceeded(excess_mp));
            }
        }
        if let Some(max_memory_mb) = self.limits.max_memory_mb {
            let projected = self.projected_bytes(header);
            let budget = max_memory_mb.saturating_mul(BYTES_PER_MB);
            debug!(projected, budget, "memory projection");
            if projected > budget {
                let excess_mb = (projected - budget).div_ceil(BYTES_PER_MB);
                return Err(Error::MemoryLimitExceeded(excess_mb));
            }
        }
        Ok(())
    }
}
