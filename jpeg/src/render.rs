// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Upsampling and color conversion of reconstructed planes into the
//! interleaved output buffer.

pub mod color;

use crate::{
    api::{JpegOutputFormat, JpegPixelFormat},
    error::{Error, Result},
    frame::Frame,
    headers::{AdobeHeader, MAX_COMPONENTS},
    image::Plane,
    util::{tracing_wrappers::*, try_filled_vec},
};

use color::{cmyk_to_rgb, ycbcr_to_rgb, ycck_to_cmyk};

/// Interpretation of the frame components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Gray,
    /// Two components, passed through unconverted.
    TwoChannel,
    Rgb,
    YCbCr,
    Cmyk,
    Ycck,
}

impl ColorMode {
    /// Three components are YCbCr unless told otherwise, four components are
    /// plain CMYK. A non-zero Adobe transform code always enables the
    /// transform.
    pub fn select(
        num_components: usize,
        adobe: Option<&AdobeHeader>,
        color_transform: Option<bool>,
    ) -> Result<ColorMode> {
        let transform = |default: bool| match adobe {
            Some(adobe) if adobe.transform_code != 0 => true,
            _ => color_transform.unwrap_or(default),
        };
        match num_components {
            1 => Ok(ColorMode::Gray),
            2 => Ok(ColorMode::TwoChannel),
            3 if transform(true) => Ok(ColorMode::YCbCr),
            3 => Ok(ColorMode::Rgb),
            4 if adobe.is_none() => Err(Error::UnsupportedCmykWithoutAdobe),
            4 if transform(false) => Ok(ColorMode::Ycck),
            4 => Ok(ColorMode::Cmyk),
            n => Err(Error::UnsupportedColorMode(n)),
        }
    }

    pub fn num_components(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::TwoChannel => 2,
            ColorMode::Rgb | ColorMode::YCbCr => 3,
            ColorMode::Cmyk | ColorMode::Ycck => 4,
        }
    }

    fn native_format(self) -> JpegPixelFormat {
        match self {
            ColorMode::Gray => JpegPixelFormat::Gray,
            ColorMode::TwoChannel => JpegPixelFormat::TwoChannel,
            ColorMode::Rgb | ColorMode::YCbCr => JpegPixelFormat::Rgb,
            ColorMode::Cmyk | ColorMode::Ycck => JpegPixelFormat::Cmyk,
        }
    }

    /// Converts the samples of one pixel to the native channels of the mode.
    #[inline]
    fn to_native(self, samples: [u8; MAX_COMPONENTS]) -> [u8; MAX_COMPONENTS] {
        let [y, cb, cr, k] = samples;
        match self {
            ColorMode::YCbCr => {
                let [r, g, b] = ycbcr_to_rgb(y, cb, cr);
                [r, g, b, 0]
            }
            ColorMode::Ycck => ycck_to_cmyk(y, cb, cr, k),
            _ => samples,
        }
    }
}

/// Maps output coordinates to plane coordinates of one component.
struct Sampler<'a> {
    plane: &'a Plane,
    v: usize,
    max_v: usize,
    columns: Vec<usize>,
}

impl<'a> Sampler<'a> {
    fn new(plane: &'a Plane, h: usize, v: usize, frame: &Frame) -> Result<Self> {
        let width = frame.header.width;
        let mut columns = try_filled_vec(width, 0)?;
        for (x, column) in columns.iter_mut().enumerate() {
            *column = x * h / frame.max_h;
        }
        Ok(Self {
            plane,
            v,
            max_v: frame.max_v,
            columns,
        })
    }

    #[inline]
    fn row(&self, y: usize) -> &'a [u8] {
        self.plane.row(y * self.v / self.max_v)
    }
}

/// Produces the interleaved pixels of the frame in the requested layout.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(frame, planes), err))]
pub fn render(
    frame: &Frame,
    planes: &[Plane],
    mode: ColorMode,
    output_format: JpegOutputFormat,
) -> Result<(JpegPixelFormat, Vec<u8>)> {
    let num_components = mode.num_components();
    if planes.len() != num_components {
        return Err(Error::UnsupportedColorMode(planes.len()));
    }
    let native = mode.native_format();
    let format = match (output_format, native) {
        (JpegOutputFormat::Native, native) => native,
        (_, JpegPixelFormat::TwoChannel) => {
            return Err(Error::UnsupportedConversion(num_components, "RGB"));
        }
        (JpegOutputFormat::Rgb, _) => JpegPixelFormat::Rgb,
        (JpegOutputFormat::Rgba, _) => JpegPixelFormat::Rgba,
    };

    let samplers = planes
        .iter()
        .zip(frame.components.iter())
        .map(|(plane, component)| {
            Sampler::new(
                plane,
                component.info.h as usize,
                component.info.v as usize,
                frame,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let (width, height) = (frame.header.width, frame.header.height);
    let channels = format.channels();
    let row_len = width * channels;
    let mut pixels = try_filled_vec(row_len * height, 0u8)?;
    debug!(width, height, ?mode, ?format, "render");

    let mut rows: [&[u8]; MAX_COMPONENTS] = [&[]; MAX_COMPONENTS];
    for (y, out_row) in pixels.chunks_exact_mut(row_len).enumerate() {
        for (row, sampler) in rows.iter_mut().zip(samplers.iter()) {
            *row = sampler.row(y);
        }
        for (x, out) in out_row.chunks_exact_mut(channels).enumerate() {
            let mut samples = [0u8; MAX_COMPONENTS];
            for ((sample, row), sampler) in samples.iter_mut().zip(rows.iter()).zip(samplers.iter())
            {
                *sample = row[sampler.columns[x]];
            }
            let pixel = mode.to_native(samples);
            match (format, native) {
                (JpegPixelFormat::Rgb | JpegPixelFormat::Rgba, JpegPixelFormat::Gray) => {
                    out[..3].fill(pixel[0]);
                }
                (JpegPixelFormat::Rgb | JpegPixelFormat::Rgba, JpegPixelFormat::Cmyk) => {
                    out[..3].copy_from_slice(&cmyk_to_rgb(pixel));
                }
                (JpegPixelFormat::Rgb | JpegPixelFormat::Rgba, _) => {
                    out[..3].copy_from_slice(&pixel[..3]);
                }
                _ => out.copy_from_slice(&pixel[..channels]),
            }
            if format == JpegPixelFormat::Rgba {
                out[3] = 255;
            }
        }
    }
    Ok((format, pixels))
}
