// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use color_eyre::eyre::{Result, eyre};
use jpeg::api::{JpegImage, JpegPixelFormat};

fn png_color(format: JpegPixelFormat) -> Result<png::ColorType> {
    match format {
        JpegPixelFormat::Gray => Ok(png::ColorType::Grayscale),
        JpegPixelFormat::TwoChannel => Ok(png::ColorType::GrayscaleAlpha),
        JpegPixelFormat::Rgb => Ok(png::ColorType::Rgb),
        JpegPixelFormat::Rgba => Ok(png::ColorType::Rgba),
        JpegPixelFormat::Cmyk => Err(eyre!("PNG cannot store CMYK pixels, use .pam")),
    }
}

pub fn to_png<Writer: Write>(image: &JpegImage, buf: &mut Writer) -> Result<()> {
    let mut encoder = png::Encoder::new(buf, image.width as u32, image.height as u32);
    encoder.set_color(png_color(image.format)?);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    writer.finish()?;
    Ok(())
}
