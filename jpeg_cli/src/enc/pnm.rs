// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use color_eyre::eyre::{Result, eyre};
use jpeg::api::{JpegImage, JpegPixelFormat};

fn tuple_type(format: JpegPixelFormat) -> &'static str {
    match format {
        JpegPixelFormat::Gray => "GRAYSCALE",
        JpegPixelFormat::TwoChannel => "GRAYSCALE_ALPHA",
        JpegPixelFormat::Rgb => "RGB",
        JpegPixelFormat::Rgba => "RGB_ALPHA",
        JpegPixelFormat::Cmyk => "CMYK",
    }
}

/// Writes binary PGM, PPM or PAM. PGM and PPM need gray and RGB pixels
/// respectively; PAM takes every pixel format.
pub fn to_pnm(image: &JpegImage, extension: Option<&str>) -> Result<Vec<u8>> {
    let mut ret = vec![];
    let (width, height) = (image.width, image.height);
    match (extension, image.format) {
        (Some("pgm"), JpegPixelFormat::Gray) => write!(&mut ret, "P5\n{width} {height}\n255\n")?,
        (Some("ppm"), JpegPixelFormat::Rgb) => write!(&mut ret, "P6\n{width} {height}\n255\n")?,
        (Some("pam"), format) => write!(
            &mut ret,
            "P7\nWIDTH {width}\nHEIGHT {height}\nDEPTH {}\nMAXVAL 255\nTUPLTYPE {}\nENDHDR\n",
            format.channels(),
            tuple_type(format)
        )?,
        (extension, format) => {
            return Err(eyre!(
                "Cannot write {format:?} pixels as {}",
                extension.unwrap_or("pnm")
            ));
        }
    }
    ret.extend_from_slice(&image.pixels);
    Ok(ret)
}

#[cfg(test)]
mod test {
    use super::*;
    use jpeg::api::JpegMetadata;

    fn image(format: JpegPixelFormat) -> JpegImage {
        JpegImage {
            width: 2,
            height: 1,
            format,
            pixels: vec![7; 2 * format.channels()],
            metadata: JpegMetadata::default(),
        }
    }

    #[test]
    fn headers() {
        let pgm = to_pnm(&image(JpegPixelFormat::Gray), Some("pgm")).unwrap();
        assert_eq!(pgm, b"P5\n2 1\n255\n\x07\x07");
        let ppm = to_pnm(&image(JpegPixelFormat::Rgb), Some("ppm")).unwrap();
        assert!(ppm.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(ppm.len(), 11 + 6);
        let pam = to_pnm(&image(JpegPixelFormat::Cmyk), Some("pam")).unwrap();
        assert!(pam.starts_with(b"P7\nWIDTH 2\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\nTUPLTYPE CMYK\n"));
    }

    #[test]
    fn mismatched_format() {
        assert!(to_pnm(&image(JpegPixelFormat::Rgba), Some("ppm")).is_err());
        assert!(to_pnm(&image(JpegPixelFormat::Rgb), Some("pgm")).is_err());
    }
}
