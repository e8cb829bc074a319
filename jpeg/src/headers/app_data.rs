// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Metadata carried in APPn and COM segments.

use byteorder::{BigEndian, ByteOrder};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{error::Result, util::try_to_vec};

const JFIF_IDENTIFIER: &[u8] = b"JFIF\0";
const EXIF_IDENTIFIER: &[u8] = b"Exif\0";
const ADOBE_IDENTIFIER: &[u8] = b"Adobe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum DensityUnits {
    AspectRatio = 0,
    PixelsPerInch = 1,
    PixelsPerCentimeter = 2,
}

/// Contents of a JFIF APP0 segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JfifHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub density_units: u8,
    pub x_density: u16,
    pub y_density: u16,
    pub thumb_width: u8,
    pub thumb_height: u8,
    /// Packed RGB thumbnail; shorter than `3 * thumb_width * thumb_height`
    /// when the segment is truncated.
    pub thumb_data: Vec<u8>,
}

impl JfifHeader {
    /// Returns `None` if the payload is not a JFIF header.
    pub fn read(payload: &[u8]) -> Result<Option<JfifHeader>> {
        if !payload.starts_with(JFIF_IDENTIFIER) || payload.len() < 14 {
            return Ok(None);
        }
        let thumb_width = payload[12];
        let thumb_height = payload[13];
        let thumb_len = 3 * thumb_width as usize * thumb_height as usize;
        let thumb_end = (14 + thumb_len).min(payload.len());
        Ok(Some(JfifHeader {
            version_major: payload[5],
            version_minor: payload[6],
            density_units: payload[7],
            x_density: BigEndian::read_u16(&payload[8..10]),
            y_density: BigEndian::read_u16(&payload[10..12]),
            thumb_width,
            thumb_height,
            thumb_data: try_to_vec(&payload[14..thumb_end])?,
        }))
    }

    pub fn units(&self) -> Option<DensityUnits> {
        DensityUnits::from_u8(self.density_units)
    }
}

/// Color transform signalled by an Adobe APP14 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum AdobeTransform {
    /// RGB or CMYK, no transform.
    None = 0,
    YCbCr = 1,
    Ycck = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdobeHeader {
    pub version: u8,
    pub flags0: u16,
    pub flags1: u16,
    pub transform_code: u8,
}

impl AdobeHeader {
    /// Returns `None` if the payload is not an Adobe header.
    pub fn read(payload: &[u8]) -> Option<AdobeHeader> {
        if !payload.starts_with(ADOBE_IDENTIFIER) || payload.len() < 12 || payload[5] != 0 {
            return None;
        }
        Some(AdobeHeader {
            version: payload[6],
            flags0: BigEndian::read_u16(&payload[7..9]),
            flags1: BigEndian::read_u16(&payload[9..11]),
            transform_code: payload[11],
        })
    }

    pub fn transform(&self) -> Option<AdobeTransform> {
        AdobeTransform::from_u8(self.transform_code)
    }
}

/// Returns the bytes following the `Exif\0` identifier of an APP1 payload.
pub fn exif_payload(payload: &[u8]) -> Option<&[u8]> {
    payload.strip_prefix(EXIF_IDENTIFIER)
}

/// COM payloads are interpreted as Latin-1.
pub fn read_comment(payload: &[u8]) -> String {
    payload.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn jfif_with_thumbnail() {
        let mut payload = b"JFIF\0".to_vec();
        payload.extend([1, 2, 1, 0, 72, 0, 96, 2, 1]);
        payload.extend(0..6u8);
        let jfif = JfifHeader::read(&payload).unwrap().unwrap();
        assert_eq!((jfif.version_major, jfif.version_minor), (1, 2));
        assert_eq!(jfif.units(), Some(DensityUnits::PixelsPerInch));
        assert_eq!((jfif.x_density, jfif.y_density), (72, 96));
        assert_eq!(jfif.thumb_data, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn truncated_thumbnail_is_clamped() {
        let mut payload = b"JFIF\0".to_vec();
        payload.extend([1, 1, 0, 0, 1, 0, 1, 4, 4]);
        payload.extend([9, 9]);
        let jfif = JfifHeader::read(&payload).unwrap().unwrap();
        assert_eq!(jfif.thumb_data, vec![9, 9]);
    }

    #[test]
    fn not_jfif() {
        assert_eq!(JfifHeader::read(b"JFXX\0abcdefghi").unwrap(), None);
        assert_eq!(JfifHeader::read(b"JFIF\0").unwrap(), None);
    }

    #[test]
    fn adobe() {
        let payload = [b'A', b'd', b'o', b'b', b'e', 0, 100, 0x80, 0, 0, 1, 2];
        let adobe = AdobeHeader::read(&payload).unwrap();
        assert_eq!(adobe.version, 100);
        assert_eq!(adobe.flags0, 0x8000);
        assert_eq!(adobe.flags1, 1);
        assert_eq!(adobe.transform(), Some(AdobeTransform::Ycck));
        assert_eq!(AdobeHeader::read(&payload[..11]), None);
    }

    #[test]
    fn exif_and_comment() {
        assert_eq!(exif_payload(b"Exif\0\0MM"), Some(&b"\0MM"[..]));
        assert_eq!(exif_payload(b"http://ns.adobe.com"), None);
        assert_eq!(read_comment(&[b'c', 0xE9]), "c\u{e9}");
    }
}
