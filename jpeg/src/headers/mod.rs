// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Payload decoding for the marker segments of a JPEG stream.

pub mod app_data;
pub mod frame_header;
pub mod huffman_table;
pub mod quant_table;
pub mod scan_header;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

pub use app_data::*;
pub use frame_header::*;
pub use huffman_table::*;
pub use quant_table::*;
pub use scan_header::*;

/// Cursor over the payload of a single marker segment.
pub struct SegmentReader<'a> {
    data: &'a [u8],
    position: usize,
    name: &'static str,
}

impl<'a> SegmentReader<'a> {
    /// `name` identifies the segment in truncation errors.
    pub fn new(data: &'a [u8], name: &'static str) -> SegmentReader<'a> {
        SegmentReader {
            data,
            position: 0,
            name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn read_bytes(&mut self, num: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(num)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::UnexpectedEof(self.name))?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }
}
