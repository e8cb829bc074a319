// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util::tracing_wrappers::*,
};

/// Largest size category an 8-bit or 12-bit stream can legally code.
pub const MAX_COEFFICIENT_BITS: u32 = 16;

/// Reads bits MSB-first from the entropy-coded data of a scan, removing
/// stuffed zero bytes.
///
/// When a restart marker is reached in the middle of the data, the reader
/// stops in front of it and yields zero bits until [`BitReader::reset`] is
/// called. Any other marker is an error.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    current: u8,
    bits_left: u32,
    at_restart_marker: bool,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} bytes], position: {}, bits_left: {}, at_restart_marker: {} }}",
            self.data.len(),
            self.position,
            self.bits_left,
            self.at_restart_marker
        )
    }
}

impl<'a> BitReader<'a> {
    /// Constructs a BitReader starting at byte `position` of `data`.
    pub fn new(data: &'a [u8], position: usize) -> BitReader<'a> {
        BitReader {
            data,
            position,
            current: 0,
            bits_left: 0,
            at_restart_marker: false,
        }
    }

    /// Byte offset of the first byte that has not been loaded yet.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Discards buffered bits and forgets a pending restart marker, moving the
    /// reader to `position`.
    pub fn reset(&mut self, position: usize) {
        self.position = position;
        self.bits_left = 0;
        self.at_restart_marker = false;
    }

    fn next_byte(&mut self) -> Result<u8> {
        if self.at_restart_marker {
            return Ok(0);
        }
        let byte = *self
            .data
            .get(self.position)
            .ok_or(Error::UnexpectedEndOfScan)?;
        if byte != 0xFF {
            self.position += 1;
            return Ok(byte);
        }
        let next = *self
            .data
            .get(self.position + 1)
            .ok_or(Error::UnexpectedEndOfScan)?;
        match next {
            0x00 => {
                self.position += 2;
                Ok(byte)
            }
            0xD0..=0xD7 => {
                trace!(position = self.position, "restart marker inside interval");
                self.at_restart_marker = true;
                Ok(0)
            }
            _ => Err(Error::UnexpectedMarker(next)),
        }
    }

    /// Reads a single bit.
    /// ```
    /// # use jpeg::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0b1010_0000], 0);
    /// assert_eq!(br.read_bit()?, 1);
    /// assert_eq!(br.read_bit()?, 0);
    /// assert_eq!(br.read_bit()?, 1);
    /// # Ok::<(), jpeg::error::Error>(())
    /// ```
    #[inline]
    pub fn read_bit(&mut self) -> Result<u32> {
        if self.bits_left == 0 {
            self.current = self.next_byte()?;
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        Ok(((self.current >> self.bits_left) & 1) as u32)
    }

    /// Reads `num` bits as an unsigned value, most significant bit first.
    /// ```
    /// # use jpeg::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0xFF, 0x00, 0x5A], 0);
    /// assert_eq!(br.receive(4)?, 0xF);
    /// assert_eq!(br.receive(8)?, 0xF5);
    /// assert_eq!(br.position(), 3);
    /// # Ok::<(), jpeg::error::Error>(())
    /// ```
    pub fn receive(&mut self, num: u32) -> Result<u32> {
        let mut value = 0;
        for _ in 0..num {
            value = (value << 1) | self.read_bit()?;
        }
        Ok(value)
    }

    /// Reads a `num`-bit magnitude and maps it to a signed value: the upper
    /// half of the range is positive, the lower half negative.
    pub fn receive_extend(&mut self, num: u32) -> Result<i32> {
        if num == 0 {
            return Ok(0);
        }
        if num > MAX_COEFFICIENT_BITS {
            return Err(Error::InvalidCoefficientSize(num));
        }
        let value = self.receive(num)? as i32;
        if value >= 1 << (num - 1) {
            Ok(value)
        } else {
            Ok(value + (-1 << num) + 1)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn extend_maps_halves() {
        // 3-bit codes: 000..011 are -7..-4, 100..111 are 4..7.
        let mut br = BitReader::new(&[0b000_011_10, 0b0_111_0000], 0);
        assert_eq!(br.receive_extend(3).unwrap(), -7);
        assert_eq!(br.receive_extend(3).unwrap(), -4);
        assert_eq!(br.receive_extend(3).unwrap(), 4);
        assert_eq!(br.receive_extend(3).unwrap(), 7);
        assert_eq!(br.receive_extend(0).unwrap(), 0);
    }

    #[test]
    fn single_bit_extend() {
        let mut br = BitReader::new(&[0b1000_0000], 0);
        assert_eq!(br.receive_extend(1).unwrap(), 1);
        assert_eq!(br.receive_extend(1).unwrap(), -1);
    }

    #[test]
    fn oversized_category_is_rejected() {
        let mut br = BitReader::new(&[0; 8], 0);
        assert!(matches!(
            br.receive_extend(17),
            Err(Error::InvalidCoefficientSize(17))
        ));
    }

    #[test]
    fn end_of_data() {
        let mut br = BitReader::new(&[0xAB], 0);
        assert_eq!(br.receive(8).unwrap(), 0xAB);
        assert!(matches!(br.read_bit(), Err(Error::UnexpectedEndOfScan)));
    }

    #[test]
    fn unexpected_marker() {
        let mut br = BitReader::new(&[0x12, 0xFF, 0xD9], 0);
        assert_eq!(br.receive(8).unwrap(), 0x12);
        assert!(matches!(br.read_bit(), Err(Error::UnexpectedMarker(0xD9))));
    }

    #[test]
    fn restart_marker_yields_zeros() {
        let mut br = BitReader::new(&[0xFF, 0x00, 0xFF, 0xD3, 0x80], 0);
        assert_eq!(br.receive(8).unwrap(), 0xFF);
        assert_eq!(br.receive(16).unwrap(), 0);
        // Stopped in front of the marker.
        assert_eq!(br.position(), 2);
        br.reset(4);
        assert_eq!(br.read_bit().unwrap(), 1);
    }

    #[test]
    fn reset_drops_partial_byte() {
        let mut br = BitReader::new(&[0xF0, 0x0F], 0);
        assert_eq!(br.receive(2).unwrap(), 0b11);
        let position = br.position();
        br.reset(position);
        assert_eq!(br.receive(8).unwrap(), 0x0F);
    }

    #[test]
    fn receive_matches_bytes() {
        arbtest::arbtest(|u| {
            let bytes: Vec<u8> = u.arbitrary()?;
            let bytes: Vec<u8> = bytes.into_iter().filter(|&b| b != 0xFF).collect();
            let mut br = BitReader::new(&bytes, 0);
            for &byte in bytes.iter() {
                let high = br.receive(3).unwrap();
                let low = br.receive(5).unwrap();
                assert_eq!((high << 5) | low, byte as u32);
            }
            assert_eq!(br.position(), bytes.len());
            Ok(())
        });
    }
}
