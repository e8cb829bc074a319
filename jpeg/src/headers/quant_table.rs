// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    BLOCK_SIZE, ZIGZAG,
    error::{Error, Result},
    headers::SegmentReader,
    util::tracing_wrappers::*,
};

pub const NUM_QUANT_TABLES: usize = 4;

/// Quantization steps in natural (row-major) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    pub values: [u16; BLOCK_SIZE],
}

impl QuantTable {
    /// Reads every table of a DQT segment into its slot, replacing any
    /// previous definition.
    pub fn read_all(
        segment: &[u8],
        slots: &mut [Option<QuantTable>; NUM_QUANT_TABLES],
    ) -> Result<()> {
        let mut reader = SegmentReader::new(segment, "DQT");
        while !reader.is_empty() {
            let spec = reader.read_u8()?;
            let index = (spec & 15) as usize;
            if index >= NUM_QUANT_TABLES {
                return Err(Error::InvalidTableSpec("quantization", spec));
            }
            let mut values = [0u16; BLOCK_SIZE];
            match spec >> 4 {
                0 => {
                    for &position in ZIGZAG.iter() {
                        values[position] = reader.read_u8()? as u16;
                    }
                }
                1 => {
                    for &position in ZIGZAG.iter() {
                        values[position] = reader.read_u16()?;
                    }
                }
                _ => return Err(Error::InvalidTableSpec("quantization", spec)),
            }
            debug!(index, precision = spec >> 4, "quantization table");
            slots[index] = Some(QuantTable { values });
        }
        Ok(())
    }
}
