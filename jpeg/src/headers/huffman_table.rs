// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    entropy_coding::huffman::{HUFFMAN_MAX_BITS, HuffmanTable},
    error::{Error, Result},
    headers::SegmentReader,
    util::tracing_wrappers::*,
};

pub const NUM_HUFFMAN_TABLES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum TableClass {
    Dc = 0,
    Ac = 1,
}

impl TableClass {
    fn name(self) -> &'static str {
        match self {
            TableClass::Dc => "DC",
            TableClass::Ac => "AC",
        }
    }
}

/// The Huffman table slots of a decoder; DHT segments may redefine a slot
/// between scans.
#[derive(Debug)]
pub struct HuffmanTables {
    dc: [Option<HuffmanTable>; NUM_HUFFMAN_TABLES],
    ac: [Option<HuffmanTable>; NUM_HUFFMAN_TABLES],
}

impl Default for HuffmanTables {
    fn default() -> Self {
        HuffmanTables {
            dc: array_init::array_init(|_| None),
            ac: array_init::array_init(|_| None),
        }
    }
}

impl HuffmanTables {
    /// Builds every table of a DHT segment.
    pub fn read(&mut self, segment: &[u8]) -> Result<()> {
        let mut reader = SegmentReader::new(segment, "DHT");
        while !reader.is_empty() {
            let spec = reader.read_u8()?;
            let class =
                TableClass::from_u8(spec >> 4).ok_or(Error::InvalidTableSpec("Huffman", spec))?;
            let index = (spec & 15) as usize;
            if index >= NUM_HUFFMAN_TABLES {
                return Err(Error::InvalidTableSpec("Huffman", spec));
            }
            let mut counts = [0u8; HUFFMAN_MAX_BITS];
            counts.copy_from_slice(reader.read_bytes(HUFFMAN_MAX_BITS)?);
            let num_symbols = counts.iter().map(|&c| c as usize).sum();
            let symbols = reader.read_bytes(num_symbols)?;
            debug!(class = class.name(), index, num_symbols, "Huffman table");
            let table = HuffmanTable::build(&counts, symbols)?;
            match class {
                TableClass::Dc => self.dc[index] = Some(table),
                TableClass::Ac => self.ac[index] = Some(table),
            }
        }
        Ok(())
    }

    pub fn get(&self, class: TableClass, index: usize) -> Result<&HuffmanTable> {
        let slots = match class {
            TableClass::Dc => &self.dc,
            TableClass::Ac => &self.ac,
        };
        slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(Error::MissingHuffmanTable(class.name(), index))
    }
}
