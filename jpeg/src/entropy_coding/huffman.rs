// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
};

pub const HUFFMAN_MAX_BITS: usize = 16;
pub const HUFFMAN_MAX_SYMBOLS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HuffmanNode {
    Vacant,
    Leaf(u8),
    Branch(u16),
}

/// A code assigned to a symbol by canonical construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanCode {
    pub length: u8,
    pub code: u16,
    pub symbol: u8,
}

/// Binary decoding tree stored as a flat array; each entry holds the two
/// children of an inner node and entry 0 is the root.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    nodes: Vec<[HuffmanNode; 2]>,
    codes: Vec<HuffmanCode>,
}

impl HuffmanTable {
    /// Builds the table from the number of codes of each length 1..=16 and the
    /// symbols in code order.
    pub fn build(counts: &[u8; HUFFMAN_MAX_BITS], symbols: &[u8]) -> Result<HuffmanTable> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total == 0 {
            return Err(Error::InvalidHuffmanTable("no codes"));
        }
        if total > HUFFMAN_MAX_SYMBOLS {
            return Err(Error::InvalidHuffmanTable("too many symbols"));
        }
        if total != symbols.len() {
            return Err(Error::InvalidHuffmanTable(
                "symbol count does not match code lengths",
            ));
        }

        let mut table = HuffmanTable {
            nodes: vec![[HuffmanNode::Vacant; 2]],
            codes: Vec::with_capacity(total),
        };
        let mut symbols = symbols.iter();
        let mut code = 0u32;
        for (length, &count) in (1..=HUFFMAN_MAX_BITS).zip(counts.iter()) {
            for _ in 0..count {
                if code >= 1 << length {
                    return Err(Error::InvalidHuffmanTable("code space over-subscribed"));
                }
                // Cannot fail: `symbols` holds exactly `total` entries.
                let Some(&symbol) = symbols.next() else {
                    break;
                };
                table.insert(code, length, symbol)?;
                code += 1;
            }
            code <<= 1;
        }
        Ok(table)
    }

    fn insert(&mut self, code: u32, length: usize, symbol: u8) -> Result<()> {
        let mut node = 0;
        for shift in (1..length).rev() {
            let bit = ((code >> shift) & 1) as usize;
            node = match self.nodes[node][bit] {
                HuffmanNode::Branch(next) => next as usize,
                HuffmanNode::Vacant => {
                    let next = self.nodes.len();
                    self.nodes.push([HuffmanNode::Vacant; 2]);
                    self.nodes[node][bit] = HuffmanNode::Branch(next as u16);
                    next
                }
                HuffmanNode::Leaf(_) => {
                    return Err(Error::InvalidHuffmanTable("code is not prefix-free"));
                }
            };
        }
        let slot = &mut self.nodes[node][(code & 1) as usize];
        if *slot != HuffmanNode::Vacant {
            return Err(Error::InvalidHuffmanTable("code is not prefix-free"));
        }
        *slot = HuffmanNode::Leaf(symbol);
        self.codes.push(HuffmanCode {
            length: length as u8,
            code: code as u16,
            symbol,
        });
        Ok(())
    }

    /// Walks the tree one bit at a time until a symbol is reached.
    #[inline]
    pub fn decode(&self, br: &mut BitReader) -> Result<u8> {
        let mut node = 0;
        loop {
            match self.nodes[node][br.read_bit()? as usize] {
                HuffmanNode::Leaf(symbol) => return Ok(symbol),
                HuffmanNode::Branch(next) => node = next as usize,
                HuffmanNode::Vacant => return Err(Error::InvalidHuffmanCode),
            }
        }
    }

    /// The assigned codes, in symbol-list order.
    pub fn codes(&self) -> &[HuffmanCode] {
        &self.codes
    }
}
