// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    BLOCK_DIM,
    error::{Error, Result},
    headers::{NUM_QUANT_TABLES, SegmentReader},
};

pub const MAX_COMPONENTS: usize = 4;
pub const MAX_SAMPLING_FACTOR: u8 = 4;

/// Coding process declared by the SOF marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// SOF0
    Baseline,
    /// SOF1
    Extended,
    /// SOF2
    Progressive,
}

impl FrameKind {
    pub fn is_progressive(self) -> bool {
        self == FrameKind::Progressive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: u8,
    pub h: u8,
    pub v: u8,
    pub quant_table: usize,
}

/// Block counts of one component.
///
/// The `_for_mcu` counts cover whole MCUs and are at least as large as the
/// counts of blocks holding visible samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    pub blocks_per_line: usize,
    pub blocks_per_column: usize,
    pub blocks_per_line_for_mcu: usize,
    pub blocks_per_column_for_mcu: usize,
}

impl BlockGeometry {
    pub fn num_blocks_for_mcu(&self) -> usize {
        self.blocks_per_line_for_mcu * self.blocks_per_column_for_mcu
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: FrameKind,
    pub precision: u8,
    pub height: usize,
    pub width: usize,
    pub components: Vec<ComponentInfo>,
}

impl FrameHeader {
    pub fn read(kind: FrameKind, segment: &[u8]) -> Result<FrameHeader> {
        let mut reader = SegmentReader::new(segment, "SOF");
        let precision = reader.read_u8()?;
        if precision != 8 {
            return Err(Error::UnsupportedPrecision(precision));
        }
        let height = reader.read_u16()? as usize;
        let width = reader.read_u16()? as usize;
        let num_components = reader.read_u8()? as usize;
        if num_components == 0 || num_components > MAX_COMPONENTS {
            return Err(Error::UnsupportedColorMode(num_components));
        }
        let mut components = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let id = reader.read_u8()?;
            let sampling = reader.read_u8()?;
            let (h, v) = (sampling >> 4, sampling & 15);
            if !(1..=MAX_SAMPLING_FACTOR).contains(&h) || !(1..=MAX_SAMPLING_FACTOR).contains(&v)
            {
                return Err(Error::InvalidSamplingFactor(h, v));
            }
            let quant_table = reader.read_u8()?;
            if quant_table as usize >= NUM_QUANT_TABLES {
                return Err(Error::InvalidTableSpec("quantization", quant_table));
            }
            components.push(ComponentInfo {
                id,
                h,
                v,
                quant_table: quant_table as usize,
            });
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize(width, height));
        }
        Ok(FrameHeader {
            kind,
            precision,
            height,
            width,
            components,
        })
    }

    pub fn max_h(&self) -> usize {
        self.components.iter().map(|c| c.h as usize).max().unwrap_or(1)
    }

    pub fn max_v(&self) -> usize {
        self.components.iter().map(|c| c.v as usize).max().unwrap_or(1)
    }

    pub fn mcus_per_line(&self) -> usize {
        self.width.div_ceil(BLOCK_DIM * self.max_h())
    }

    pub fn mcus_per_column(&self) -> usize {
        self.height.div_ceil(BLOCK_DIM * self.max_v())
    }

    pub fn block_geometry(&self, component: &ComponentInfo) -> BlockGeometry {
        let (h, v) = (component.h as usize, component.v as usize);
        BlockGeometry {
            blocks_per_line: (self.width.div_ceil(BLOCK_DIM) * h).div_ceil(self.max_h()),
            blocks_per_column: (self.height.div_ceil(BLOCK_DIM) * v).div_ceil(self.max_v()),
            blocks_per_line_for_mcu: self.mcus_per_line() * h,
            blocks_per_column_for_mcu: self.mcus_per_column() * v,
        }
    }

    /// Finds the position of the component with the given identifier.
    pub fn component_index(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }
}
