// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{BLOCK_SIZE, error::Result, headers::BlockGeometry, util::try_filled_vec};

/// Quantized coefficients of one component, in natural order, for every
/// block of the MCU-padded grid.
///
/// Blocks are laid out column by column: the block at `(row, col)` starts at
/// `(col * blocks_per_column_for_mcu + row) * 64`.
#[derive(Debug)]
pub struct CoefficientStore {
    data: Vec<i32>,
    blocks_per_line: usize,
    blocks_per_column: usize,
}

impl CoefficientStore {
    pub fn new(geometry: &BlockGeometry) -> Result<CoefficientStore> {
        Ok(CoefficientStore {
            data: try_filled_vec(geometry.num_blocks_for_mcu() * BLOCK_SIZE, 0)?,
            blocks_per_line: geometry.blocks_per_line_for_mcu,
            blocks_per_column: geometry.blocks_per_column_for_mcu,
        })
    }

    #[inline]
    pub fn block_offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.blocks_per_column && col < self.blocks_per_line);
        (col * self.blocks_per_column + row) * BLOCK_SIZE
    }

    pub fn block(&self, row: usize, col: usize) -> &[i32] {
        let offset = self.block_offset(row, col);
        &self.data[offset..offset + BLOCK_SIZE]
    }

    pub fn block_mut(&mut self, row: usize, col: usize) -> &mut [i32] {
        let offset = self.block_offset(row, col);
        &mut self.data[offset..offset + BLOCK_SIZE]
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks_per_line * self.blocks_per_column
    }
}
