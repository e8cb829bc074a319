// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod idct;

use crate::{
    BLOCK_DIM, BLOCK_SIZE,
    error::{Error, Result},
    frame::{Component, Frame},
    headers::{NUM_QUANT_TABLES, QuantTable},
    image::Plane,
    util::tracing_wrappers::*,
};

/// Turns the coefficients of the visible blocks of a component into samples.
/// The plane covers whole blocks; samples past the image edge are kept.
pub fn reconstruct_component(component: &Component, quant: &QuantTable) -> Result<Plane> {
    let geometry = component.geometry;
    let mut plane = Plane::new((
        geometry.blocks_per_line * BLOCK_DIM,
        geometry.blocks_per_column * BLOCK_DIM,
    ))?;
    let mut samples = [0u8; BLOCK_SIZE];
    for block_row in 0..geometry.blocks_per_column {
        for block_col in 0..geometry.blocks_per_line {
            idct::dequantize_and_idct(
                component.coefficients.block(block_row, block_col),
                &quant.values,
                &mut samples,
            );
            let x0 = block_col * BLOCK_DIM;
            for (y, row) in samples.chunks_exact(BLOCK_DIM).enumerate() {
                plane.row_mut(block_row * BLOCK_DIM + y)[x0..x0 + BLOCK_DIM].copy_from_slice(row);
            }
        }
    }
    Ok(plane)
}

/// Reconstructs every component of the frame, in frame order.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, err))]
pub fn reconstruct_frame(
    frame: &Frame,
    quant_tables: &[Option<QuantTable>; NUM_QUANT_TABLES],
) -> Result<Vec<Plane>> {
    frame
        .components
        .iter()
        .map(|component| {
            let index = component.info.quant_table;
            let quant = quant_tables[index]
                .as_ref()
                .ok_or(Error::MissingQuantTable(index))?;
            debug!(id = component.info.id, quant_table = index, "reconstructing");
            reconstruct_component(component, quant)
        })
        .collect()
}
