// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    dct::{forward_dct, rgb_to_ycbcr},
    tables::{chrominance_quant, luminance_quant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentSpec {
    pub id: u8,
    pub h: u8,
    pub v: u8,
    pub quant_table: u8,
}

/// Quantized coefficients of one component on its MCU-padded block grid.
#[derive(Debug, Clone)]
pub struct CoefficientComponent {
    pub spec: ComponentSpec,
    pub blocks_per_line: usize,
    pub blocks_per_column: usize,
    pub blocks_per_line_for_mcu: usize,
    pub blocks_per_column_for_mcu: usize,
    /// Row-major blocks, each in natural order.
    pub blocks: Vec<[i32; 64]>,
}

impl CoefficientComponent {
    pub fn block(&self, row: usize, col: usize) -> &[i32; 64] {
        &self.blocks[row * self.blocks_per_line_for_mcu + col]
    }

    pub fn block_mut(&mut self, row: usize, col: usize) -> &mut [i32; 64] {
        &mut self.blocks[row * self.blocks_per_line_for_mcu + col]
    }
}

/// Everything an encoder needs to write a frame, after the lossy steps.
#[derive(Debug, Clone)]
pub struct CoefficientImage {
    pub width: usize,
    pub height: usize,
    pub max_h: usize,
    pub max_v: usize,
    pub mcus_per_line: usize,
    pub mcus_per_column: usize,
    pub components: Vec<CoefficientComponent>,
    /// Natural-order tables, indexed by slot.
    pub quant_tables: Vec<[u16; 64]>,
}

impl CoefficientImage {
    /// All-zero coefficients for the given geometry.
    pub fn new(
        width: usize,
        height: usize,
        specs: &[ComponentSpec],
        quant_tables: Vec<[u16; 64]>,
    ) -> CoefficientImage {
        let max_h = specs.iter().map(|s| s.h as usize).max().unwrap_or(1);
        let max_v = specs.iter().map(|s| s.v as usize).max().unwrap_or(1);
        let mcus_per_line = width.div_ceil(8 * max_h);
        let mcus_per_column = height.div_ceil(8 * max_v);
        let components = specs
            .iter()
            .map(|&spec| {
                let (h, v) = (spec.h as usize, spec.v as usize);
                let blocks_per_line_for_mcu = mcus_per_line * h;
                let blocks_per_column_for_mcu = mcus_per_column * v;
                CoefficientComponent {
                    spec,
                    blocks_per_line: (width.div_ceil(8) * h).div_ceil(max_h),
                    blocks_per_column: (height.div_ceil(8) * v).div_ceil(max_v),
                    blocks_per_line_for_mcu,
                    blocks_per_column_for_mcu,
                    blocks: vec![[0; 64]; blocks_per_line_for_mcu * blocks_per_column_for_mcu],
                }
            })
            .collect();
        CoefficientImage {
            width,
            height,
            max_h,
            max_v,
            mcus_per_line,
            mcus_per_column,
            components,
            quant_tables,
        }
    }

    /// Transforms and quantizes full-resolution planes, one per component.
    /// Subsampled components take every `max_h / h`-th sample; samples past
    /// the image edge repeat the last row or column.
    pub fn from_planes(
        width: usize,
        height: usize,
        specs: &[ComponentSpec],
        quant_tables: Vec<[u16; 64]>,
        planes: &[Vec<u8>],
    ) -> CoefficientImage {
        assert_eq!(specs.len(), planes.len());
        let mut image = CoefficientImage::new(width, height, specs, quant_tables);
        let (max_h, max_v) = (image.max_h, image.max_v);
        for (component, plane) in image.components.iter_mut().zip(planes.iter()) {
            assert_eq!(plane.len(), width * height);
            let (h, v) = (component.spec.h as usize, component.spec.v as usize);
            let quant = image.quant_tables[component.spec.quant_table as usize];
            for row in 0..component.blocks_per_column_for_mcu {
                for col in 0..component.blocks_per_line_for_mcu {
                    let mut samples = [0.0; 64];
                    for (i, s) in samples.iter_mut().enumerate() {
                        let x = ((col * 8 + i % 8) * max_h / h).min(width - 1);
                        let y = ((row * 8 + i / 8) * max_v / v).min(height - 1);
                        *s = plane[y * width + x] as f64 - 128.0;
                    }
                    let coefficients = forward_dct(&samples);
                    let block = component.block_mut(row, col);
                    for ((c, &f), &q) in block.iter_mut().zip(coefficients.iter()).zip(quant.iter())
                    {
                        *c = (f / q as f64).round() as i32;
                    }
                }
            }
        }
        image
    }

    pub fn from_gray(width: usize, height: usize, gray: &[u8], quality: u8) -> CoefficientImage {
        let spec = ComponentSpec {
            id: 1,
            h: 1,
            v: 1,
            quant_table: 0,
        };
        CoefficientImage::from_planes(
            width,
            height,
            &[spec],
            vec![luminance_quant(quality)],
            &[gray.to_vec()],
        )
    }

    /// YCbCr with the given luma sampling factors; chroma is 1x1.
    pub fn from_rgb(
        width: usize,
        height: usize,
        rgb: &[u8],
        quality: u8,
        luma_sampling: (u8, u8),
    ) -> CoefficientImage {
        assert_eq!(rgb.len(), width * height * 3);
        let mut planes = vec![Vec::with_capacity(width * height); 3];
        for pixel in rgb.chunks_exact(3) {
            let ycc = rgb_to_ycbcr(pixel[0], pixel[1], pixel[2]);
            for (plane, value) in planes.iter_mut().zip(ycc) {
                plane.push(value);
            }
        }
        let specs = [
            ComponentSpec {
                id: 1,
                h: luma_sampling.0,
                v: luma_sampling.1,
                quant_table: 0,
            },
            ComponentSpec {
                id: 2,
                h: 1,
                v: 1,
                quant_table: 1,
            },
            ComponentSpec {
                id: 3,
                h: 1,
                v: 1,
                quant_table: 1,
            },
        ];
        CoefficientImage::from_planes(
            width,
            height,
            &specs,
            vec![luminance_quant(quality), chrominance_quant(quality)],
            &planes,
        )
    }
}
