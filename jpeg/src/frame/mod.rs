// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

pub mod coefficients;
pub mod scan;

use crate::{
    error::Result,
    headers::{BlockGeometry, ComponentInfo, FrameHeader},
    util::tracing_wrappers::*,
};

use coefficients::CoefficientStore;

#[derive(Debug)]
pub struct Component {
    pub info: ComponentInfo,
    pub geometry: BlockGeometry,
    /// DC predictor of the scan being decoded.
    pub(crate) pred: i32,
    pub coefficients: CoefficientStore,
}

/// Decoding state of the single frame of an image.
#[derive(Debug)]
pub struct Frame {
    pub header: FrameHeader,
    pub components: Vec<Component>,
    pub max_h: usize,
    pub max_v: usize,
    pub mcus_per_line: usize,
    pub mcus_per_column: usize,
}

impl Frame {
    /// Allocates zeroed coefficient storage for every component.
    pub fn new(header: FrameHeader) -> Result<Frame> {
        let components = header
            .components
            .iter()
            .map(|info| {
                let geometry = header.block_geometry(info);
                Ok(Component {
                    info: *info,
                    geometry,
                    pred: 0,
                    coefficients: CoefficientStore::new(&geometry)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let frame = Frame {
            max_h: header.max_h(),
            max_v: header.max_v(),
            mcus_per_line: header.mcus_per_line(),
            mcus_per_column: header.mcus_per_column(),
            components,
            header,
        };
        debug!(
            width = frame.header.width,
            height = frame.header.height,
            mcus_per_line = frame.mcus_per_line,
            mcus_per_column = frame.mcus_per_column,
            "frame"
        );
        Ok(frame)
    }

    pub fn is_progressive(&self) -> bool {
        self.header.kind.is_progressive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::headers::FrameKind;

    #[test]
    fn allocates_padded_stores() {
        let header = FrameHeader {
            kind: FrameKind::Progressive,
            precision: 8,
            width: 20,
            height: 9,
            components: vec![
                ComponentInfo {
                    id: 1,
                    h: 2,
                    v: 1,
                    quant_table: 0,
                },
                ComponentInfo {
                    id: 2,
                    h: 1,
                    v: 1,
                    quant_table: 1,
                },
            ],
        };
        let frame = Frame::new(header).unwrap();
        assert!(frame.is_progressive());
        assert_eq!((frame.mcus_per_line, frame.mcus_per_column), (2, 2));
        assert_eq!(frame.components[0].coefficients.num_blocks(), 8);
        assert_eq!(frame.components[1].coefficients.num_blocks(), 4);
        assert_eq!(frame.components[0].geometry.blocks_per_line, 3);
    }
}
