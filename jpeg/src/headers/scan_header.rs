// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    BLOCK_SIZE,
    error::{Error, Result},
    headers::{FrameHeader, MAX_COMPONENTS, NUM_HUFFMAN_TABLES, SegmentReader},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    /// Position of the component in the frame header.
    pub component: usize,
    pub dc_table: usize,
    pub ac_table: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub spectral_start: usize,
    pub spectral_end: usize,
    pub successive_high: u32,
    pub successive_low: u32,
}

impl ScanHeader {
    pub fn read(segment: &[u8], frame: &FrameHeader) -> Result<ScanHeader> {
        let mut reader = SegmentReader::new(segment, "SOS");
        let num_components = reader.read_u8()? as usize;
        if num_components == 0 || num_components > MAX_COMPONENTS {
            return Err(Error::InvalidScanHeader("component count"));
        }
        let mut components = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let id = reader.read_u8()?;
            let component = frame
                .component_index(id)
                .ok_or(Error::UnknownComponent(id))?;
            let tables = reader.read_u8()?;
            let (dc_table, ac_table) = ((tables >> 4) as usize, (tables & 15) as usize);
            if dc_table >= NUM_HUFFMAN_TABLES || ac_table >= NUM_HUFFMAN_TABLES {
                return Err(Error::InvalidTableSpec("Huffman", tables));
            }
            components.push(ScanComponent {
                component,
                dc_table,
                ac_table,
            });
        }
        let spectral_start = reader.read_u8()? as usize;
        let spectral_end = reader.read_u8()? as usize;
        let approximation = reader.read_u8()?;
        let header = ScanHeader {
            components,
            spectral_start,
            spectral_end,
            successive_high: (approximation >> 4) as u32,
            successive_low: (approximation & 15) as u32,
        };
        if frame.kind.is_progressive()
            && (header.spectral_start > header.spectral_end || header.spectral_end >= BLOCK_SIZE)
        {
            return Err(Error::InvalidScanHeader("spectral selection"));
        }
        Ok(header)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::headers::{ComponentInfo, FrameKind};
    use test_log::test;

    fn frame(kind: FrameKind) -> FrameHeader {
        FrameHeader {
            kind,
            precision: 8,
            width: 16,
            height: 16,
            components: (1..=3)
                .map(|id| ComponentInfo {
                    id,
                    h: 1,
                    v: 1,
                    quant_table: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn reads_bindings() {
        let segment = [2, 3, 0x10, 1, 0x01, 1, 5, 0x21];
        let header = ScanHeader::read(&segment, &frame(FrameKind::Progressive)).unwrap();
        assert_eq!(
            header.components,
            vec![
                ScanComponent {
                    component: 2,
                    dc_table: 1,
                    ac_table: 0
                },
                ScanComponent {
                    component: 0,
                    dc_table: 0,
                    ac_table: 1
                },
            ]
        );
        assert_eq!((header.spectral_start, header.spectral_end), (1, 5));
        assert_eq!((header.successive_high, header.successive_low), (2, 1));
    }

    #[test]
    fn unknown_component() {
        let segment = [1, 9, 0x00, 0, 63, 0];
        assert!(matches!(
            ScanHeader::read(&segment, &frame(FrameKind::Baseline)),
            Err(Error::UnknownComponent(9))
        ));
    }

    #[test]
    fn spectral_selection_out_of_range() {
        let segment = [1, 1, 0x00, 1, 64, 0];
        assert!(matches!(
            ScanHeader::read(&segment, &frame(FrameKind::Progressive)),
            Err(Error::InvalidScanHeader(_))
        ));
    }
}
