// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Entropy decoding of the coefficients of one scan.

use crate::{
    BLOCK_SIZE, ZIGZAG,
    bit_reader::BitReader,
    container::marker::is_restart,
    error::{Error, Result},
    frame::{Component, Frame},
    headers::{HuffmanTables, ScanComponent, ScanHeader, TableClass},
    util::tracing_wrappers::*,
};

/// Coding pass of a scan, selected by the frame type, the spectral start and
/// the previous successive-approximation bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Baseline,
    DcFirst,
    DcRefine,
    AcFirst,
    AcRefine,
}

impl ScanKind {
    pub fn select(progressive: bool, header: &ScanHeader) -> ScanKind {
        match (
            progressive,
            header.spectral_start == 0,
            header.successive_high == 0,
        ) {
            (false, _, _) => ScanKind::Baseline,
            (true, true, true) => ScanKind::DcFirst,
            (true, true, false) => ScanKind::DcRefine,
            (true, false, true) => ScanKind::AcFirst,
            (true, false, false) => ScanKind::AcRefine,
        }
    }
}

/// Position inside a block of an AC refinement scan. Survives across blocks
/// while an EOB run is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefineState {
    Initial,
    /// Skipping zero-history coefficients before reading the next code.
    ZeroRun(u32),
    /// Skipping zero-history coefficients before placing a new one.
    ZeroRunThenPlace(u32),
    /// The next zero-history coefficient receives the pending value.
    Place,
    /// Only correction bits until the end of the band.
    EobRun,
}

pub struct ScanDecoder<'a, 't> {
    reader: BitReader<'a>,
    tables: &'t HuffmanTables,
    components: Vec<ScanComponent>,
    kind: ScanKind,
    spectral_start: usize,
    spectral_end: usize,
    successive_low: u32,
    restart_interval: usize,
    eobrun: u32,
    refine_state: RefineState,
    refine_value: i32,
}

impl<'a, 't> ScanDecoder<'a, 't> {
    /// `position` is the offset of the first entropy-coded byte in `data`.
    pub fn new(
        data: &'a [u8],
        position: usize,
        header: &ScanHeader,
        frame: &Frame,
        tables: &'t HuffmanTables,
        restart_interval: usize,
    ) -> ScanDecoder<'a, 't> {
        let kind = ScanKind::select(frame.is_progressive(), header);
        debug!(
            ?kind,
            num_components = header.components.len(),
            spectral_start = header.spectral_start,
            spectral_end = header.spectral_end,
            successive_high = header.successive_high,
            successive_low = header.successive_low,
            "scan"
        );
        ScanDecoder {
            reader: BitReader::new(data, position),
            tables,
            components: header.components.clone(),
            kind,
            spectral_start: header.spectral_start,
            spectral_end: header.spectral_end,
            successive_low: header.successive_low,
            restart_interval,
            eobrun: 0,
            refine_state: RefineState::Initial,
            refine_value: 0,
        }
    }

    /// Decodes the scan into the frame's coefficient stores and returns the
    /// offset where the container walk resumes.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, err))]
    pub fn decode(mut self, frame: &mut Frame) -> Result<usize> {
        let single = match self.components[..] {
            [only] => Some(frame.components[only.component].geometry),
            _ => None,
        };
        let mcus_expected = match single {
            Some(geometry) => geometry.blocks_per_line * geometry.blocks_per_column,
            None => frame.mcus_per_line * frame.mcus_per_column,
        };
        let batch = match self.restart_interval {
            0 => mcus_expected,
            interval => interval,
        };

        let mut mcu = 0;
        while mcu < mcus_expected {
            for scan_component in self.components.iter() {
                frame.components[scan_component.component].pred = 0;
            }
            self.eobrun = 0;
            self.refine_state = RefineState::Initial;

            for _ in 0..batch {
                match single {
                    Some(geometry) => {
                        let scan_component = self.components[0];
                        let component = &mut frame.components[scan_component.component];
                        let row = mcu / geometry.blocks_per_line;
                        let col = mcu % geometry.blocks_per_line;
                        self.decode_block(component, scan_component, row, col)?;
                    }
                    None => self.decode_mcu(frame, mcu)?,
                }
                mcu += 1;
                if mcu == mcus_expected {
                    break;
                }
            }

            if !self.find_restart_marker()? {
                break;
            }
        }
        Ok(self.reader.position())
    }

    /// Aligns the reader on the marker that follows a restart interval.
    /// Returns true if it was a restart marker, which is consumed.
    fn find_restart_marker(&mut self) -> Result<bool> {
        let data = self.reader.data();
        let mut position = self.reader.position();
        while data.get(position) == Some(&0xFF) && data.get(position + 1) == Some(&0xFF) {
            position += 1;
        }
        let (Some(&high), Some(&low)) = (data.get(position), data.get(position + 1)) else {
            self.reader.reset(position);
            return Ok(false);
        };
        let code = u16::from_be_bytes([high, low]);
        if code < 0xFF00 {
            return Err(Error::MarkerNotFound(code));
        }
        if is_restart(code) {
            trace!(position, "restart marker");
            self.reader.reset(position + 2);
            Ok(true)
        } else {
            self.reader.reset(position);
            Ok(false)
        }
    }

    fn decode_mcu(&mut self, frame: &mut Frame, mcu: usize) -> Result<()> {
        let mcu_row = mcu / frame.mcus_per_line;
        let mcu_col = mcu % frame.mcus_per_line;
        for i in 0..self.components.len() {
            let scan_component = self.components[i];
            let component = &mut frame.components[scan_component.component];
            let (h, v) = (component.info.h as usize, component.info.v as usize);
            for j in 0..v {
                for k in 0..h {
                    let row = mcu_row * v + j;
                    let col = mcu_col * h + k;
                    self.decode_block(component, scan_component, row, col)?;
                }
            }
        }
        Ok(())
    }

    fn decode_block(
        &mut self,
        component: &mut Component,
        scan_component: ScanComponent,
        row: usize,
        col: usize,
    ) -> Result<()> {
        let block = component.coefficients.block_mut(row, col);
        match self.kind {
            ScanKind::Baseline => {
                block[0] = self.decode_dc(&mut component.pred, scan_component, 0)?;
                self.decode_ac_baseline(block, scan_component)
            }
            ScanKind::DcFirst => {
                let shift = self.successive_low;
                block[0] = self.decode_dc(&mut component.pred, scan_component, shift)?;
                Ok(())
            }
            ScanKind::DcRefine => {
                if self.reader.read_bit()? == 1 {
                    block[0] |= 1 << self.successive_low;
                }
                Ok(())
            }
            ScanKind::AcFirst => self.decode_ac_first(block, scan_component),
            ScanKind::AcRefine => self.decode_ac_refine(block, scan_component),
        }
    }

    fn decode_dc(
        &mut self,
        pred: &mut i32,
        scan_component: ScanComponent,
        shift: u32,
    ) -> Result<i32> {
        let tables = self.tables;
        let table = tables.get(TableClass::Dc, scan_component.dc_table)?;
        let size = table.decode(&mut self.reader)? as u32;
        let diff = self.reader.receive_extend(size)?;
        *pred = pred.wrapping_add(diff.wrapping_shl(shift));
        Ok(*pred)
    }

    fn decode_ac_baseline(&mut self, block: &mut [i32], scan_component: ScanComponent) -> Result<()> {
        let tables = self.tables;
        let table = tables.get(TableClass::Ac, scan_component.ac_table)?;
        let mut k = 1;
        while k < BLOCK_SIZE {
            let symbol = table.decode(&mut self.reader)?;
            let (run, size) = ((symbol >> 4) as usize, (symbol & 15) as u32);
            if size == 0 {
                if run < 15 {
                    break;
                }
                k += 16;
                continue;
            }
            k += run;
            if k >= BLOCK_SIZE {
                return Err(Error::InvalidAcRun(k));
            }
            block[ZIGZAG[k]] = self.reader.receive_extend(size)?;
            k += 1;
        }
        Ok(())
    }

    fn decode_ac_first(&mut self, block: &mut [i32], scan_component: ScanComponent) -> Result<()> {
        if self.eobrun > 0 {
            self.eobrun -= 1;
            return Ok(());
        }
        let tables = self.tables;
        let table = tables.get(TableClass::Ac, scan_component.ac_table)?;
        let mut k = self.spectral_start;
        while k <= self.spectral_end {
            let symbol = table.decode(&mut self.reader)?;
            let (run, size) = ((symbol >> 4) as u32, (symbol & 15) as u32);
            if size == 0 {
                if run < 15 {
                    self.eobrun = self.reader.receive(run)? + (1 << run) - 1;
                    break;
                }
                k += 16;
                continue;
            }
            k += run as usize;
            if k >= BLOCK_SIZE {
                return Err(Error::InvalidAcRun(k));
            }
            let value = self.reader.receive_extend(size)?;
            block[ZIGZAG[k]] = value.wrapping_mul(1 << self.successive_low);
            k += 1;
        }
        Ok(())
    }

    /// Adds a correction bit to a coefficient that was already nonzero.
    fn refine(&mut self, coefficient: &mut i32) -> Result<()> {
        if self.reader.read_bit()? == 1 {
            let bit = 1 << self.successive_low;
            if *coefficient & bit == 0 {
                if *coefficient >= 0 {
                    *coefficient += bit;
                } else {
                    *coefficient -= bit;
                }
            }
        }
        Ok(())
    }

    fn decode_ac_refine(&mut self, block: &mut [i32], scan_component: ScanComponent) -> Result<()> {
        let tables = self.tables;
        let mut k = self.spectral_start;
        while k <= self.spectral_end {
            let z = ZIGZAG[k];
            match self.refine_state {
                RefineState::Initial => {
                    let table = tables.get(TableClass::Ac, scan_component.ac_table)?;
                    let symbol = table.decode(&mut self.reader)?;
                    let (run, size) = ((symbol >> 4) as u32, symbol & 15);
                    if size == 0 {
                        if run < 15 {
                            self.eobrun = self.reader.receive(run)? + (1 << run);
                            self.refine_state = RefineState::EobRun;
                        } else {
                            self.refine_state = RefineState::ZeroRun(16);
                        }
                    } else {
                        if size != 1 {
                            return Err(Error::InvalidRefinementCode(size));
                        }
                        self.refine_value = self.reader.receive_extend(1)?;
                        self.refine_state = match run {
                            0 => RefineState::Place,
                            run => RefineState::ZeroRunThenPlace(run),
                        };
                    }
                    continue;
                }
                RefineState::ZeroRun(remaining) | RefineState::ZeroRunThenPlace(remaining) => {
                    if block[z] != 0 {
                        self.refine(&mut block[z])?;
                    } else {
                        let place = matches!(self.refine_state, RefineState::ZeroRunThenPlace(_));
                        self.refine_state = match (remaining - 1, place) {
                            (0, true) => RefineState::Place,
                            (0, false) => RefineState::Initial,
                            (left, true) => RefineState::ZeroRunThenPlace(left),
                            (left, false) => RefineState::ZeroRun(left),
                        };
                    }
                }
                RefineState::Place => {
                    if block[z] != 0 {
                        self.refine(&mut block[z])?;
                    } else {
                        block[z] = self.refine_value << self.successive_low;
                        self.refine_state = RefineState::Initial;
                    }
                }
                RefineState::EobRun => {
                    if block[z] != 0 {
                        self.refine(&mut block[z])?;
                    }
                }
            }
            k += 1;
        }
        if self.refine_state == RefineState::EobRun {
            self.eobrun -= 1;
            if self.eobrun == 0 {
                self.refine_state = RefineState::Initial;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::headers::{ComponentInfo, FrameHeader, FrameKind};
    use test_log::test;

    const DC_SYMBOLS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
    const AC_SYMBOLS: [u8; 8] = [0x00, 0x01, 0x02, 0x10, 0x11, 0x12, 0xF0, 0xF1];

    /// Every symbol gets the 8-bit code equal to its position in the list.
    fn fixed_tables() -> HuffmanTables {
        let mut segment = vec![];
        for (spec, symbols) in [(0x00, &DC_SYMBOLS[..]), (0x10, &AC_SYMBOLS[..])] {
            segment.push(spec);
            let mut counts = [0u8; 16];
            counts[7] = symbols.len() as u8;
            segment.extend(counts);
            segment.extend(symbols);
        }
        let mut tables = HuffmanTables::default();
        tables.read(&segment).unwrap();
        tables
    }

    fn dc(size: u8) -> (u32, u32) {
        (size as u32, 8)
    }

    fn ac(symbol: u8) -> (u32, u32) {
        let code = AC_SYMBOLS.iter().position(|&s| s == symbol).unwrap();
        (code as u32, 8)
    }

    /// Packs `(value, bits)` fields MSB first, padding with ones and stuffing
    /// zero bytes after 0xFF.
    fn pack(fields: &[(u32, u32)]) -> Vec<u8> {
        fn push(bytes: &mut Vec<u8>, byte: u8) {
            bytes.push(byte);
            if byte == 0xFF {
                bytes.push(0);
            }
        }
        let mut bytes = vec![];
        let (mut acc, mut n) = (0u32, 0u32);
        for &(value, bits) in fields {
            for i in (0..bits).rev() {
                acc = (acc << 1) | ((value >> i) & 1);
                n += 1;
                if n == 8 {
                    push(&mut bytes, acc as u8);
                    (acc, n) = (0, 0);
                }
            }
        }
        if n > 0 {
            push(&mut bytes, ((acc << (8 - n)) | ((1 << (8 - n)) - 1)) as u8);
        }
        bytes
    }

    fn gray_frame(kind: FrameKind, width: usize, height: usize) -> Frame {
        Frame::new(FrameHeader {
            kind,
            precision: 8,
            width,
            height,
            components: vec![ComponentInfo {
                id: 1,
                h: 1,
                v: 1,
                quant_table: 0,
            }],
        })
        .unwrap()
    }

    fn scan(spectral: (usize, usize), successive: (u32, u32)) -> ScanHeader {
        ScanHeader {
            components: vec![ScanComponent {
                component: 0,
                dc_table: 0,
                ac_table: 0,
            }],
            spectral_start: spectral.0,
            spectral_end: spectral.1,
            successive_high: successive.0,
            successive_low: successive.1,
        }
    }

    #[test]
    fn selects_kind() {
        assert_eq!(ScanKind::select(false, &scan((1, 5), (1, 0))), ScanKind::Baseline);
        assert_eq!(ScanKind::select(true, &scan((0, 0), (0, 1))), ScanKind::DcFirst);
        assert_eq!(ScanKind::select(true, &scan((0, 0), (1, 0))), ScanKind::DcRefine);
        assert_eq!(ScanKind::select(true, &scan((1, 63), (0, 0))), ScanKind::AcFirst);
        assert_eq!(ScanKind::select(true, &scan((1, 63), (2, 1))), ScanKind::AcRefine);
    }

    #[test]
    fn baseline_blocks_with_prediction() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Baseline, 16, 8);
        let mut data = pack(&[
            dc(3),
            (0b101, 3),
            ac(0x12),
            (0b00, 2),
            ac(0x00),
            dc(2),
            (0b01, 2),
            ac(0x00),
        ]);
        let scan_end = data.len();
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 63), (0, 0)), &frame, &tables, 0);
        assert_eq!(decoder.decode(&mut frame).unwrap(), scan_end);
        let store = &frame.components[0].coefficients;
        assert_eq!(store.block(0, 0)[0], 5);
        assert_eq!(store.block(0, 0)[ZIGZAG[2]], -3);
        assert_eq!(store.block(0, 1)[0], 3);
    }

    #[test]
    fn zero_run_and_overrun() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Baseline, 8, 8);
        let mut data = pack(&[
            dc(0),
            ac(0xF0),
            ac(0xF0),
            ac(0xF0),
            ac(0x11),
            (1, 1),
            ac(0x00),
        ]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 63), (0, 0)), &frame, &tables, 0);
        decoder.decode(&mut frame).unwrap();
        assert_eq!(frame.components[0].coefficients.block(0, 0)[ZIGZAG[50]], 1);

        let mut frame = gray_frame(FrameKind::Baseline, 8, 8);
        let mut data = pack(&[dc(0), ac(0xF0), ac(0xF0), ac(0xF0), ac(0xF1), (1, 1)]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 63), (0, 0)), &frame, &tables, 0);
        assert!(matches!(
            decoder.decode(&mut frame),
            Err(Error::InvalidAcRun(64))
        ));
    }

    #[test]
    fn restart_resets_predictor() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Baseline, 16, 8);
        let interval = pack(&[dc(3), (0b101, 3), ac(0x00)]);
        let mut data = interval.clone();
        data.extend([0xFF, 0xD0]);
        data.extend(&interval);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 63), (0, 0)), &frame, &tables, 1);
        decoder.decode(&mut frame).unwrap();
        let store = &frame.components[0].coefficients;
        assert_eq!(store.block(0, 0)[0], 5);
        assert_eq!(store.block(0, 1)[0], 5);
    }

    #[test]
    fn missing_restart_marker() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Baseline, 16, 8);
        let interval = pack(&[dc(3), (0b101, 3), ac(0x00)]);
        let mut data = interval.clone();
        data.extend(&interval);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 63), (0, 0)), &frame, &tables, 1);
        assert!(matches!(
            decoder.decode(&mut frame),
            Err(Error::MarkerNotFound(0x03A0))
        ));
    }

    #[test]
    fn ac_first_eob_run() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Progressive, 24, 8);
        // EOB1 with an extra bit of 1 starts a run covering two more blocks.
        let mut data = pack(&[ac(0x01), (1, 1), ac(0x10), (1, 1)]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((1, 5), (0, 2)), &frame, &tables, 0);
        decoder.decode(&mut frame).unwrap();
        let store = &frame.components[0].coefficients;
        assert_eq!(store.block(0, 0)[ZIGZAG[1]], 4);
        assert!(store.block(0, 1).iter().all(|&c| c == 0));
        assert!(store.block(0, 2).iter().all(|&c| c == 0));
    }

    #[test]
    fn ac_refine_corrections() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Progressive, 8, 8);
        {
            let block = frame.components[0].coefficients.block_mut(0, 0);
            block[ZIGZAG[1]] = 2;
            block[ZIGZAG[3]] = -2;
        }
        // New +1 coefficient: k=1 is passed with a correction bit, the value
        // lands at k=2. The EOB then corrects k=3.
        let mut data = pack(&[ac(0x01), (1, 1), (1, 1), ac(0x00), (1, 1)]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((1, 3), (1, 0)), &frame, &tables, 0);
        decoder.decode(&mut frame).unwrap();
        let block = frame.components[0].coefficients.block(0, 0);
        assert_eq!(block[ZIGZAG[1]], 3);
        assert_eq!(block[ZIGZAG[2]], 1);
        assert_eq!(block[ZIGZAG[3]], -3);
    }

    #[test]
    fn ac_refine_skips_nonzero_in_run() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Progressive, 8, 8);
        frame.components[0].coefficients.block_mut(0, 0)[ZIGZAG[2]] = 4;
        // Run of one zero, then a new -1: k=1 is the skipped zero, k=2 is
        // nonzero and takes a correction bit of 0, the value lands at k=3.
        let mut data = pack(&[ac(0x11), (0, 1), (0, 1), ac(0x00)]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((1, 5), (2, 1)), &frame, &tables, 0);
        decoder.decode(&mut frame).unwrap();
        let block = frame.components[0].coefficients.block(0, 0);
        assert_eq!(block[ZIGZAG[1]], 0);
        assert_eq!(block[ZIGZAG[2]], 4);
        assert_eq!(block[ZIGZAG[3]], -2);
    }

    #[test]
    fn ac_refine_rejects_large_size() {
        let tables = fixed_tables();
        let mut frame = gray_frame(FrameKind::Progressive, 8, 8);
        let mut data = pack(&[ac(0x02), (0, 2)]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((1, 63), (1, 0)), &frame, &tables, 0);
        assert!(matches!(
            decoder.decode(&mut frame),
            Err(Error::InvalidRefinementCode(2))
        ));
    }

    #[test]
    fn dc_refine_sets_bit() {
        let tables = HuffmanTables::default();
        let mut frame = gray_frame(FrameKind::Progressive, 16, 8);
        frame.components[0].coefficients.block_mut(0, 0)[0] = 4;
        frame.components[0].coefficients.block_mut(0, 1)[0] = -4;
        let mut data = pack(&[(0b10, 2)]);
        data.extend([0xFF, 0xD9]);
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 0), (2, 1)), &frame, &tables, 0);
        decoder.decode(&mut frame).unwrap();
        let store = &frame.components[0].coefficients;
        assert_eq!(store.block(0, 0)[0], 6);
        assert_eq!(store.block(0, 1)[0], -4);
    }

    #[test]
    fn missing_table_is_reported() {
        let tables = HuffmanTables::default();
        let mut frame = gray_frame(FrameKind::Baseline, 8, 8);
        let data = [0x00, 0xFF, 0xD9];
        let decoder = ScanDecoder::new(&data, 0, &scan((0, 63), (0, 0)), &frame, &tables, 0);
        assert!(matches!(
            decoder.decode(&mut frame),
            Err(Error::MissingHuffmanTable("DC", 0))
        ));
    }
}
