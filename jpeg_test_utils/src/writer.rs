// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Minimal JPEG encoder back end used to produce test streams.

use crate::{
    ZIGZAG,
    coefficients::{CoefficientComponent, CoefficientImage},
    huffman::{HuffmanEncoder, optimal_spec},
    tables::{HuffmanSpec, ac_chrominance, ac_luminance, dc_chrominance, dc_luminance},
};

/// Longest EOB run the encoder accumulates before flushing it.
const MAX_EOB_RUN: u32 = 0x7FFF;
/// Correction bits buffered during an EOB run before it is flushed.
const MAX_CORRECTION_BITS: usize = 937;

/// Wraps a payload into a marker segment with its length field.
pub fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let length = u16::try_from(payload.len() + 2).expect("segment too long");
    let mut out = vec![0xFF, marker];
    out.extend(length.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Spectral selection and successive approximation of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSpec {
    /// Indices into the frame components.
    pub components: Vec<usize>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub successive_high: u8,
    pub successive_low: u8,
}

impl ScanSpec {
    pub fn new(components: &[usize], ss: u8, se: u8, ah: u8, al: u8) -> ScanSpec {
        ScanSpec {
            components: components.to_vec(),
            spectral_start: ss,
            spectral_end: se,
            successive_high: ah,
            successive_low: al,
        }
    }
}

/// Progressive script in the style of the IJG default: interleaved DC with
/// one refinement bit, spectral selection for luma and two successive
/// approximation passes for every component.
pub fn default_progressive_script(num_components: usize) -> Vec<ScanSpec> {
    let all: Vec<usize> = (0..num_components).collect();
    let mut scans = vec![ScanSpec::new(&all, 0, 0, 0, 1)];
    scans.push(ScanSpec::new(&[0], 1, 5, 0, 2));
    for c in (1..num_components).rev() {
        scans.push(ScanSpec::new(&[c], 1, 63, 0, 1));
    }
    scans.push(ScanSpec::new(&[0], 6, 63, 0, 2));
    scans.push(ScanSpec::new(&[0], 1, 63, 2, 1));
    scans.push(ScanSpec::new(&all, 0, 0, 1, 0));
    for c in (1..num_components).rev() {
        scans.push(ScanSpec::new(&[c], 1, 63, 1, 0));
    }
    scans.push(ScanSpec::new(&[0], 1, 63, 1, 0));
    scans
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coding {
    /// SOF0, one interleaved scan.
    Baseline,
    /// SOF1, otherwise identical to baseline.
    Extended,
    /// SOF2 with the given scans.
    Progressive(Vec<ScanSpec>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// Annex K tables, luma in slot 0 and chroma in slot 1. Not usable for
    /// progressive scans.
    Standard,
    /// Tables built from the symbol statistics of each scan.
    Optimized,
}

#[derive(Debug, Clone)]
pub struct JpegWriter {
    pub coding: Coding,
    pub tables: TableMode,
    /// MCUs per restart interval; 0 disables restart markers.
    pub restart_interval: u16,
    pub jfif: bool,
    pub exif: Option<Vec<u8>>,
    pub adobe_transform: Option<u8>,
    /// Latin-1 comments.
    pub comments: Vec<Vec<u8>>,
    /// Appended after EOI.
    pub trailing: Vec<u8>,
}

impl Default for JpegWriter {
    fn default() -> Self {
        Self::baseline()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Dc = 0,
    Ac = 1,
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Symbol(Class, usize, u8),
    Bits(u32, u8),
    Restart(u8),
}

fn table_slot(component: usize) -> usize {
    if component == 0 { 0 } else { 1 }
}

fn bit_length(value: u32) -> u8 {
    (32 - value.leading_zeros()) as u8
}

/// Magnitude category and the bits that follow it.
fn encode_value(value: i32) -> (u8, u32) {
    let size = bit_length(value.unsigned_abs());
    let bits = if value < 0 {
        (value - 1) as u32 & ((1u32 << size) - 1)
    } else {
        value as u32
    };
    (size, bits)
}

struct BitWriter {
    out: Vec<u8>,
    accumulator: u32,
    num_bits: u32,
}

impl BitWriter {
    fn new() -> BitWriter {
        BitWriter {
            out: Vec::new(),
            accumulator: 0,
            num_bits: 0,
        }
    }

    fn write(&mut self, value: u32, length: u8) {
        for shift in (0..length).rev() {
            self.accumulator = (self.accumulator << 1) | ((value >> shift) & 1);
            self.num_bits += 1;
            if self.num_bits == 8 {
                let byte = self.accumulator as u8;
                self.out.push(byte);
                if byte == 0xFF {
                    self.out.push(0);
                }
                self.accumulator = 0;
                self.num_bits = 0;
            }
        }
    }

    /// Pads the last byte with one bits.
    fn flush(&mut self) {
        if self.num_bits > 0 {
            let pad = 8 - self.num_bits as u8;
            self.write((1 << pad) - 1, pad);
        }
    }
}

/// Produces the symbol and bit tokens of one scan.
struct ScanEncoder<'a> {
    image: &'a CoefficientImage,
    scan: &'a ScanSpec,
    progressive: bool,
    tokens: Vec<Token>,
    preds: Vec<i32>,
    eobrun: u32,
    /// Correction bits of the blocks covered by the pending EOB run.
    eob_bits: Vec<u32>,
}

impl<'a> ScanEncoder<'a> {
    fn new(image: &'a CoefficientImage, scan: &'a ScanSpec, progressive: bool) -> Self {
        Self {
            image,
            scan,
            progressive,
            tokens: Vec::new(),
            preds: vec![0; image.components.len()],
            eobrun: 0,
            eob_bits: Vec::new(),
        }
    }

    fn encode(mut self, restart_interval: usize) -> Vec<Token> {
        let image = self.image;
        let scan = self.scan;
        let single = match scan.components[..] {
            [only] => Some(only),
            _ => None,
        };
        let num_mcus = match single {
            Some(c) => {
                let component = &image.components[c];
                component.blocks_per_line * component.blocks_per_column
            }
            None => image.mcus_per_line * image.mcus_per_column,
        };
        let mut restarts = 0u8;
        for mcu in 0..num_mcus {
            if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
                self.flush_eobrun();
                self.tokens.push(Token::Restart(restarts % 8));
                restarts = restarts.wrapping_add(1);
                self.preds.fill(0);
            }
            match single {
                Some(c) => {
                    let component = &image.components[c];
                    let row = mcu / component.blocks_per_line;
                    let col = mcu % component.blocks_per_line;
                    self.encode_block(c, component.block(row, col));
                }
                None => {
                    let mcu_row = mcu / image.mcus_per_line;
                    let mcu_col = mcu % image.mcus_per_line;
                    for &c in scan.components.iter() {
                        let component = &image.components[c];
                        let (h, v) = (component.spec.h as usize, component.spec.v as usize);
                        for j in 0..v {
                            for k in 0..h {
                                let block = component.block(mcu_row * v + j, mcu_col * h + k);
                                self.encode_block(c, block);
                            }
                        }
                    }
                }
            }
        }
        self.flush_eobrun();
        self.tokens
    }

    fn symbol(&mut self, class: Class, component: usize, symbol: u8) {
        self.tokens
            .push(Token::Symbol(class, table_slot(component), symbol));
    }

    fn bits(&mut self, value: u32, length: u8) {
        if length > 0 {
            self.tokens.push(Token::Bits(value, length));
        }
    }

    fn encode_block(&mut self, c: usize, block: &[i32; 64]) {
        let scan = self.scan;
        let al = scan.successive_low as u32;
        if !self.progressive {
            self.encode_dc(c, block[0]);
            self.encode_ac_sequential(c, block);
        } else if scan.spectral_start == 0 {
            if scan.successive_high == 0 {
                self.encode_dc(c, block[0] >> al);
            } else {
                self.bits(((block[0] >> al) & 1) as u32, 1);
            }
        } else if scan.successive_high == 0 {
            self.encode_ac_first(c, block, al);
        } else {
            self.encode_ac_refine(c, block, al);
        }
    }

    fn encode_dc(&mut self, c: usize, value: i32) {
        let diff = value - self.preds[c];
        self.preds[c] = value;
        let (size, bits) = encode_value(diff);
        self.symbol(Class::Dc, c, size);
        self.bits(bits, size);
    }

    fn encode_ac_sequential(&mut self, c: usize, block: &[i32; 64]) {
        let mut run = 0;
        for &position in ZIGZAG[1..].iter() {
            let value = block[position];
            if value == 0 {
                run += 1;
                continue;
            }
            while run > 15 {
                self.symbol(Class::Ac, c, 0xF0);
                run -= 16;
            }
            let (size, bits) = encode_value(value);
            self.symbol(Class::Ac, c, (run << 4) | size);
            self.bits(bits, size);
            run = 0;
        }
        if run > 0 {
            self.symbol(Class::Ac, c, 0x00);
        }
    }

    fn flush_eobrun(&mut self) {
        if self.eobrun == 0 {
            return;
        }
        let c = self.scan.components[0];
        let nbits = bit_length(self.eobrun) - 1;
        self.symbol(Class::Ac, c, nbits << 4);
        self.bits(self.eobrun & ((1 << nbits) - 1), nbits);
        for bit in std::mem::take(&mut self.eob_bits) {
            self.bits(bit, 1);
        }
        self.eobrun = 0;
    }

    fn band(&self) -> std::ops::RangeInclusive<usize> {
        self.scan.spectral_start as usize..=self.scan.spectral_end as usize
    }

    fn encode_ac_first(&mut self, c: usize, block: &[i32; 64], al: u32) {
        let mut run = 0;
        for k in self.band() {
            let value = block[ZIGZAG[k]];
            let magnitude = value.unsigned_abs() >> al;
            if magnitude == 0 {
                run += 1;
                continue;
            }
            self.flush_eobrun();
            while run > 15 {
                self.symbol(Class::Ac, c, 0xF0);
                run -= 16;
            }
            let shifted = if value < 0 {
                -(magnitude as i32)
            } else {
                magnitude as i32
            };
            let (size, bits) = encode_value(shifted);
            self.symbol(Class::Ac, c, (run << 4) | size);
            self.bits(bits, size);
            run = 0;
        }
        if run > 0 {
            self.eobrun += 1;
            if self.eobrun == MAX_EOB_RUN {
                self.flush_eobrun();
            }
        }
    }

    fn encode_ac_refine(&mut self, c: usize, block: &[i32; 64], al: u32) {
        let band: Vec<usize> = self.band().collect();
        let magnitudes: Vec<u32> = band
            .iter()
            .map(|&k| block[ZIGZAG[k]].unsigned_abs() >> al)
            .collect();
        let last_new = magnitudes.iter().rposition(|&m| m == 1);
        let mut run = 0;
        let mut corrections: Vec<u32> = Vec::new();
        for (i, &magnitude) in magnitudes.iter().enumerate() {
            if magnitude == 0 {
                run += 1;
                continue;
            }
            while run > 15 && last_new.is_some_and(|last| i <= last) {
                self.flush_eobrun();
                self.symbol(Class::Ac, c, 0xF0);
                run -= 16;
                for bit in corrections.drain(..) {
                    self.bits(bit, 1);
                }
            }
            if magnitude > 1 {
                corrections.push(magnitude & 1);
                continue;
            }
            self.flush_eobrun();
            self.symbol(Class::Ac, c, (run << 4) | 1);
            self.bits(if block[ZIGZAG[band[i]]] < 0 { 0 } else { 1 }, 1);
            for bit in corrections.drain(..) {
                self.bits(bit, 1);
            }
            run = 0;
        }
        if run > 0 || !corrections.is_empty() {
            self.eobrun += 1;
            self.eob_bits.append(&mut corrections);
            if self.eobrun == MAX_EOB_RUN || self.eob_bits.len() > MAX_CORRECTION_BITS {
                self.flush_eobrun();
            }
        }
    }
}

impl JpegWriter {
    pub fn baseline() -> JpegWriter {
        JpegWriter {
            coding: Coding::Baseline,
            tables: TableMode::Standard,
            restart_interval: 0,
            jfif: true,
            exif: None,
            adobe_transform: None,
            comments: Vec::new(),
            trailing: Vec::new(),
        }
    }

    pub fn progressive(num_components: usize) -> JpegWriter {
        JpegWriter {
            coding: Coding::Progressive(default_progressive_script(num_components)),
            tables: TableMode::Optimized,
            ..JpegWriter::baseline()
        }
    }

    pub fn write(&self, image: &CoefficientImage) -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        if self.jfif {
            out.extend(segment(
                0xE0,
                &[b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1, 0, 1, 0, 0],
            ));
        }
        if let Some(exif) = &self.exif {
            let mut payload = b"Exif\0".to_vec();
            payload.extend_from_slice(exif);
            out.extend(segment(0xE1, &payload));
        }
        if let Some(transform) = self.adobe_transform {
            out.extend(segment(
                0xEE,
                &[b'A', b'd', b'o', b'b', b'e', 0, 100, 0, 0, 0, 0, transform],
            ));
        }
        for comment in self.comments.iter() {
            out.extend(segment(0xFE, comment));
        }
        out.extend(self.quant_tables(image));
        out.extend(self.frame_header(image));
        if self.restart_interval > 0 {
            out.extend(segment(0xDD, &self.restart_interval.to_be_bytes()));
        }

        let all: Vec<usize> = (0..image.components.len()).collect();
        let (progressive, scans) = match &self.coding {
            Coding::Baseline | Coding::Extended => (false, vec![ScanSpec::new(&all, 0, 63, 0, 0)]),
            Coding::Progressive(scans) => (true, scans.clone()),
        };
        if self.tables == TableMode::Standard {
            assert!(!progressive, "progressive scans need optimized tables");
            out.extend(segment(0xC4, &standard_tables(image.components.len())));
        }
        for scan in scans.iter() {
            let tokens =
                ScanEncoder::new(image, scan, progressive).encode(self.restart_interval as usize);
            let encoders = match self.tables {
                TableMode::Standard => standard_encoders(),
                TableMode::Optimized => {
                    let (payload, encoders) = optimized_tables(&tokens);
                    if !payload.is_empty() {
                        out.extend(segment(0xC4, &payload));
                    }
                    encoders
                }
            };
            out.extend(scan_header(image, scan));
            out.extend(entropy_code(&tokens, &encoders));
        }

        out.extend([0xFF, 0xD9]);
        out.extend_from_slice(&self.trailing);
        out
    }

    fn quant_tables(&self, image: &CoefficientImage) -> Vec<u8> {
        let mut payload = Vec::new();
        for (slot, table) in image.quant_tables.iter().enumerate() {
            let wide = table.iter().any(|&q| q > 255);
            payload.push(((wide as u8) << 4) | slot as u8);
            for &position in ZIGZAG.iter() {
                if wide {
                    payload.extend(table[position].to_be_bytes());
                } else {
                    payload.push(table[position] as u8);
                }
            }
        }
        segment(0xDB, &payload)
    }

    fn frame_header(&self, image: &CoefficientImage) -> Vec<u8> {
        let marker = match self.coding {
            Coding::Baseline => 0xC0,
            Coding::Extended => 0xC1,
            Coding::Progressive(_) => 0xC2,
        };
        let mut payload = vec![8];
        payload.extend((image.height as u16).to_be_bytes());
        payload.extend((image.width as u16).to_be_bytes());
        payload.push(image.components.len() as u8);
        for component in image.components.iter() {
            let spec = component.spec;
            payload.extend([spec.id, (spec.h << 4) | spec.v, spec.quant_table]);
        }
        segment(marker, &payload)
    }
}

fn scan_header(image: &CoefficientImage, scan: &ScanSpec) -> Vec<u8> {
    let mut payload = vec![scan.components.len() as u8];
    for &c in scan.components.iter() {
        let component: &CoefficientComponent = &image.components[c];
        let slot = table_slot(c) as u8;
        payload.extend([component.spec.id, (slot << 4) | slot]);
    }
    payload.extend([
        scan.spectral_start,
        scan.spectral_end,
        (scan.successive_high << 4) | scan.successive_low,
    ]);
    segment(0xDA, &payload)
}

fn table_payload(class: Class, slot: usize, spec: &HuffmanSpec) -> Vec<u8> {
    let mut payload = vec![((class as u8) << 4) | slot as u8];
    payload.extend_from_slice(&spec.counts);
    payload.extend_from_slice(&spec.symbols);
    payload
}

fn standard_tables(num_components: usize) -> Vec<u8> {
    let mut payload = table_payload(Class::Dc, 0, &dc_luminance());
    payload.extend(table_payload(Class::Ac, 0, &ac_luminance()));
    if num_components > 1 {
        payload.extend(table_payload(Class::Dc, 1, &dc_chrominance()));
        payload.extend(table_payload(Class::Ac, 1, &ac_chrominance()));
    }
    payload
}

type Encoders = [[Option<HuffmanEncoder>; 2]; 2];

fn standard_encoders() -> Encoders {
    [
        [
            Some(HuffmanEncoder::new(&dc_luminance())),
            Some(HuffmanEncoder::new(&dc_chrominance())),
        ],
        [
            Some(HuffmanEncoder::new(&ac_luminance())),
            Some(HuffmanEncoder::new(&ac_chrominance())),
        ],
    ]
}

/// Builds a table for every class and slot the tokens use.
fn optimized_tables(tokens: &[Token]) -> (Vec<u8>, Encoders) {
    let mut frequencies = [[[0u32; 256]; 2]; 2];
    for token in tokens {
        if let Token::Symbol(class, slot, symbol) = *token {
            frequencies[class as usize][slot][symbol as usize] += 1;
        }
    }
    let mut payload = Vec::new();
    let mut encoders: Encoders = Default::default();
    for class in [Class::Dc, Class::Ac] {
        for slot in 0..2 {
            let counts = &frequencies[class as usize][slot];
            if counts.iter().all(|&f| f == 0) {
                continue;
            }
            let spec = optimal_spec(counts);
            payload.extend(table_payload(class, slot, &spec));
            encoders[class as usize][slot] = Some(HuffmanEncoder::new(&spec));
        }
    }
    (payload, encoders)
}

fn entropy_code(tokens: &[Token], encoders: &Encoders) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for token in tokens {
        match *token {
            Token::Symbol(class, slot, symbol) => {
                let encoder = encoders[class as usize][slot]
                    .as_ref()
                    .expect("table for symbol");
                let (code, length) = encoder.code(symbol);
                writer.write(code as u32, length);
            }
            Token::Bits(value, length) => writer.write(value, length),
            Token::Restart(n) => {
                writer.flush();
                writer.out.extend([0xFF, 0xD0 + n]);
            }
        }
    }
    writer.flush();
    writer.out
}
