// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::headers::FrameKind;

pub const SOI: u16 = 0xFFD8;
pub const EOI: u16 = 0xFFD9;

/// The two-byte codes the container walk knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    StartOfImage,
    EndOfImage,
    /// APP0 through APP15.
    App(u8),
    Comment,
    DefineQuantTables,
    DefineHuffmanTables,
    DefineRestartInterval,
    DefineNumberOfLines,
    StartOfFrame(FrameKind),
    /// Lossless, hierarchical and arithmetic-coded frames.
    UnsupportedFrame(u16),
    StartOfScan,
    /// A stuffed `ff 00` pair outside of entropy-coded data.
    Stuffed,
    Unknown(u16),
}

impl Marker {
    pub fn from_code(code: u16) -> Marker {
        match code {
            0xFFD8 => Marker::StartOfImage,
            0xFFD9 => Marker::EndOfImage,
            0xFFE0..=0xFFEF => Marker::App((code & 15) as u8),
            0xFFFE => Marker::Comment,
            0xFFDB => Marker::DefineQuantTables,
            0xFFC4 => Marker::DefineHuffmanTables,
            0xFFDD => Marker::DefineRestartInterval,
            0xFFDC => Marker::DefineNumberOfLines,
            0xFFC0 => Marker::StartOfFrame(FrameKind::Baseline),
            0xFFC1 => Marker::StartOfFrame(FrameKind::Extended),
            0xFFC2 => Marker::StartOfFrame(FrameKind::Progressive),
            0xFFC3 | 0xFFC5..=0xFFC7 | 0xFFC9..=0xFFCB | 0xFFCD..=0xFFCF => {
                Marker::UnsupportedFrame(code)
            }
            0xFFDA => Marker::StartOfScan,
            0xFF00 => Marker::Stuffed,
            _ => Marker::Unknown(code),
        }
    }
}

pub fn is_restart(code: u16) -> bool {
    (0xFFD0..=0xFFD7).contains(&code)
}
