// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

/// Coarse classification of decoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a structurally valid JPEG stream.
    Format,
    /// The input is valid but uses a feature this decoder does not handle.
    Unsupported,
    /// Decoding would exceed a configured or system resource limit.
    ResourceLimit,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("SOI not found: not a JPEG file")]
    NotAJpeg,
    #[error("Unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("Only single frame JPEGs are supported")]
    MultipleFrames,
    #[error("{0} found before any frame header")]
    MissingFrame(&'static str),
    #[error("Unknown JPEG marker {0:04x}")]
    UnknownMarker(u16),
    #[error("Scan references unknown component {0}")]
    UnknownComponent(u8),
    #[error("Invalid {0} table specification {1:02x}")]
    InvalidTableSpec(&'static str, u8),
    #[error("Invalid Huffman table: {0}")]
    InvalidHuffmanTable(&'static str),
    #[error("Invalid Huffman sequence")]
    InvalidHuffmanCode,
    #[error("Scan uses undefined {0} Huffman table {1}")]
    MissingHuffmanTable(&'static str, usize),
    #[error("Component uses undefined quantization table {0}")]
    MissingQuantTable(usize),
    #[error("Marker was not found, found {0:04x} instead")]
    MarkerNotFound(u16),
    #[error("Unexpected marker ff{0:02x} inside entropy-coded data")]
    UnexpectedMarker(u8),
    #[error("Unexpected end of entropy-coded data")]
    UnexpectedEndOfScan,
    #[error("Invalid sampling factors {0}x{1}")]
    InvalidSamplingFactor(u8, u8),
    #[error("Invalid ACn encoding: coefficient size {0} in refinement scan")]
    InvalidRefinementCode(u8),
    #[error("AC run reaches past the last coefficient: {0}")]
    InvalidAcRun(usize),
    #[error("Invalid coefficient size {0}")]
    InvalidCoefficientSize(u32),
    #[error("Invalid image size: {0}x{1}")]
    InvalidImageSize(usize, usize),
    #[error("Invalid segment length {0}")]
    InvalidSegmentLength(usize),
    #[error("Invalid scan header: {0}")]
    InvalidScanHeader(&'static str),
    #[error("Unsupported color mode ({0} components)")]
    UnsupportedColorMode(usize),
    #[error("Unsupported color mode (4 components without Adobe marker)")]
    UnsupportedCmykWithoutAdobe,
    #[error("Unsupported frame type {0:04x}")]
    UnsupportedFrameType(u16),
    #[error("Unsupported sample precision {0}")]
    UnsupportedPrecision(u8),
    #[error("Cannot convert {0} components to {1}")]
    UnsupportedConversion(usize, &'static str),
    #[error("max_megapixels limit exceeded by {0}MP")]
    ResolutionLimitExceeded(u64),
    #[error("max_memory_mb limit exceeded by at least {0}MB")]
    MemoryLimitExceeded(u64),
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedColorMode(_)
            | Error::UnsupportedCmykWithoutAdobe
            | Error::UnsupportedFrameType(_)
            | Error::UnsupportedPrecision(_)
            | Error::UnsupportedConversion(..) => ErrorKind::Unsupported,
            Error::ResolutionLimitExceeded(_)
            | Error::MemoryLimitExceeded(_)
            | Error::OutOfMemory(_) => ErrorKind::ResourceLimit,
            _ => ErrorKind::Format,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Error::NotAJpeg.kind(), ErrorKind::Format);
        assert_eq!(Error::InvalidRefinementCode(2).kind(), ErrorKind::Format);
        assert_eq!(
            Error::UnsupportedCmykWithoutAdobe.kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            Error::MemoryLimitExceeded(3).kind(),
            ErrorKind::ResourceLimit
        );
    }

    #[test]
    fn limit_messages_state_excess() {
        assert_eq!(
            Error::ResolutionLimitExceeded(42).to_string(),
            "max_megapixels limit exceeded by 42MP"
        );
        assert_eq!(
            Error::MemoryLimitExceeded(7).to_string(),
            "max_memory_mb limit exceeded by at least 7MB"
        );
    }
}
