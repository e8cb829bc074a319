// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Marker segment walk over a complete JPEG stream.

pub mod marker;

use byteorder::{BigEndian, ByteOrder};

use crate::{
    api::{JpegMetadata, ResourceGuard},
    error::{Error, Result},
    frame::{Frame, scan::ScanDecoder},
    headers::{
        AdobeHeader, FrameHeader, FrameKind, HuffmanTables, JfifHeader, NUM_QUANT_TABLES,
        QuantTable, ScanHeader, SegmentReader, exif_payload, read_comment,
    },
    util::{tracing_wrappers::*, try_to_vec},
};

use marker::{Marker, SOI};

/// Everything the walk collected, ready for reconstruction.
#[derive(Debug)]
pub struct ParsedStream {
    pub frame: Frame,
    pub quant_tables: [Option<QuantTable>; NUM_QUANT_TABLES],
    pub metadata: JpegMetadata,
}

/// Table and frame state of one decode call.
pub struct ContainerParser<'a> {
    data: &'a [u8],
    position: usize,
    guard: &'a ResourceGuard<'a>,
    quant_tables: [Option<QuantTable>; NUM_QUANT_TABLES],
    /// Slots as they were when the frame header was read.
    frame_quant_tables: [Option<QuantTable>; NUM_QUANT_TABLES],
    huffman_tables: HuffmanTables,
    restart_interval: usize,
    frame: Option<Frame>,
    metadata: JpegMetadata,
}

impl<'a> ContainerParser<'a> {
    pub fn new(data: &'a [u8], guard: &'a ResourceGuard<'a>) -> Self {
        Self {
            data,
            position: 0,
            guard,
            quant_tables: [None; NUM_QUANT_TABLES],
            frame_quant_tables: [None; NUM_QUANT_TABLES],
            huffman_tables: HuffmanTables::default(),
            restart_interval: 0,
            frame: None,
            metadata: JpegMetadata::default(),
        }
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, err))]
    pub fn parse(mut self) -> Result<ParsedStream> {
        if self.data.len() < 2 || BigEndian::read_u16(self.data) != SOI {
            return Err(Error::NotAJpeg);
        }
        self.position = 2;

        loop {
            self.skip_fill_bytes();
            let start = self.position;
            let code = self.read_code()?;
            let marker = Marker::from_code(code);
            trace!(position = start, code, ?marker, "marker");
            match marker {
                Marker::EndOfImage => break,
                Marker::Stuffed => {}
                Marker::App(n) => {
                    let payload = self.read_segment("APPn")?;
                    self.read_app_data(n, payload)?;
                }
                Marker::Comment => {
                    let payload = self.read_segment("COM")?;
                    self.metadata.comments.push(read_comment(payload));
                }
                Marker::DefineQuantTables => {
                    let payload = self.read_segment("DQT")?;
                    QuantTable::read_all(payload, &mut self.quant_tables)?;
                }
                Marker::DefineHuffmanTables => {
                    let payload = self.read_segment("DHT")?;
                    self.huffman_tables.read(payload)?;
                }
                Marker::DefineRestartInterval => {
                    let payload = self.read_segment("DRI")?;
                    self.restart_interval = SegmentReader::new(payload, "DRI").read_u16()? as usize;
                    debug!(restart_interval = self.restart_interval, "restart interval");
                }
                Marker::DefineNumberOfLines => {
                    self.read_segment("DNL")?;
                }
                Marker::StartOfFrame(kind) => {
                    let payload = self.read_segment("SOF")?;
                    self.read_frame(kind, payload)?;
                }
                Marker::UnsupportedFrame(code) => return Err(Error::UnsupportedFrameType(code)),
                Marker::StartOfScan => {
                    let payload = self.read_segment("SOS")?;
                    self.read_scan(payload)?;
                }
                Marker::StartOfImage | Marker::Unknown(_) => {
                    // A segment whose declared length swallowed the 0xFF of the
                    // following marker.
                    let resync = start > 0
                        && self.data[start - 1] == 0xFF
                        && (0xC0..=0xFE).contains(&self.data[start]);
                    if !resync {
                        return Err(Error::UnknownMarker(code));
                    }
                    warn!(position = start, code, "resynchronizing on marker");
                    self.position = start - 1;
                }
            }
        }

        let frame = self.frame.ok_or(Error::MissingFrame("EOI"))?;
        // A table defined before SOF stays bound to the frame; slots first
        // defined later are taken as last seen.
        let quant_tables =
            array_init::array_init(|i| self.frame_quant_tables[i].or(self.quant_tables[i]));
        Ok(ParsedStream {
            frame,
            quant_tables,
            metadata: self.metadata,
        })
    }

    fn skip_fill_bytes(&mut self) {
        while self.data.get(self.position) == Some(&0xFF)
            && self.data.get(self.position + 1) == Some(&0xFF)
        {
            self.position += 1;
        }
    }

    fn read_code(&mut self) -> Result<u16> {
        let bytes = self
            .data
            .get(self.position..self.position + 2)
            .ok_or(Error::UnexpectedEof("marker"))?;
        self.position += 2;
        Ok(BigEndian::read_u16(bytes))
    }

    /// Returns the payload of a length-prefixed segment and moves past it.
    fn read_segment(&mut self, name: &'static str) -> Result<&'a [u8]> {
        let length = self.read_code().map_err(|_| Error::UnexpectedEof(name))? as usize;
        if length < 2 {
            return Err(Error::InvalidSegmentLength(length));
        }
        let start = self.position;
        let end = start + length - 2;
        if end > self.data.len() {
            return Err(Error::UnexpectedEof(name));
        }
        self.position = end;
        Ok(&self.data[start..end])
    }

    fn read_app_data(&mut self, n: u8, payload: &[u8]) -> Result<()> {
        match n {
            0 => {
                if let Some(jfif) = JfifHeader::read(payload)? {
                    debug!(?jfif, "JFIF");
                    self.metadata.jfif = Some(jfif);
                }
            }
            1 => {
                if let Some(exif) = exif_payload(payload) {
                    debug!(len = exif.len(), "Exif");
                    self.metadata.exif = Some(try_to_vec(exif)?);
                }
            }
            14 => {
                if let Some(adobe) = AdobeHeader::read(payload) {
                    debug!(?adobe, "Adobe");
                    self.metadata.adobe = Some(adobe);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn read_frame(&mut self, kind: FrameKind, payload: &[u8]) -> Result<()> {
        if self.frame.is_some() {
            return Err(Error::MultipleFrames);
        }
        let header = FrameHeader::read(kind, payload)?;
        self.guard.check(&header)?;
        self.frame = Some(Frame::new(header)?);
        self.frame_quant_tables = self.quant_tables;
        Ok(())
    }

    fn read_scan(&mut self, payload: &[u8]) -> Result<()> {
        let frame = self.frame.as_mut().ok_or(Error::MissingFrame("SOS"))?;
        let header = ScanHeader::read(payload, &frame.header)?;
        let decoder = ScanDecoder::new(
            self.data,
            self.position,
            &header,
            frame,
            &self.huffman_tables,
            self.restart_interval,
        );
        self.position = decoder.decode(frame)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::{JpegDecoderLimits, JpegOutputFormat};
    use test_log::test;

    fn parse(data: &[u8]) -> Result<ParsedStream> {
        let limits = JpegDecoderLimits::default_safe();
        let guard = ResourceGuard::new(&limits, JpegOutputFormat::Rgba);
        ContainerParser::new(data, &guard).parse()
    }

    const SOF: [u8; 13] = [
        0xFF, 0xC0, 0, 11, 8, 0, 8, 0, 8, 1, 1, 0x11, 0,
    ];

    fn stream(segments: &[&[u8]]) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        for segment in segments {
            data.extend_from_slice(segment);
        }
        data.extend([0xFF, 0xD9]);
        data
    }

    #[test]
    fn not_a_jpeg() {
        assert!(matches!(parse(b"\x89PNG"), Err(Error::NotAJpeg)));
        assert!(matches!(parse(&[0xFF]), Err(Error::NotAJpeg)));
    }

    #[test]
    fn frame_and_metadata() {
        let com = [0xFF, 0xFE, 0, 5, b'a', b'b', b'c'];
        let exif = [0xFF, 0xE1, 0, 9, b'E', b'x', b'i', b'f', 0, 1, 2];
        let parsed = parse(&stream(&[&com, &exif, &[0xFF, 0xFF], &SOF])).unwrap();
        assert_eq!(parsed.frame.header.width, 8);
        assert_eq!(parsed.metadata.comments, vec!["abc".to_string()]);
        assert_eq!(parsed.metadata.exif, Some(vec![1, 2]));
        assert_eq!(parsed.metadata.jfif, None);
    }

    #[test]
    fn second_frame() {
        assert!(matches!(
            parse(&stream(&[&SOF, &SOF])),
            Err(Error::MultipleFrames)
        ));
    }

    #[test]
    fn missing_frame() {
        assert!(matches!(parse(&stream(&[])), Err(Error::MissingFrame(_))));
        let sos = [0xFF, 0xDA, 0, 8, 1, 1, 0, 0, 63, 0];
        assert!(matches!(
            parse(&stream(&[&sos])),
            Err(Error::MissingFrame("SOS"))
        ));
    }

    #[test]
    fn missing_eoi() {
        let mut data = stream(&[&SOF]);
        data.truncate(data.len() - 2);
        assert!(matches!(parse(&data), Err(Error::UnexpectedEof("marker"))));
    }

    #[test]
    fn segment_overruns_input() {
        let data = [0xFF, 0xD8, 0xFF, 0xFE, 0, 10, 1, 2];
        assert!(matches!(parse(&data), Err(Error::UnexpectedEof("COM"))));
        let data = [0xFF, 0xD8, 0xFF, 0xFE, 0, 1, 0xFF, 0xD9];
        assert!(matches!(parse(&data), Err(Error::InvalidSegmentLength(1))));
    }

    #[test]
    fn unsupported_frames() {
        let mut sof = SOF;
        sof[1] = 0xC3;
        assert!(matches!(
            parse(&stream(&[&sof])),
            Err(Error::UnsupportedFrameType(0xFFC3))
        ));
        sof[1] = 0xC9;
        assert!(matches!(
            parse(&stream(&[&sof])),
            Err(Error::UnsupportedFrameType(0xFFC9))
        ));
    }

    #[test]
    fn unknown_marker() {
        assert!(matches!(
            parse(&stream(&[&[0x12, 0x34]])),
            Err(Error::UnknownMarker(0x1234))
        ));
    }

    #[test]
    fn resynchronizes_on_swallowed_ff() {
        // The comment declares one byte too many and swallows the 0xFF of the
        // frame marker.
        let com = [0xFF, 0xFE, 0, 4, b'x', 0xFF];
        let parsed = parse(&stream(&[&com, &SOF[1..]])).unwrap();
        assert_eq!(parsed.metadata.comments, vec!["x\u{ff}".to_string()]);
        assert_eq!(parsed.frame.header.height, 8);
    }

    fn dqt(value: u8) -> Vec<u8> {
        let mut segment = vec![0xFF, 0xDB, 0, 67, 0];
        segment.extend([value; 64]);
        segment
    }

    #[test]
    fn quant_tables_bind_at_frame_header() {
        let parsed = parse(&stream(&[&dqt(3), &SOF, &dqt(9)])).unwrap();
        assert_eq!(parsed.quant_tables[0].unwrap().values, [3; 64]);

        let parsed = parse(&stream(&[&SOF, &dqt(9)])).unwrap();
        assert_eq!(parsed.quant_tables[0].unwrap().values, [9; 64]);
    }

    #[test]
    fn limits_apply_before_allocation() {
        let limits = JpegDecoderLimits {
            max_megapixels: Some(0.00001),
            max_memory_mb: None,
        };
        let guard = ResourceGuard::new(&limits, JpegOutputFormat::Rgba);
        let data = stream(&[&SOF]);
        assert!(matches!(
            ContainerParser::new(&data, &guard).parse(),
            Err(Error::ResolutionLimitExceeded(1))
        ));
    }
}
