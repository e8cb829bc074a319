// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::Path;

use color_eyre::eyre::{Result, eyre};
use jpeg::api::JpegImage;

pub mod png;
pub mod pnm;

/// Encodes `image` in the format selected by the extension of `path`.
pub fn encode_for_path(image: &JpegImage, path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => {
            let mut buf = Vec::new();
            png::to_png(image, &mut buf)?;
            Ok(buf)
        }
        Some("pgm") | Some("ppm") | Some("pam") => pnm::to_pnm(image, extension.as_deref()),
        _ => Err(eyre!(
            "Output format not supported for {}; use .png, .ppm, .pgm or .pam",
            path.display()
        )),
    }
}
