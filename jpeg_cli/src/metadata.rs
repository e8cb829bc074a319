// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Write;

use jpeg::api::JpegImage;

/// Human readable summary of a decoded image and its metadata segments.
pub fn describe(image: &JpegImage, print_comments: bool) -> String {
    let mut ret = String::new();
    let _ = writeln!(
        ret,
        "{}x{}, {:?} ({} channels)",
        image.width,
        image.height,
        image.format,
        image.channels()
    );
    let metadata = &image.metadata;
    if let Some(jfif) = &metadata.jfif {
        let _ = writeln!(
            ret,
            "JFIF {}.{:02}, density {}x{} ({:?}), thumbnail {}x{}",
            jfif.version_major,
            jfif.version_minor,
            jfif.x_density,
            jfif.y_density,
            jfif.units(),
            jfif.thumb_width,
            jfif.thumb_height
        );
    }
    if let Some(adobe) = &metadata.adobe {
        let _ = writeln!(
            ret,
            "Adobe version {}, transform {} ({:?})",
            adobe.version,
            adobe.transform_code,
            adobe.transform()
        );
    }
    if let Some(exif) = &metadata.exif {
        let _ = writeln!(ret, "Exif: {} bytes", exif.len());
    }
    if !metadata.comments.is_empty() {
        let _ = writeln!(ret, "{} comment(s)", metadata.comments.len());
        if print_comments {
            for comment in metadata.comments.iter() {
                let _ = writeln!(ret, "  {comment}");
            }
        }
    }
    ret
}
