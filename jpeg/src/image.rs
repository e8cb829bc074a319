// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util::{tracing_wrappers::*, try_filled_vec},
};

/// Row-major 8-bit samples of one component.
pub struct Plane {
    size: (usize, usize),
    data: Vec<u8>,
}

impl Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Plane {}x{}", self.size.0, self.size.1)
    }
}

impl Plane {
    #[cfg_attr(feature = "tracing", instrument(err))]
    pub fn new(size: (usize, usize)) -> Result<Plane> {
        let (xsize, ysize) = size;
        if xsize == 0 || ysize == 0 {
            return Err(Error::InvalidImageSize(xsize, ysize));
        }
        let total_size = xsize
            .checked_mul(ysize)
            .ok_or(Error::InvalidImageSize(xsize, ysize))?;
        trace!("trying to allocate plane");
        Ok(Plane {
            size,
            data: try_filled_vec(total_size, 0)?,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.size.0;
        &self.data[start..start + self.size.0]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.size.0;
        &mut self.data[start..start + self.size.0]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rows() {
        let mut plane = Plane::new((3, 2)).unwrap();
        plane.row_mut(1).copy_from_slice(&[1, 2, 3]);
        assert_eq!(plane.row(0), &[0, 0, 0]);
        assert_eq!(plane.row(1), &[1, 2, 3]);
        assert_eq!(plane.size(), (3, 2));
    }

    #[test]
    fn empty_is_invalid() {
        assert!(matches!(
            Plane::new((0, 5)),
            Err(Error::InvalidImageSize(0, 5))
        ));
    }
}
