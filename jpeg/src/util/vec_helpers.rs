// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

/// Allocates a vector of `len` copies of `value`, reporting allocation
/// failure instead of aborting.
pub fn try_filled_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>, TryReserveError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)?;
    vec.resize(len, value);
    Ok(vec)
}

/// Fallible counterpart of `<[T]>::to_vec`.
pub fn try_to_vec<T: Clone>(slice: &[T]) -> Result<Vec<T>, TryReserveError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(slice.len())?;
    vec.extend_from_slice(slice);
    Ok(vec)
}
