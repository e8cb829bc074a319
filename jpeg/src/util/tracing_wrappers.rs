// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Logging macros that compile to nothing unless the `tracing` feature is on.

#[cfg(feature = "tracing")]
pub use tracing::{debug, instrument, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! jpeg_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! jpeg_trace {
    ($($arg:tt)*) => {};
}

// A macro named `warn` cannot be re-exported under its own name: the path
// collides with the builtin `#[warn]` attribute.
#[cfg(not(feature = "tracing"))]
macro_rules! jpeg_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {jpeg_debug as debug, jpeg_trace as trace, jpeg_warn as warn};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn macros_accept_structured_fields() {
        let position = 3usize;
        let code = 0xFFE1u16;
        debug!(position, ?code, "debug");
        trace!(position = position + 1, "trace");
        warn!(position, code, "resynchronizing on marker");
    }
}
