// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Huffman code construction on the encoding side.

use crate::tables::HuffmanSpec;

/// Code and length for each of the 256 symbols; length 0 means unused.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    codes: [(u16, u8); 256],
}

impl HuffmanEncoder {
    /// Assigns canonical codes to the symbols of `spec`.
    pub fn new(spec: &HuffmanSpec) -> HuffmanEncoder {
        let mut codes = [(0u16, 0u8); 256];
        let mut symbols = spec.symbols.iter();
        let mut code = 0u32;
        for (length, &count) in (1..=16u8).zip(spec.counts.iter()) {
            for _ in 0..count {
                let symbol = *symbols.next().expect("too few symbols");
                codes[symbol as usize] = (code as u16, length);
                code += 1;
            }
            code <<= 1;
        }
        HuffmanEncoder { codes }
    }

    /// Returns `(code, length)`; panics if the symbol has no code.
    pub fn code(&self, symbol: u8) -> (u16, u8) {
        let code = self.codes[symbol as usize];
        assert!(code.1 > 0, "symbol {symbol:02x} has no code");
        code
    }
}

/// Builds a length-limited table for the given symbol frequencies, following
/// the procedure of T.81 Annex K.2. The all-ones code stays unused.
pub fn optimal_spec(frequencies: &[u32; 256]) -> HuffmanSpec {
    // Index 256 is a reserved symbol with the lowest priority.
    let mut freq = [0u64; 257];
    for (f, &src) in freq.iter_mut().zip(frequencies.iter()) {
        *f = src as u64;
    }
    freq[256] = 1;
    let mut code_size = [0usize; 257];
    let mut others = [None::<usize>; 257];

    loop {
        // Smallest frequency, preferring the largest symbol on ties.
        let mut c1 = None;
        for i in 0..257 {
            if freq[i] != 0 && c1.is_none_or(|c: usize| freq[i] <= freq[c]) {
                c1 = Some(i);
            }
        }
        let mut c2 = None;
        for i in 0..257 {
            if freq[i] != 0 && Some(i) != c1 && c2.is_none_or(|c: usize| freq[i] <= freq[c]) {
                c2 = Some(i);
            }
        }
        let (Some(mut c1), Some(mut c2)) = (c1, c2) else {
            break;
        };
        freq[c1] += freq[c2];
        freq[c2] = 0;
        code_size[c1] += 1;
        while let Some(next) = others[c1] {
            c1 = next;
            code_size[c1] += 1;
        }
        others[c1] = Some(c2);
        code_size[c2] += 1;
        while let Some(next) = others[c2] {
            c2 = next;
            code_size[c2] += 1;
        }
    }

    let mut bits = [0u32; 33];
    for &size in code_size.iter().filter(|&&size| size > 0) {
        assert!(size <= 32, "code length overflow");
        bits[size] += 1;
    }
    for i in (17..=32).rev() {
        while bits[i] > 0 {
            let mut j = i - 2;
            while bits[j] == 0 {
                j -= 1;
            }
            bits[i] -= 2;
            bits[i - 1] += 1;
            bits[j + 1] += 2;
            bits[j] -= 1;
        }
    }
    // Drop the reserved symbol, which has the longest code.
    let mut i = 16;
    while bits[i] == 0 {
        i -= 1;
    }
    bits[i] -= 1;

    let mut symbols = Vec::new();
    for size in 1..=32 {
        for symbol in 0..256 {
            if code_size[symbol] == size {
                symbols.push(symbol as u8);
            }
        }
    }
    let mut counts = [0u8; 16];
    for (count, &b) in counts.iter_mut().zip(bits[1..=16].iter()) {
        *count = b as u8;
    }
    HuffmanSpec { counts, symbols }
}
