//! Conversion between register-sized words and raw wire bytes.
//!
//! SPI payloads are plain bytes, but callers porting register tables or
//! command sequences often hold them as wider integers. `encode` narrows a
//! word slice into a wire buffer, rejecting anything that does not fit in a
//! byte; `decode` widens a received buffer back. The round trip is lossless:
//! `decode(&encode(x)?) == x` for every in-range `x`.

use crate::error::{Error, Result};

/// Packs a slice of words into a raw byte buffer.
///
/// Fails with [`Error::WordOutOfRange`] on the first word above `0xFF`,
/// naming its index; nothing is written in that case.
pub fn encode(words: &[u16]) -> Result<Vec<u8>> {
    words
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            u8::try_from(value).map_err(|_| Error::WordOutOfRange { index, value })
        })
        .collect()
}

/// Widens a raw byte buffer back into words. Total; never fails.
pub fn decode(raw: &[u8]) -> Vec<u16> {
    raw.iter().map(|&b| u16::from(b)).collect()
}
