//! `PlantUML` text encoding.
//!
//! The encoding used by `PlantUML` servers and the `plantuml-encoder`
//! family of libraries:
//! 1. raw DEFLATE of the UTF-8 source
//! 2. zero-pad to a multiple of 3 bytes
//! 3. base64 with the alphabet `0-9A-Za-z-_`, no padding characters
//!
//! The result is URL-safe, compact, and reversible with [`decode`].

use std::io::{Read, Write};

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::consts::PLANTUML_ALPHABET;
use crate::error::EncodingError;

const ALPHABET: Alphabet = match Alphabet::new(PLANTUML_ALPHABET) {
    Ok(alphabet) => alphabet,
    Err(_) => panic!("invalid PlantUML alphabet"),
};

const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &ALPHABET,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode diagram source for use in a server URL or cache key.
///
/// # Example
///
/// ```
/// let encoded = mdinline_diagrams::encode("A->B").unwrap();
/// assert_eq!(mdinline_diagrams::decode(&encoded).unwrap(), "A->B");
/// ```
pub fn encode(source: &str) -> Result<String, EncodingError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(source.as_bytes())
        .map_err(EncodingError::Deflate)?;
    let mut compressed = encoder.finish().map_err(EncodingError::Deflate)?;

    // Whole 3-byte groups always produce 4 symbols
    let padded_len = compressed.len().div_ceil(3) * 3;
    compressed.resize(padded_len, 0);

    Ok(ENGINE.encode(compressed))
}

/// Decode text produced by [`encode`] back into diagram source.
pub fn decode(encoded: &str) -> Result<String, EncodingError> {
    let compressed = ENGINE.decode(encoded)?;

    // The decoder stops at the end of the deflate stream, ignoring zero padding
    let mut source = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut source)
        .map_err(EncodingError::Inflate)?;

    Ok(String::from_utf8(source)?)
}
