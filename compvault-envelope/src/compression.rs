use crate::error::{EnvelopeError, EnvelopeResult};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::io::{Read, Write};

pub(crate) fn deflate(data: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| EnvelopeError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| EnvelopeError::Compression(e.to_string()))
}

pub(crate) fn inflate(data: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| EnvelopeError::Compression(e.to_string()))?;
    Ok(out)
}
