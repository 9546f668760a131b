//! Byte-source acquisition: files, readers, gzip-wrapped streams.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use super::assembler::{parse_document, ParseOutcome};
use crate::config::ParseOptions;
use crate::error::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Inflate gzip input; anything else is returned unchanged.
pub fn decompress_if_needed(data: Vec<u8>) -> Result<Vec<u8>> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Ok(data);
    }
    let mut decoder = GzDecoder::new(data.as_slice());
    let mut inflated = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| Error::Io(format!("gzip error: {e}")))?;
    Ok(inflated)
}

/// Read a whole source into memory, inflating it if needed.
pub fn read_source(mut source: impl Read) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    decompress_if_needed(data)
}

/// Decode everything `source` yields.
///
/// I/O failures are returned as errors; decode failures come back inside
/// the outcome with the partial document.
pub fn parse_reader(source: impl Read, options: &ParseOptions) -> Result<ParseOutcome> {
    let data = read_source(source)?;
    Ok(parse_document(&data, options))
}

pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParseOutcome> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    parse_reader(std::io::BufReader::new(file), options)
}
