//! Inline PNG blobs inside label records.
//!
//! The stream carries no length for the image. Its extent is found by
//! matching the PNG signature at the cursor, then scanning for the `IEND`
//! chunk type; the chunk's 4-byte CRC follows the marker and belongs to the
//! image. Leaving the CRC unread desynchronizes the rest of the label.

use tracing::warn;

use super::ByteCursor;
use crate::error::{Error, Result};

/// First four bytes of the PNG file signature.
pub const PNG_SIGNATURE: [u8; 4] = [0x89, b'P', b'N', b'G'];

/// Chunk type of the terminating PNG chunk.
pub const END_MARKER: [u8; 4] = *b"IEND";

/// Bytes following the end marker (chunk CRC).
pub const TRAILER_LEN: usize = 4;

/// Scan an embedded image starting at the cursor.
///
/// Returns `None` without consuming anything when the next bytes are not a
/// PNG signature. On success the cursor sits just past the trailer and the
/// returned slice spans signature through trailer inclusive.
pub fn scan_embedded_image<'a>(reader: &mut ByteCursor<'a>) -> Result<Option<&'a [u8]>> {
    match reader.peek(PNG_SIGNATURE.len()) {
        Ok(head) if head == PNG_SIGNATURE => {}
        _ => return Ok(None),
    }

    let start = reader.position();
    let haystack = reader.remaining_slice();
    let marker_at = haystack[PNG_SIGNATURE.len()..]
        .windows(END_MARKER.len())
        .position(|window| window == END_MARKER)
        .map(|i| i + PNG_SIGNATURE.len());

    let Some(marker_at) = marker_at else {
        return Err(Error::truncated(reader.len(), END_MARKER.len(), 0).in_field("end_marker"));
    };

    let total = marker_at + END_MARKER.len() + TRAILER_LEN;
    if total > haystack.len() {
        return Err(Error::truncated(
            start + marker_at + END_MARKER.len(),
            TRAILER_LEN,
            haystack.len() - marker_at - END_MARKER.len(),
        )
        .in_field("trailer"));
    }

    let image = reader.read_bytes(total)?;
    let trailer = u32::from_be_bytes([
        image[total - 4],
        image[total - 3],
        image[total - 2],
        image[total - 1],
    ]);
    if trailer != crc32fast::hash(&END_MARKER) {
        warn!(offset = start, trailer, "embedded image trailer checksum mismatch");
    }
    Ok(Some(image))
}

#[cfg(test)]
pub(crate) fn minimal_png(payload: &[u8]) -> Vec<u8> {
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(payload);
    png.extend_from_slice(&[0, 0, 0, 0]);
    png.extend_from_slice(&END_MARKER);
    png.extend_from_slice(&crc32fast::hash(&END_MARKER).to_be_bytes());
    png
}
