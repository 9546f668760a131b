//! Count-prefixed sequences and maps (QList / QMap / QMultiMap shapes).
//!
//! Both shapes start with an i32 element count. Counts that are negative or
//! above [`MAX_ELEMENTS`] are rejected before anything is allocated.

use std::hash::Hash;

use indexmap::IndexMap;

use super::ByteCursor;
use crate::error::{Error, FieldContext, Result};

/// Ceiling for any collection count.
pub const MAX_ELEMENTS: i32 = 1_000_000;

/// Read and validate a collection count.
pub fn read_count(reader: &mut ByteCursor) -> Result<usize> {
    let offset = reader.position();
    let count = reader.read_i32()?;
    if !(0..=MAX_ELEMENTS).contains(&count) {
        return Err(Error::malformed(offset, format!("implausible element count {count}")));
    }
    Ok(count as usize)
}

/// Initial capacity that cannot be inflated by a hostile count.
fn capacity_for(count: usize, reader: &ByteCursor) -> usize {
    count.min(reader.remaining())
}

/// Count-prefixed sequence of T.
pub fn read_sequence<T>(
    reader: &mut ByteCursor,
    mut decode: impl FnMut(&mut ByteCursor) -> Result<T>,
) -> Result<Vec<T>> {
    let count = read_count(reader)?;
    let mut items = Vec::with_capacity(capacity_for(count, reader));
    for i in 0..count {
        items.push(decode(reader).map_err(|e| e.in_field(&format!("[{i}]")))?);
    }
    Ok(items)
}

/// Count-prefixed sequence of alternating key/value elements.
///
/// Duplicate keys (QMultiMap) keep the last value read.
pub fn read_ordered_map<K, V>(
    reader: &mut ByteCursor,
    mut decode_key: impl FnMut(&mut ByteCursor) -> Result<K>,
    mut decode_value: impl FnMut(&mut ByteCursor) -> Result<V>,
) -> Result<IndexMap<K, V>>
where
    K: Hash + Eq,
{
    let mut map = IndexMap::new();
    read_pairs(reader, &mut decode_key, &mut decode_value, |k, v| {
        map.insert(k, v);
    })?;
    Ok(map)
}

/// Like [`read_ordered_map`] but hands every pair to `sink`, keeping duplicates.
pub fn read_pairs<K, V>(
    reader: &mut ByteCursor,
    mut decode_key: impl FnMut(&mut ByteCursor) -> Result<K>,
    mut decode_value: impl FnMut(&mut ByteCursor) -> Result<V>,
    mut sink: impl FnMut(K, V),
) -> Result<()> {
    let count = read_count(reader)?;
    for i in 0..count {
        let key = decode_key(reader).field("key").map_err(|e| e.in_field(&format!("[{i}]")))?;
        let value = decode_value(reader)
            .field("value")
            .map_err(|e| e.in_field(&format!("[{i}]")))?;
        sink(key, value);
    }
    Ok(())
}

// Element decoders, so call sites stay declarative.

pub fn int(reader: &mut ByteCursor) -> Result<i32> {
    reader.read_i32()
}

pub fn uint(reader: &mut ByteCursor) -> Result<u32> {
    reader.read_u32()
}

pub fn string(reader: &mut ByteCursor) -> Result<String> {
    reader.read_string()
}

pub fn boolean(reader: &mut ByteCursor) -> Result<bool> {
    reader.read_bool()
}
