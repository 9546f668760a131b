//! Deprecated tagged sub-format.
//!
//! Layout: 8-byte `ATADNOOM` tag, u8 version (1..=3), then a counted room
//! list and a counted area list. Names are u8-length UTF-8. Version 3 adds a
//! lock flag and weight to every exit.

use super::collections::read_count;
use super::ByteCursor;
use crate::error::{Error, FieldContext, Result};
use crate::state::{Area, Direction, Document, Room, DEFAULT_AREA_ID};

pub const LEGACY_TAG: [u8; 8] = *b"ATADNOOM";

pub const LEGACY_VERSIONS: std::ops::RangeInclusive<u8> = 1..=3;

/// Whether the stream starts with the legacy tag.
pub fn is_legacy(data: &[u8]) -> bool {
    data.starts_with(&LEGACY_TAG)
}

/// Decode a tagged stream into `doc`; rooms and areas decoded before a
/// failure stay in `doc`.
pub fn decode_legacy(reader: &mut ByteCursor, doc: &mut Document) -> Result<()> {
    let tag = reader.read_bytes(LEGACY_TAG.len()).field("tag")?;
    if tag != LEGACY_TAG {
        return Err(Error::malformed(0, "missing legacy tag").in_field("tag"));
    }
    let offset = reader.position();
    let version = reader.read_u8().field("version")?;
    if !LEGACY_VERSIONS.contains(&version) {
        return Err(Error::UnsupportedVersion { offset, version: version as i32 });
    }
    doc.version = version as i32;
    doc.legacy_version = Some(version);

    let room_count = read_count(reader).field("rooms")?;
    for i in 0..room_count {
        let room = decode_room(reader, version).field(&format!("rooms.[{i}]"))?;
        doc.rooms.insert(room.id, room);
    }

    let area_count = read_count(reader).field("areas")?;
    for i in 0..area_count {
        let id = reader.read_i32().field(&format!("areas.[{i}].id"))?;
        let name = reader.read_short_string().field(&format!("areas.[{i}].name"))?;
        doc.area_names.insert(id, name.clone());
        let mut area = Area::new(id);
        area.name = name;
        doc.areas.insert(id, area);
    }

    let ids: Vec<(i32, i32)> = doc.rooms.values().map(|r| (r.area, r.id)).collect();
    for (area_id, room_id) in ids {
        if let Some(area) = doc.areas.get_mut(&area_id) {
            area.rooms.insert(room_id);
        }
    }
    Ok(())
}

fn decode_room(reader: &mut ByteCursor, version: u8) -> Result<Room> {
    let mut room = Room::new(reader.read_i32().field("id")?);
    room.area = DEFAULT_AREA_ID;
    room.x = reader.read_i32().field("x")?;
    room.y = reader.read_i32().field("y")?;
    room.z = reader.read_i32().field("z")?;
    room.name = reader.read_short_string().field("name")?;
    room.environment = reader.read_i32().field("environment")?;

    let exit_count = read_count(reader).field("exits")?;
    for i in 0..exit_count {
        let name = reader.read_short_string().field(&format!("exits.[{i}].direction"))?;
        let target = reader.read_i32().field(&format!("exits.[{i}].target"))?;
        let (locked, weight) = if version >= 3 {
            let locked = reader.read_u8().field(&format!("exits.[{i}].lock"))? != 0;
            let weight = reader.read_i32().field(&format!("exits.[{i}].weight"))?;
            (locked, Some(weight))
        } else {
            (false, None)
        };

        let key = match Direction::from_name(&name) {
            Some(dir) => {
                room.exits[dir.index()] = target;
                if locked {
                    room.exit_locks.push(dir.code());
                }
                dir.short_name().to_string()
            }
            None => {
                room.special_exits.insert(name.clone(), target);
                if locked {
                    room.special_exit_locks.push(name.clone());
                }
                name
            }
        };
        if let Some(weight) = weight {
            room.exit_weights.insert(key, weight);
        }
    }
    Ok(room)
}
