//! Per-entity decoders: global tables, area, label and room records.
//!
//! Each routine reads its fields in stream order and asks the version table
//! for every field whose presence or shape varies. Nothing here keeps a
//! partially decoded entity; a failure is returned to the caller with the
//! field path attached.

use tracing::debug;

use super::collections::{boolean, int, read_count, read_ordered_map, read_pairs, read_sequence, string, uint};
use super::pixmap::scan_embedded_image;
use super::types::{Bounds3D, Color, Font, Point2D, Vector3D};
use super::version::{field_encoding, has_field, Encoding, FieldId};
use super::ByteCursor;
use crate::error::{FieldContext, Result};
use crate::state::{Area, AreaExit, Document, DoorState, Label, LineStyle, Room};

/// Decoders bound to one stream version.
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder {
    version: i32,
    trace: bool,
}

impl RecordDecoder {
    pub fn new(version: i32) -> Self {
        Self { version, trace: false }
    }

    /// Emit per-record offset traces.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    fn encoding(&self, field: FieldId) -> Encoding {
        field_encoding(self.version, field)
    }

    fn has(&self, field: FieldId) -> bool {
        has_field(self.version, field)
    }

    /// Global tables between the version and the area records.
    ///
    /// Fields are stored on `doc` as they are read so a later failure keeps
    /// the tables already decoded.
    pub fn decode_global_tables(&self, reader: &mut ByteCursor, doc: &mut Document) -> Result<()> {
        if self.trace {
            debug!(offset = reader.position(), "global tables");
        }
        doc.env_colors = read_ordered_map(reader, int, int).field("env_colors")?;
        doc.area_names = read_ordered_map(reader, int, string).field("area_names")?;
        doc.custom_env_colors = read_ordered_map(reader, int, Color::read).field("custom_env_colors")?;
        doc.room_db_hash_to_room_id =
            read_ordered_map(reader, string, uint).field("room_db_hash_to_room_id")?;

        if self.has(FieldId::MapUserData) {
            doc.user_data = read_ordered_map(reader, string, string).field("user_data")?;
        }
        if self.has(FieldId::MapSymbolFont) {
            doc.map_symbol_font = Some(Font::read(reader).field("map_symbol_font")?);
            doc.font_fudge_factor = reader.read_f64().field("font_fudge_factor")?;
            doc.use_only_map_font = reader.read_bool().field("use_only_map_font")?;
        }
        Ok(())
    }

    pub fn decode_area(&self, reader: &mut ByteCursor, id: i32) -> Result<Area> {
        if self.trace {
            debug!(offset = reader.position(), area = id, "area record");
        }
        let mut area = Area::new(id);
        area.rooms = read_sequence(reader, int).field("rooms")?.into_iter().collect();
        area.z_levels = read_sequence(reader, int).field("z_levels")?;
        area.exits = read_sequence(reader, |r| {
            Ok(AreaExit {
                from_room: r.read_i32()?,
                to_room: r.read_i32()?,
                direction: r.read_i32()?,
            })
        })
        .field("exits")?;
        area.grid_mode = reader.read_bool().field("grid_mode")?;
        area.bounds = Bounds3D::read(reader).field("bounds")?;
        area.span = Vector3D::read(reader).field("span")?;
        area.x_max_for_z = read_ordered_map(reader, int, int).field("x_max_for_z")?;
        area.y_max_for_z = read_ordered_map(reader, int, int).field("y_max_for_z")?;
        area.x_min_for_z = read_ordered_map(reader, int, int).field("x_min_for_z")?;
        area.y_min_for_z = read_ordered_map(reader, int, int).field("y_min_for_z")?;
        area.pos = Vector3D::read(reader).field("pos")?;
        area.is_zone = reader.read_bool().field("is_zone")?;
        area.zone_area_ref = reader.read_i32().field("zone_area_ref")?;

        if self.has(FieldId::AreaUserData) {
            area.user_data = read_ordered_map(reader, string, string).field("user_data")?;
        }
        if self.has(FieldId::AreaLastZoom) {
            area.last_2d_map_zoom = Some(reader.read_f64().field("last_2d_map_zoom")?);
        }
        if self.has(FieldId::AreaLabels) {
            area.labels = read_sequence(reader, |r| self.decode_label(r)).field("labels")?;
        }
        Ok(area)
    }

    pub fn decode_label(&self, reader: &mut ByteCursor) -> Result<Label> {
        let id = reader.read_i32().field("id")?;
        if self.trace {
            debug!(offset = reader.position() - 4, label = id, "label record");
        }
        let mut label = Label::new(id, String::new());
        label.pos = match self.encoding(FieldId::LabelPosition) {
            Encoding::Spatial => Vector3D::read(reader).field("pos")?,
            _ => {
                let p = Point2D::read(reader).field("pos")?;
                Vector3D::new(p.x, p.y, 0.0)
            }
        };
        // Unused point kept by the writer for layout compatibility
        Point2D::read(reader).field("reserved")?;
        label.width = reader.read_f64().field("width")?;
        label.height = reader.read_f64().field("height")?;
        label.text = reader.read_string().field("text")?;
        label.fg_color = Color::read(reader).field("fg_color")?;
        label.bg_color = Color::read(reader).field("bg_color")?;

        reader.read_u32().field("pixmap")?;
        label.pixmap = scan_embedded_image(reader).field("pixmap")?.map(<[u8]>::to_vec);

        if self.has(FieldId::LabelFlags) {
            label.no_scaling = reader.read_bool().field("no_scaling")?;
            label.show_on_top = reader.read_bool().field("show_on_top")?;
        }
        Ok(label)
    }

    /// One map-level label group: count, owning area, then the labels.
    pub fn decode_label_group(&self, reader: &mut ByteCursor) -> Result<(i32, Vec<Label>)> {
        let count = read_count(reader).field("count")?;
        let area_id = reader.read_i32().field("area")?;
        let mut labels = Vec::with_capacity(count.min(reader.remaining()));
        for i in 0..count {
            labels.push(self.decode_label(reader).field(&format!("[{i}]"))?);
        }
        Ok((area_id, labels))
    }

    pub fn decode_room(&self, reader: &mut ByteCursor, id: i32) -> Result<Room> {
        if self.trace {
            debug!(offset = reader.position(), room = id, "room record");
        }
        let mut room = Room::new(id);
        room.area = reader.read_i32().field("area")?;
        room.x = reader.read_i32().field("x")?;
        room.y = reader.read_i32().field("y")?;
        room.z = reader.read_i32().field("z")?;
        for slot in room.exits.iter_mut() {
            *slot = reader.read_i32().field("exits")?;
        }
        room.environment = reader.read_i32().field("environment")?;
        room.weight = reader.read_i32().field("weight")?;
        room.name = reader.read_string().field("name")?;
        room.is_locked = reader.read_bool().field("is_locked")?;

        self.decode_special_exits(reader, &mut room).field("special_exits")?;

        match self.encoding(FieldId::RoomSymbol) {
            Encoding::SymbolByte => {
                let code = reader.read_u8().field("symbol")?;
                if code != 0 {
                    room.symbol = char::from(code).to_string();
                }
            }
            Encoding::SymbolString => room.symbol = reader.read_string().field("symbol")?,
            _ => {}
        }
        if self.has(FieldId::RoomSymbolColor) {
            let color = Color::read(reader).field("symbol_color")?;
            room.symbol_color = color.is_valid().then_some(color);
        }
        if self.has(FieldId::RoomUserData) {
            room.user_data = read_ordered_map(reader, string, string).field("user_data")?;
        }
        if self.has(FieldId::RoomCustomLines) {
            self.decode_custom_lines(reader, &mut room).field("custom_lines")?;
        }
        if self.has(FieldId::RoomExitLocks) {
            room.exit_locks = read_sequence(reader, int).field("exit_locks")?;
        }
        if self.has(FieldId::RoomSpecialExitLocks) {
            let locks = read_sequence(reader, string).field("special_exit_locks")?;
            for cmd in locks {
                if !room.special_exit_locks.contains(&cmd) {
                    room.special_exit_locks.push(cmd);
                }
            }
        }
        if self.has(FieldId::RoomStubs) {
            room.stubs = read_sequence(reader, int).field("stubs")?;
        }
        if self.has(FieldId::RoomExitWeights) {
            room.exit_weights = read_ordered_map(reader, string, int).field("exit_weights")?;
        }
        if self.has(FieldId::RoomDoors) {
            room.doors = read_ordered_map(reader, string, |r| r.read_i32().map(DoorState::from_raw))
                .field("doors")?;
        }
        Ok(room)
    }

    fn decode_special_exits(&self, reader: &mut ByteCursor, room: &mut Room) -> Result<()> {
        match self.encoding(FieldId::RoomSpecialExits) {
            Encoding::ExitsByDestination => read_pairs(reader, uint, string, |dest, raw| {
                let (locked, command) = split_lock_prefix(&raw);
                if locked && !room.special_exit_locks.iter().any(|c| c == command) {
                    room.special_exit_locks.push(command.to_string());
                }
                room.special_exits.insert(command.to_string(), dest as i32);
            }),
            Encoding::ExitsByCommand => {
                room.special_exits = read_ordered_map(reader, string, int)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn decode_custom_lines(&self, reader: &mut ByteCursor, room: &mut Room) -> Result<()> {
        room.custom_lines =
            read_ordered_map(reader, string, |r| read_sequence(r, Point2D::read)).field("points")?;
        room.custom_line_arrows = read_ordered_map(reader, string, boolean).field("arrows")?;

        room.custom_line_colors = match self.encoding(FieldId::RoomCustomLineColor) {
            Encoding::ColorRecord => read_ordered_map(reader, string, Color::read).field("colors")?,
            _ => read_ordered_map(reader, string, |r| read_sequence(r, int))
                .field("colors")?
                .into_iter()
                .filter_map(|(name, channels)| color_from_channels(&channels).map(|c| (name, c)))
                .collect(),
        };

        room.custom_line_styles = match self.encoding(FieldId::RoomCustomLineStyle) {
            Encoding::StyleEnum => read_ordered_map(reader, string, int)
                .field("styles")?
                .into_iter()
                .map(|(name, v)| (name, LineStyle::from_pen_style(v)))
                .collect(),
            _ => read_ordered_map(reader, string, string)
                .field("styles")?
                .into_iter()
                .map(|(name, style)| (name, LineStyle::from_name(&style)))
                .collect(),
        };
        Ok(())
    }
}

/// Older special-exit commands carry a leading "0" or "1" lock flag.
pub fn split_lock_prefix(raw: &str) -> (bool, &str) {
    match raw.as_bytes().first() {
        Some(b'1') => (true, &raw[1..]),
        Some(b'0') => (false, &raw[1..]),
        _ => (false, raw),
    }
}

/// r,g,b list as written by older versions; anything shorter has no color.
fn color_from_channels(channels: &[i32]) -> Option<Color> {
    let channel = |v: i32| v.clamp(0, 255) as u8;
    match channels {
        [r, g, b, ..] => Some(Color::rgb(channel(*r), channel(*g), channel(*b))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::RecordEncoder;
    use crate::codec::pixmap::minimal_png;
    use crate::codec::BinaryWriter;
    use crate::error::Error;
    use crate::state::{Direction, NO_EXIT};

    fn encode_room(version: i32, room: &Room) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        RecordEncoder::new(version).encode_room(room, &mut writer);
        writer.into_vec()
    }

    fn rich_room() -> Room {
        let mut room = Room::new(7);
        room.area = 3;
        room.x = -4;
        room.y = 9;
        room.z = 1;
        room.exits[Direction::North.index()] = 8;
        room.environment = 12;
        room.weight = 3;
        room.name = "Gate".into();
        room.special_exits.insert("enter gate".into(), 9);
        room.symbol = "G".into();
        room.user_data.insert("k".into(), "v".into());
        room.custom_lines.insert("n".into(), vec![Point2D::new(1.0, 2.0)]);
        room.custom_line_arrows.insert("n".into(), true);
        room.custom_line_colors.insert("n".into(), Color::rgb(255, 0, 0));
        room.custom_line_styles.insert("n".into(), LineStyle::Dot);
        room.exit_locks.push(Direction::North.code());
        room.stubs.push(Direction::East.code());
        room.exit_weights.insert("n".into(), 5);
        room.doors.insert("n".into(), DoorState::Closed);
        room
    }

    #[test]
    fn test_room_all_sentinel_exits() {
        let room = Room::new(1);
        let data = encode_room(21, &room);
        let mut reader = ByteCursor::new(&data);
        let decoded = RecordDecoder::new(21).decode_room(&mut reader, 1).unwrap();
        assert!(reader.is_empty());
        assert!(decoded.exits.iter().all(|e| *e == NO_EXIT));
    }

    #[test]
    fn test_room_fields_survive_each_version() {
        let room = rich_room();
        for version in [6, 9, 10, 11, 13, 16, 19, 20, 21] {
            let data = encode_room(version, &room);
            let mut reader = ByteCursor::new(&data);
            let decoded = RecordDecoder::new(version).decode_room(&mut reader, 7).unwrap();
            assert!(reader.is_empty(), "v{version} left {} bytes", reader.remaining());
            assert_eq!(decoded.exits, room.exits);
            assert_eq!(decoded.special_exits.get("enter gate"), Some(&9));
            assert_eq!(decoded.symbol.is_empty(), version < 9, "v{version}");
            assert_eq!(decoded.stubs.is_empty(), version < 13, "v{version}");
            assert_eq!(decoded.doors.get("n").copied(), (version >= 16).then_some(DoorState::Closed));
            if version >= 11 {
                assert_eq!(decoded.custom_line_colors.get("n"), Some(&Color::rgb(255, 0, 0)));
                assert_eq!(decoded.custom_line_styles.get("n"), Some(&LineStyle::Dot));
            }
        }
    }

    #[test]
    fn test_locked_special_exit_prefix() {
        let mut writer = BinaryWriter::new();
        writer.write_count(2);
        writer.write_u32(4);
        writer.write_string("1pull lever");
        writer.write_u32(5);
        writer.write_string("0climb");
        let data = writer.into_vec();
        let mut room = Room::new(1);
        RecordDecoder::new(20)
            .decode_special_exits(&mut ByteCursor::new(&data), &mut room)
            .unwrap();
        assert_eq!(room.special_exits.get("pull lever"), Some(&4));
        assert_eq!(room.special_exits.get("climb"), Some(&5));
        assert_eq!(room.special_exit_locks, vec!["pull lever".to_string()]);
    }

    #[test]
    fn test_split_lock_prefix() {
        assert_eq!(split_lock_prefix("1door"), (true, "door"));
        assert_eq!(split_lock_prefix("0door"), (false, "door"));
        assert_eq!(split_lock_prefix("door"), (false, "door"));
        assert_eq!(split_lock_prefix(""), (false, ""));
    }

    #[test]
    fn test_label_with_image_then_flags() {
        let mut label = Label::new(4, "Dock");
        label.pos = Vector3D::new(1.5, -2.0, 3.0);
        label.width = 10.0;
        label.height = 2.0;
        label.pixmap = Some(minimal_png(b"pixels"));
        label.no_scaling = true;
        label.show_on_top = true;

        let mut writer = BinaryWriter::new();
        RecordEncoder::new(20).encode_label(&label, &mut writer);
        let data = writer.into_vec();
        let mut reader = ByteCursor::new(&data);
        let decoded = RecordDecoder::new(20).decode_label(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded, label);
    }

    #[test]
    fn test_cut_image_trailer_names_field_once() {
        let mut label = Label::new(4, "Dock");
        label.pixmap = Some(minimal_png(b"pixels"));
        let mut writer = BinaryWriter::new();
        RecordEncoder::new(20).encode_label(&label, &mut writer);
        let data = writer.into_vec();

        // drop both flag bytes and half of the image trailer
        let cut = &data[..data.len() - 4];
        let err = RecordDecoder::new(20).decode_label(&mut ByteCursor::new(cut)).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { .. }));
        assert_eq!(err.field(), Some("pixmap.trailer"));

        let png_start = data.len() - 2 - label.pixmap.as_ref().map_or(0, Vec::len);
        let cut = &data[..png_start + 8];
        let err = RecordDecoder::new(20).decode_label(&mut ByteCursor::new(cut)).unwrap_err();
        assert_eq!(err.field(), Some("pixmap.end_marker"));
    }

    #[test]
    fn test_planar_label_position() {
        let mut label = Label::new(1, "old");
        label.pos = Vector3D::new(3.0, 4.0, 0.0);
        let mut writer = BinaryWriter::new();
        RecordEncoder::new(11).encode_label(&label, &mut writer);
        let data = writer.into_vec();
        let mut reader = ByteCursor::new(&data);
        let decoded = RecordDecoder::new(11).decode_label(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded.pos, label.pos);
        assert!(!decoded.show_on_top);
    }

    #[test]
    fn test_area_owns_labels_from_21() {
        let mut area = Area::new(2);
        area.rooms.extend([1, 2, 3]);
        area.z_levels = vec![0, 1];
        area.last_2d_map_zoom = Some(2.5);
        area.labels.push(Label::new(1, "here"));
        area.x_max_for_z.insert(0, 10);

        let mut writer = BinaryWriter::new();
        RecordEncoder::new(21).encode_area(&area, &mut writer);
        let data = writer.into_vec();
        let mut reader = ByteCursor::new(&data);
        let decoded = RecordDecoder::new(21).decode_area(&mut reader, 2).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded, area);
    }

    #[test]
    fn test_invalid_symbol_color_is_absent() {
        let mut room = Room::new(1);
        room.symbol_color = None;
        let data = encode_room(21, &room);
        let decoded = RecordDecoder::new(21).decode_room(&mut ByteCursor::new(&data), 1).unwrap();
        assert_eq!(decoded.symbol_color, None);
    }

    #[test]
    fn test_failure_names_field() {
        let data = encode_room(21, &rich_room());
        let cut = &data[..20];
        let err = RecordDecoder::new(21).decode_room(&mut ByteCursor::new(cut), 7).unwrap_err();
        assert_eq!(err.field(), Some("exits"));
        assert_eq!(err.offset(), Some(20));
    }

    #[test]
    fn test_color_from_short_channel_list() {
        assert_eq!(color_from_channels(&[1, 2]), None);
        assert_eq!(color_from_channels(&[300, -5, 7]), Some(Color::rgb(255, 0, 7)));
    }
}
