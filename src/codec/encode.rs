//! Record encoders, the inverse of [`super::records`].
//!
//! Used to build fixtures at any supported version. Fields a version does
//! not carry are left out, so an encode/decode pass at an older version
//! drops them.

use indexmap::IndexMap;

use super::types::{Bounds3D, Color, Point2D};
use super::version::{field_encoding, has_field, Encoding, FieldId};
use super::BinaryWriter;
use crate::state::{Area, Document, Label, Room};

/// Encoders bound to one stream version.
#[derive(Debug, Clone, Copy)]
pub struct RecordEncoder {
    version: i32,
}

impl RecordEncoder {
    pub fn new(version: i32) -> Self {
        Self { version }
    }

    fn encoding(&self, field: FieldId) -> Encoding {
        field_encoding(self.version, field)
    }

    fn has(&self, field: FieldId) -> bool {
        has_field(self.version, field)
    }

    /// Whole stream: version, tables, areas, hash table, labels, rooms.
    pub fn encode_document(&self, doc: &Document) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(64 + doc.rooms.len() * 96);
        writer.write_i32(self.version);
        self.encode_global_tables(doc, &mut writer);

        writer.write_count(doc.areas.len());
        for area in doc.areas.values() {
            writer.write_i32(area.id);
            self.encode_area(area, &mut writer);
        }

        writer.write_count(doc.room_id_hash.len());
        for (hash, id) in &doc.room_id_hash {
            writer.write_string(hash);
            writer.write_i32(*id);
        }

        if self.has(FieldId::MapLabels) {
            writer.write_count(doc.labels_by_area.len());
            for (area_id, labels) in &doc.labels_by_area {
                writer.write_count(labels.len());
                writer.write_i32(*area_id);
                for label in labels {
                    self.encode_label(label, &mut writer);
                }
            }
        }

        for room in doc.rooms.values() {
            writer.write_i32(room.id);
            self.encode_room(room, &mut writer);
        }
        writer.into_vec()
    }

    pub fn encode_global_tables(&self, doc: &Document, writer: &mut BinaryWriter) {
        write_map(writer, &doc.env_colors, |w, k| w.write_i32(*k), |w, v| w.write_i32(*v));
        write_map(writer, &doc.area_names, |w, k| w.write_i32(*k), |w, v| w.write_string(v));
        write_map(writer, &doc.custom_env_colors, |w, k| w.write_i32(*k), |w, v| v.write(w));
        write_map(writer, &doc.room_db_hash_to_room_id, |w, k| w.write_string(k), |w, v| w.write_u32(*v));
        if self.has(FieldId::MapUserData) {
            write_string_map(writer, &doc.user_data);
        }
        if self.has(FieldId::MapSymbolFont) {
            doc.map_symbol_font.clone().unwrap_or_default().write(writer);
            writer.write_f64(doc.font_fudge_factor);
            writer.write_bool(doc.use_only_map_font);
        }
    }

    pub fn encode_area(&self, area: &Area, writer: &mut BinaryWriter) {
        writer.write_count(area.rooms.len());
        for id in &area.rooms {
            writer.write_i32(*id);
        }
        write_ints(writer, &area.z_levels);
        writer.write_count(area.exits.len());
        for exit in &area.exits {
            writer.write_i32(exit.from_room);
            writer.write_i32(exit.to_room);
            writer.write_i32(exit.direction);
        }
        writer.write_bool(area.grid_mode);
        area.bounds.write(writer);
        area.span.write(writer);
        for extent in [&area.x_max_for_z, &area.y_max_for_z, &area.x_min_for_z, &area.y_min_for_z] {
            write_map(writer, extent, |w, k| w.write_i32(*k), |w, v| w.write_i32(*v));
        }
        area.pos.write(writer);
        writer.write_bool(area.is_zone);
        writer.write_i32(area.zone_area_ref);
        if self.has(FieldId::AreaUserData) {
            write_string_map(writer, &area.user_data);
        }
        if self.has(FieldId::AreaLastZoom) {
            writer.write_f64(area.last_2d_map_zoom.unwrap_or(1.0));
        }
        if self.has(FieldId::AreaLabels) {
            writer.write_count(area.labels.len());
            for label in &area.labels {
                self.encode_label(label, writer);
            }
        }
    }

    pub fn encode_label(&self, label: &Label, writer: &mut BinaryWriter) {
        writer.write_i32(label.id);
        match self.encoding(FieldId::LabelPosition) {
            Encoding::Spatial => label.pos.write(writer),
            _ => Point2D::new(label.pos.x, label.pos.y).write(writer),
        }
        Point2D::default().write(writer);
        writer.write_f64(label.width);
        writer.write_f64(label.height);
        writer.write_string(&label.text);
        label.fg_color.write(writer);
        label.bg_color.write(writer);
        match &label.pixmap {
            Some(png) => {
                writer.write_u32(1);
                writer.write_bytes(png);
            }
            None => writer.write_u32(0),
        }
        if self.has(FieldId::LabelFlags) {
            writer.write_bool(label.no_scaling);
            writer.write_bool(label.show_on_top);
        }
    }

    pub fn encode_room(&self, room: &Room, writer: &mut BinaryWriter) {
        writer.write_i32(room.area);
        writer.write_i32(room.x);
        writer.write_i32(room.y);
        writer.write_i32(room.z);
        for exit in room.exits {
            writer.write_i32(exit);
        }
        writer.write_i32(room.environment);
        writer.write_i32(room.weight);
        writer.write_string(&room.name);
        writer.write_bool(room.is_locked);

        match self.encoding(FieldId::RoomSpecialExits) {
            Encoding::ExitsByDestination => {
                writer.write_count(room.special_exits.len());
                for (command, dest) in &room.special_exits {
                    let flag = if room.special_exit_locks.contains(command) { '1' } else { '0' };
                    writer.write_u32(*dest as u32);
                    writer.write_string(&format!("{flag}{command}"));
                }
            }
            Encoding::ExitsByCommand => {
                write_map(writer, &room.special_exits, |w, k| w.write_string(k), |w, v| w.write_i32(*v));
            }
            _ => {}
        }

        match self.encoding(FieldId::RoomSymbol) {
            Encoding::SymbolByte => {
                let code = room.symbol.chars().next().and_then(|c| u8::try_from(c).ok()).unwrap_or(0);
                writer.write_u8(code);
            }
            Encoding::SymbolString => writer.write_string(&room.symbol),
            _ => {}
        }
        if self.has(FieldId::RoomSymbolColor) {
            room.symbol_color.unwrap_or_default().write(writer);
        }
        if self.has(FieldId::RoomUserData) {
            write_string_map(writer, &room.user_data);
        }
        if self.has(FieldId::RoomCustomLines) {
            self.encode_custom_lines(room, writer);
        }
        if self.has(FieldId::RoomExitLocks) {
            write_ints(writer, &room.exit_locks);
        }
        if self.has(FieldId::RoomSpecialExitLocks) {
            writer.write_count(room.special_exit_locks.len());
            for command in &room.special_exit_locks {
                writer.write_string(command);
            }
        }
        if self.has(FieldId::RoomStubs) {
            write_ints(writer, &room.stubs);
        }
        if self.has(FieldId::RoomExitWeights) {
            write_map(writer, &room.exit_weights, |w, k| w.write_string(k), |w, v| w.write_i32(*v));
        }
        if self.has(FieldId::RoomDoors) {
            write_map(writer, &room.doors, |w, k| w.write_string(k), |w, v| w.write_i32(v.raw()));
        }
    }

    fn encode_custom_lines(&self, room: &Room, writer: &mut BinaryWriter) {
        write_map(writer, &room.custom_lines, |w, k| w.write_string(k), |w, points| {
            w.write_count(points.len());
            for p in points {
                p.write(w);
            }
        });
        write_map(writer, &room.custom_line_arrows, |w, k| w.write_string(k), |w, v| w.write_bool(*v));

        match self.encoding(FieldId::RoomCustomLineColor) {
            Encoding::ColorRecord => {
                write_map(writer, &room.custom_line_colors, |w, k| w.write_string(k), |w, c| c.write(w));
            }
            _ => write_map(writer, &room.custom_line_colors, |w, k| w.write_string(k), write_channels),
        }

        match self.encoding(FieldId::RoomCustomLineStyle) {
            Encoding::StyleEnum => write_map(
                writer,
                &room.custom_line_styles,
                |w, k| w.write_string(k),
                |w, s| w.write_i32(s.pen_style()),
            ),
            _ => write_map(writer, &room.custom_line_styles, |w, k| w.write_string(k), |w, s| {
                w.write_string(s.name())
            }),
        }
    }
}

fn write_channels(writer: &mut BinaryWriter, color: &Color) {
    let [r, g, b, _] = color.to_rgba8();
    write_ints(writer, &[r as i32, g as i32, b as i32]);
}

fn write_ints(writer: &mut BinaryWriter, values: &[i32]) {
    writer.write_count(values.len());
    for v in values {
        writer.write_i32(*v);
    }
}

fn write_string_map(writer: &mut BinaryWriter, map: &IndexMap<String, String>) {
    write_map(writer, map, |w, k| w.write_string(k), |w, v| w.write_string(v));
}

fn write_map<K, V>(
    writer: &mut BinaryWriter,
    map: &IndexMap<K, V>,
    mut key: impl FnMut(&mut BinaryWriter, &K),
    mut value: impl FnMut(&mut BinaryWriter, &V),
) {
    writer.write_count(map.len());
    for (k, v) in map {
        key(writer, k);
        value(writer, v);
    }
}

/// Bounds for an area computed from its rooms, for fixtures.
pub fn bounds_of<'r>(rooms: impl IntoIterator<Item = &'r Room>) -> Bounds3D {
    let mut rooms = rooms.into_iter();
    let Some(first) = rooms.next() else {
        return Bounds3D::default();
    };
    let mut bounds = Bounds3D::point(first.x, first.y, first.z);
    for room in rooms {
        bounds.extend(room.x, room.y, room.z);
    }
    bounds
}
