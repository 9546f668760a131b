//! Drives the record decoders over a whole stream.
//!
//! Sections are decoded in the fixed order the format defines:
//!
//! ```text
//! Version -> GlobalTables -> Areas -> RoomIdHash -> Labels (old streams) -> Rooms -> Done
//! ```
//!
//! A malformed count in GlobalTables, RoomIdHash or Labels usually means the
//! cursor has lost alignment. Unless resynchronization is disabled, the
//! assembler then scans forward for something that decodes as a room record
//! belonging to a known area and continues from there. Failures in Areas or
//! Rooms end the parse; everything decoded so far is returned with the error.

use ahash::AHashSet;
use tracing::{debug, info, warn};

use super::collections::{int, read_count, read_ordered_map, string};
use super::legacy::{decode_legacy, is_legacy};
use super::records::RecordDecoder;
use super::version::{has_field, is_supported, FieldId};
use super::ByteCursor;
use crate::config::ParseOptions;
use crate::error::{Error, FieldContext, Result};
use crate::state::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Version,
    GlobalTables,
    Areas,
    RoomIdHash,
    Labels,
    Rooms,
    Done,
}

/// Result of a parse: the document plus the error that stopped it, if any.
///
/// When `error` is set the document holds only what was decoded before the
/// failure.
#[derive(Debug)]
pub struct ParseOutcome {
    pub document: Document,
    pub error: Option<Error>,
    /// Offset the assembler jumped to when it resynchronized on the rooms
    pub resynced_at: Option<usize>,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the partial document if the parse failed.
    pub fn into_result(self) -> Result<Document> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.document),
        }
    }
}

/// Decode a complete in-memory stream.
pub fn parse_document(data: &[u8], options: &ParseOptions) -> ParseOutcome {
    DocumentAssembler::new(data, *options).run()
}

pub struct DocumentAssembler<'a> {
    data: &'a [u8],
    reader: ByteCursor<'a>,
    options: ParseOptions,
    stage: Stage,
    decoder: RecordDecoder,
    document: Document,
    resynced_at: Option<usize>,
    /// Offset from which a room-section scan already came up empty
    no_rooms_from: Option<usize>,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(data: &'a [u8], options: ParseOptions) -> Self {
        Self {
            data,
            reader: ByteCursor::new(data),
            options,
            stage: Stage::Version,
            decoder: RecordDecoder::new(0),
            document: Document::default(),
            resynced_at: None,
            no_rooms_from: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(mut self) -> ParseOutcome {
        let error = loop {
            if self.stage == Stage::Done {
                break None;
            }
            if self.options.verbose {
                debug!(offset = self.reader.position(), stage = ?self.stage, "section start");
            }
            match self.step() {
                Ok(next) => self.stage = next,
                Err(err) => match self.recover(err) {
                    Ok(()) => self.stage = Stage::Rooms,
                    Err(err) => break Some(err),
                },
            }
        };

        info!(
            version = self.document.version,
            areas = self.document.areas.len(),
            rooms = self.document.rooms.len(),
            labels = self.document.label_count(),
            complete = error.is_none(),
            "map decoded"
        );
        ParseOutcome {
            document: self.document,
            error,
            resynced_at: self.resynced_at,
        }
    }

    fn step(&mut self) -> Result<Stage> {
        match self.stage {
            Stage::Version => self.read_version(),
            Stage::GlobalTables => {
                self.decoder.decode_global_tables(&mut self.reader, &mut self.document)?;
                Ok(Stage::Areas)
            }
            Stage::Areas => {
                self.read_areas()?;
                Ok(Stage::RoomIdHash)
            }
            Stage::RoomIdHash => {
                self.document.room_id_hash =
                    read_ordered_map(&mut self.reader, string, int).field("room_id_hash")?;
                if has_field(self.document.version, FieldId::MapLabels) {
                    Ok(Stage::Labels)
                } else {
                    Ok(Stage::Rooms)
                }
            }
            Stage::Labels => self.read_labels(),
            Stage::Rooms => {
                self.read_rooms()?;
                Ok(Stage::Done)
            }
            Stage::Done => Ok(Stage::Done),
        }
    }

    fn read_version(&mut self) -> Result<Stage> {
        if is_legacy(self.data) {
            decode_legacy(&mut self.reader, &mut self.document)?;
            return Ok(Stage::Done);
        }

        let offset = self.reader.position();
        let version = self.reader.read_i32().field("version")?;
        if !is_supported(version) {
            return Err(Error::UnsupportedVersion { offset, version });
        }
        self.document = Document::new(version);
        self.decoder = RecordDecoder::new(version).with_trace(self.options.verbose);
        Ok(Stage::GlobalTables)
    }

    fn read_areas(&mut self) -> Result<()> {
        let count = read_count(&mut self.reader).field("areas")?;
        for i in 0..count {
            let id = self.reader.read_i32().field(&format!("areas.[{i}].id"))?;
            let mut area = self
                .decoder
                .decode_area(&mut self.reader, id)
                .field(&format!("area[{id}]"))?;
            if let Some(name) = self.document.area_names.get(&id) {
                area.name = name.clone();
            }
            self.document.areas.insert(id, area);
        }
        Ok(())
    }

    fn read_labels(&mut self) -> Result<Stage> {
        let groups = read_count(&mut self.reader).field("labels")?;
        if self.options.skip_labels && self.options.resync && groups > 0 {
            let start = self.reader.position();
            let pos = self.find_room_section(start).ok_or_else(|| {
                Error::malformed(start, "no room section found after skipped labels").in_field("labels")
            })?;
            info!(groups, skipped = pos - start, "label section skipped");
            self.jump_to(pos);
            return Ok(Stage::Rooms);
        }

        for i in 0..groups {
            let (area_id, labels) = self
                .decoder
                .decode_label_group(&mut self.reader)
                .field(&format!("labels.[{i}]"))?;
            self.document.labels_by_area.entry(area_id).or_default().extend(labels);
        }
        Ok(Stage::Rooms)
    }

    fn read_rooms(&mut self) -> Result<()> {
        while self.reader.has(4) {
            let offset = self.reader.position();
            let id = self.reader.read_i32().field("rooms")?;
            if id <= 0 {
                return Err(Error::malformed(offset, format!("room id {id} is not positive")).in_field("rooms"));
            }
            let room = self
                .decoder
                .decode_room(&mut self.reader, id)
                .field(&format!("room[{id}]"))?;
            self.document.rooms.insert(id, room);
        }
        Ok(())
    }

    /// Try to continue at the rooms after a section lost alignment.
    fn recover(&mut self, err: Error) -> Result<()> {
        let recoverable = self.options.resync
            && err.is_malformed()
            && matches!(self.stage, Stage::GlobalTables | Stage::RoomIdHash | Stage::Labels);
        if !recoverable {
            return Err(err);
        }

        let start = self.reader.position();
        let Some(pos) = self.find_room_section(start) else {
            return Err(err);
        };
        warn!(
            stage = ?self.stage,
            error = %err,
            from = start,
            to = pos,
            "section misaligned, resynchronized on room records"
        );
        self.jump_to(pos);
        Ok(())
    }

    fn jump_to(&mut self, pos: usize) {
        self.reader = ByteCursor::at(self.data, pos);
        self.resynced_at = Some(pos);
    }

    /// First offset at or after `start` that looks like the rooms section.
    ///
    /// A candidate needs a positive room id followed by a known area id, must
    /// decode as a full room record, and must be followed by the end of the
    /// stream or another such id pair. A failed scan is remembered so later
    /// attempts from the same point or beyond return at once.
    fn find_room_section(&mut self, start: usize) -> Option<usize> {
        if self.no_rooms_from.is_some_and(|from| start >= from) {
            return None;
        }
        let found = self.scan_room_section(start);
        if found.is_none() {
            self.no_rooms_from = Some(start);
        }
        found
    }

    fn scan_room_section(&self, start: usize) -> Option<usize> {
        let known: AHashSet<i32> = self
            .document
            .areas
            .keys()
            .chain(self.document.area_names.keys())
            .copied()
            .collect();
        if known.is_empty() {
            return None;
        }

        let trial = RecordDecoder::new(self.decoder.version());
        let header_at = |pos: usize| -> Option<i32> {
            let mut cursor = ByteCursor::at(self.data, pos);
            let id = cursor.read_i32().ok()?;
            let area = cursor.read_i32().ok()?;
            (id > 0 && known.contains(&area)).then_some(id)
        };

        (start..self.data.len().saturating_sub(7)).find(|&pos| {
            let Some(id) = header_at(pos) else {
                return false;
            };
            let mut cursor = ByteCursor::at(self.data, pos + 4);
            if trial.decode_room(&mut cursor, id).is_err() {
                return false;
            }
            !cursor.has(4) || header_at(cursor.position()).is_some()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::codec::encode::{bounds_of, RecordEncoder};
    use crate::codec::legacy::LEGACY_TAG;
    use crate::codec::types::Vector3D;
    use crate::codec::BinaryWriter;
    use crate::state::{Area, Direction, Label, Room, DEFAULT_AREA_ID, NO_EXIT};

    fn two_room_document(version: i32) -> Document {
        let mut doc = Document::new(version);
        doc.area_names.insert(DEFAULT_AREA_ID, "Default Area".into());
        doc.env_colors.insert(1, 4);

        let mut first = Room::new(1);
        first.area = DEFAULT_AREA_ID;
        first.name = "Crossing".into();
        first.special_exits.insert("east-passage".into(), 2);

        let mut second = Room::new(2);
        second.area = DEFAULT_AREA_ID;
        second.y = -1;

        let mut area = Area::new(DEFAULT_AREA_ID);
        area.rooms.extend([1, 2]);
        area.z_levels.push(0);
        area.bounds = bounds_of([&first, &second]);
        doc.areas.insert(DEFAULT_AREA_ID, area);
        doc.rooms.insert(1, first);
        doc.rooms.insert(2, second);
        doc
    }

    fn harbour_label() -> Label {
        let mut label = Label::new(1, "Harbour");
        label.pos = Vector3D::new(1.5, 2.5, 0.0);
        label.width = 4.0;
        label.height = 1.0;
        label
    }

    fn with_label_group(version: i32) -> Document {
        let mut doc = two_room_document(version);
        doc.labels_by_area.insert(DEFAULT_AREA_ID, vec![harbour_label()]);
        doc
    }

    /// Encoded length of everything before the rooms, with no labels.
    fn prefix_len(doc: &Document) -> usize {
        let mut prefix = doc.clone();
        prefix.rooms.clear();
        prefix.labels_by_area.clear();
        RecordEncoder::new(doc.version).encode_document(&prefix).len()
    }

    /// Offset of the map-level label group count.
    fn label_section_offset(doc: &Document) -> usize {
        prefix_len(doc) - 4
    }

    #[test]
    fn test_two_room_scenario() {
        for version in [16, 20, 21] {
            let data = RecordEncoder::new(version).encode_document(&two_room_document(version));
            let outcome = parse_document(&data, &ParseOptions::default());
            assert!(outcome.is_complete(), "v{version}: {:?}", outcome.error);

            let doc = outcome.document;
            assert_eq!(doc.version, version);
            assert_eq!(doc.areas[&DEFAULT_AREA_ID].name, "Default Area");
            assert_eq!(doc.rooms.len(), 2);
            assert_eq!(doc.rooms[&1].special_exits.get("east-passage"), Some(&2));
            assert_eq!(doc.rooms[&2].position(), (0, -1, 0));
            for room in doc.rooms.values() {
                assert!(room.exits.iter().all(|e| *e == NO_EXIT));
                assert!(room.active_exits().is_empty());
            }
            assert_eq!(doc.rooms_in_area(DEFAULT_AREA_ID).len(), 2);
        }
    }

    #[test]
    fn test_empty_map_is_complete() {
        let data = RecordEncoder::new(21).encode_document(&Document::new(21));
        let outcome = parse_document(&data, &ParseOptions::default());
        assert!(outcome.is_complete());
        assert!(outcome.document.rooms.is_empty());
        assert!(outcome.document.areas.is_empty());
    }

    #[test]
    fn test_unsupported_version_builds_nothing() {
        for version in [0i32, -3, 5, 22, 1_000] {
            let data = version.to_be_bytes();
            let outcome = parse_document(&data, &ParseOptions::default());
            match outcome.error {
                Some(Error::UnsupportedVersion { offset: 0, version: v }) => assert_eq!(v, version),
                other => panic!("unexpected {other:?}"),
            }
            assert!(outcome.document.rooms.is_empty());
            assert!(outcome.document.areas.is_empty());
        }
    }

    #[test]
    fn test_empty_input_is_truncated() {
        let outcome = parse_document(&[], &ParseOptions::default());
        assert!(matches!(outcome.error, Some(Error::TruncatedStream { offset: 0, .. })));
    }

    #[test]
    fn test_truncated_rooms_keep_decoded_prefix() {
        let mut doc = two_room_document(21);
        let mut third = Room::new(3);
        third.area = DEFAULT_AREA_ID;
        third.name = "Cellar".into();
        doc.rooms.insert(3, third);

        let mut data = RecordEncoder::new(21).encode_document(&doc);
        let full_len = data.len();
        data.truncate(full_len - 10);

        let outcome = parse_document(&data, &ParseOptions::default());
        let err = outcome.error.expect("truncation must be reported");
        assert!(matches!(err, Error::TruncatedStream { .. }));
        assert!(err.field().is_some_and(|f| f.starts_with("room[3]")));
        assert!(err.offset().is_some_and(|o| o <= full_len - 10));
        assert_eq!(outcome.document.rooms.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(outcome.document.areas.len(), 1);
    }

    #[test]
    fn test_trailing_bytes_shorter_than_id_end_rooms() {
        let mut data = RecordEncoder::new(21).encode_document(&two_room_document(21));
        data.extend_from_slice(&[0, 0, 1]);
        let outcome = parse_document(&data, &ParseOptions::default());
        assert!(outcome.is_complete());
        assert_eq!(outcome.document.rooms.len(), 2);
    }

    #[test]
    fn test_non_positive_room_id_is_malformed() {
        let mut data = RecordEncoder::new(21).encode_document(&two_room_document(21));
        let mut extra = BinaryWriter::new();
        extra.write_i32(0);
        extra.write_i32(DEFAULT_AREA_ID);
        data.extend_from_slice(extra.as_slice());

        let outcome = parse_document(&data, &ParseOptions::default());
        let err = outcome.error.expect("room id 0 rejected");
        assert!(err.is_malformed());
        assert_eq!(err.field(), Some("rooms"));
        assert_eq!(outcome.document.rooms.len(), 2);
    }

    #[test]
    fn test_labels_decoded_into_map_level_groups() {
        let doc = with_label_group(20);
        let data = RecordEncoder::new(20).encode_document(&doc);
        let outcome = parse_document(&data, &ParseOptions::default());
        assert!(outcome.is_complete(), "{:?}", outcome.error);
        let doc = outcome.document;
        assert_eq!(doc.labels_for_area(DEFAULT_AREA_ID), &[harbour_label()]);
        assert_eq!(doc.label_count(), 1);
        assert!(outcome.resynced_at.is_none());
    }

    #[test]
    fn test_area_owned_labels_at_21() {
        let mut doc = two_room_document(21);
        if let Some(area) = doc.areas.get_mut(&DEFAULT_AREA_ID) {
            area.labels.push(harbour_label());
        }
        let data = RecordEncoder::new(21).encode_document(&doc);
        let outcome = parse_document(&data, &ParseOptions::default());
        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert!(outcome.document.labels_by_area.is_empty());
        assert_eq!(outcome.document.labels_for_area(DEFAULT_AREA_ID)[0].text, "Harbour");
    }

    fn corrupt_label_count(doc: &Document) -> Vec<u8> {
        let mut data = RecordEncoder::new(doc.version).encode_document(doc);
        let at = label_section_offset(doc);
        data[at..at + 4].copy_from_slice(&(-5i32).to_be_bytes());
        data
    }

    #[test]
    fn test_resync_after_misaligned_labels() {
        let doc = with_label_group(20);
        let data = corrupt_label_count(&doc);
        let outcome = parse_document(&data, &ParseOptions::default());

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert!(outcome.resynced_at.is_some());
        let decoded = outcome.document;
        assert!(decoded.labels_by_area.is_empty());
        assert_eq!(decoded.rooms.len(), 2);
        assert_eq!(decoded.rooms[&1].special_exits.get("east-passage"), Some(&2));
    }

    #[test]
    fn test_strict_mode_reports_misaligned_labels() {
        let doc = with_label_group(20);
        let data = corrupt_label_count(&doc);
        let outcome = parse_document(&data, &ParseOptions::default().strict());

        let err = outcome.error.expect("strict parse fails");
        assert!(err.is_malformed());
        assert_eq!(err.field(), Some("labels"));
        assert_eq!(err.offset(), Some(label_section_offset(&doc)));
        assert!(outcome.document.rooms.is_empty());
        assert_eq!(outcome.document.areas.len(), 1);
    }

    #[test]
    fn test_resync_without_known_areas_gives_up() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(20);
        writer.write_i32(-1);
        writer.write_bytes(&[0; 32]);
        let data = writer.into_vec();
        let outcome = parse_document(&data, &ParseOptions::default());
        let err = outcome.error.expect("nothing to resync on");
        assert_eq!(err.field(), Some("env_colors"));
        assert!(outcome.resynced_at.is_none());
    }

    /// Offset of the custom environment color count: after the version,
    /// the environment color table and the area name table.
    fn custom_env_colors_offset(doc: &Document) -> usize {
        let mut w = BinaryWriter::new();
        w.write_i32(doc.version);
        w.write_count(doc.env_colors.len());
        for (env, index) in &doc.env_colors {
            w.write_i32(*env);
            w.write_i32(*index);
        }
        w.write_count(doc.area_names.len());
        for (id, name) in &doc.area_names {
            w.write_i32(*id);
            w.write_string(name);
        }
        w.len()
    }

    fn assert_resynced_on_both_rooms(outcome: &ParseOutcome) {
        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert!(outcome.resynced_at.is_some());
        let rooms = &outcome.document.rooms;
        assert_eq!(rooms.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(rooms[&1].special_exits.get("east-passage"), Some(&2));
        assert_eq!(rooms[&2].position(), (0, -1, 0));
    }

    #[test]
    fn test_resync_after_misaligned_global_tables() {
        let doc = two_room_document(21);
        let mut data = RecordEncoder::new(21).encode_document(&doc);
        let at = custom_env_colors_offset(&doc);
        data[at..at + 4].copy_from_slice(&(-7i32).to_be_bytes());

        let outcome = parse_document(&data, &ParseOptions::default());
        assert_resynced_on_both_rooms(&outcome);
        // names were read before the corrupt count
        assert_eq!(outcome.document.area_name(DEFAULT_AREA_ID), Some("Default Area"));
        assert!(outcome.document.custom_env_colors.is_empty());

        let strict = parse_document(&data, &ParseOptions::default().strict());
        let err = strict.error.expect("strict parse fails");
        assert!(err.is_malformed());
        assert_eq!(err.offset(), Some(at));
    }

    #[test]
    fn test_resync_after_misaligned_room_id_hash() {
        let doc = two_room_document(21);
        let mut data = RecordEncoder::new(21).encode_document(&doc);
        // at v21 the hash count is the last field before the rooms
        let at = prefix_len(&doc) - 4;
        data[at..at + 4].copy_from_slice(&i32::MAX.to_be_bytes());

        let outcome = parse_document(&data, &ParseOptions::default());
        assert_resynced_on_both_rooms(&outcome);
        assert_eq!(outcome.resynced_at, Some(prefix_len(&doc)));
        assert_eq!(outcome.document.areas.len(), 1);
    }

    #[test]
    fn test_failed_label_skip_is_not_rescanned() {
        let mut doc = with_label_group(20);
        doc.rooms.clear();
        let data = RecordEncoder::new(20).encode_document(&doc);
        let options = ParseOptions::default().with_skip_labels(true);

        let mut assembler = DocumentAssembler::new(&data, options);
        while assembler.stage() != Stage::Labels {
            assembler.stage = assembler.step().unwrap();
        }
        let err = assembler.step().unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.field(), Some("labels"));
        let scanned_from = assembler.no_rooms_from.expect("failed scan recorded");
        assert_eq!(scanned_from, label_section_offset(&doc) + 4);

        let err = assembler.recover(err).unwrap_err();
        assert_eq!(err.field(), Some("labels"));
        assert_eq!(assembler.no_rooms_from, Some(scanned_from));
        assert!(assembler.resynced_at.is_none());

        let outcome = parse_document(&data, &options);
        assert!(outcome.error.is_some_and(|e| e.is_malformed()));
        assert!(outcome.document.rooms.is_empty());
    }

    #[test]
    fn test_skip_labels_jumps_to_rooms() {
        let doc = with_label_group(20);
        let data = RecordEncoder::new(20).encode_document(&doc);
        let options = ParseOptions::default().with_skip_labels(true);
        let outcome = parse_document(&data, &options);

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert!(outcome.document.labels_by_area.is_empty());
        assert_eq!(outcome.document.rooms.len(), 2);
        let rooms_start = data.len()
            - outcome
                .document
                .rooms
                .values()
                .map(|room| {
                    let mut w = BinaryWriter::new();
                    RecordEncoder::new(20).encode_room(room, &mut w);
                    w.len() + 4
                })
                .sum::<usize>();
        assert_eq!(outcome.resynced_at, Some(rooms_start));
    }

    #[test]
    fn test_skip_labels_ignored_in_strict_mode() {
        let doc = with_label_group(20);
        let data = RecordEncoder::new(20).encode_document(&doc);
        let options = ParseOptions::default().with_skip_labels(true).strict();
        let outcome = parse_document(&data, &options);
        assert!(outcome.is_complete());
        assert_eq!(outcome.document.label_count(), 1);
    }

    #[test]
    fn test_truncated_area_section_keeps_tables() {
        let doc = two_room_document(21);
        let data = RecordEncoder::new(21).encode_document(&doc);
        // 4-byte room id hash count, then cut into the area record's tail
        let cut = prefix_len(&doc) - 4 - 20;
        let outcome = parse_document(&data[..cut], &ParseOptions::default());
        let err = outcome.error.expect("areas cut short");
        assert!(err.field().is_some_and(|f| f.starts_with("area[-1]")));
        assert_eq!(outcome.document.area_names.get(&DEFAULT_AREA_ID).map(String::as_str), Some("Default Area"));
        assert!(outcome.document.areas.is_empty());
    }

    #[test]
    fn test_legacy_stream_is_routed() {
        let mut writer = BinaryWriter::new();
        writer.write_bytes(&LEGACY_TAG);
        writer.write_u8(2);
        writer.write_i32(0);
        writer.write_i32(0);
        let data = writer.into_vec();
        let outcome = parse_document(&data, &ParseOptions::default());
        assert!(outcome.is_complete());
        assert_eq!(outcome.document.legacy_version, Some(2));
    }

    /// 64 areas, 26,758 rooms, 397 labels spread over 51 areas.
    fn scale_document() -> Document {
        const AREAS: i32 = 64;
        const ROOMS: i32 = 26_758;
        const LABELLED_AREAS: i32 = 51;
        const LABELS: i32 = 397;

        let mut doc = Document::new(20);
        for id in 1..=AREAS {
            doc.area_names.insert(id, format!("Area {id}"));
            doc.areas.insert(id, Area::new(id));
        }
        for id in 1..=ROOMS {
            let area_id = (id - 1) % AREAS + 1;
            let mut room = Room::new(id);
            room.area = area_id;
            room.x = (id - 1) / AREAS % 200;
            room.y = (id - 1) / AREAS / 200;
            room.name = format!("Room {id}");
            room.environment = id % 16;
            if id + AREAS <= ROOMS {
                room.exits[Direction::East.index()] = id + AREAS;
            }
            if id > AREAS {
                room.exits[Direction::West.index()] = id - AREAS;
            }
            room.user_data.insert("tag".into(), "generated".into());
            if let Some(area) = doc.areas.get_mut(&area_id) {
                area.rooms.insert(id);
            }
            doc.rooms.insert(id, room);
        }
        for n in 0..LABELS {
            let area_id = n % LABELLED_AREAS + 1;
            let mut label = Label::new(n, format!("Label {n}"));
            label.pos = Vector3D::new(n as f64, 1.0, 0.0);
            doc.labels_by_area.entry(area_id).or_default().push(label);
        }
        doc
    }

    #[test]
    fn test_large_fixture_counts_and_budget() {
        let doc = scale_document();
        let data = RecordEncoder::new(doc.version).encode_document(&doc);

        let started = Instant::now();
        let outcome = parse_document(&data, &ParseOptions::default());
        let elapsed = started.elapsed();

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        let decoded = outcome.document;
        assert_eq!(decoded.areas.len(), 64);
        assert_eq!(decoded.rooms.len(), 26_758);
        let labels: usize = decoded.labels_by_area.values().map(Vec::len).sum();
        assert_eq!(labels, 397);
        assert_eq!(decoded.labels_by_area.len(), 51);
        assert_eq!(decoded.rooms[&1].exit(Direction::East), Some(65));
        assert!(elapsed < Duration::from_secs(20), "decode took {elapsed:?}");
    }
}
