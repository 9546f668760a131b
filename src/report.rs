//! Read-only consumers of a decoded map: validation, statistics, JSON export
//! and neighborhood selection.

use std::collections::BTreeSet;
use std::io::Write;

use ahash::AHashSet;
use serde::Serialize;

use crate::codec::legacy::LEGACY_VERSIONS;
use crate::codec::types::Bounds3D;
use crate::error::{Error, Result};
use crate::state::{Direction, Document, MIN_WEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    InvalidVersion,
    BrokenExit,
    UnknownArea,
    MissingAreaRoom,
    InvalidWeight,
}

/// Advisory finding; never stops decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i32>,
}

impl ValidationIssue {
    fn new(kind: IssueKind, room_id: Option<i32>, message: String) -> Self {
        Self { kind, message, room_id }
    }
}

/// Check references between rooms and areas. Nothing is repaired.
pub fn validate(doc: &Document) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match doc.legacy_version {
        Some(v) if !LEGACY_VERSIONS.contains(&v) => issues.push(ValidationIssue::new(
            IssueKind::InvalidVersion,
            None,
            format!("legacy version {v} outside {LEGACY_VERSIONS:?}"),
        )),
        None if doc.version <= 0 => issues.push(ValidationIssue::new(
            IssueKind::InvalidVersion,
            None,
            format!("non-positive version {}", doc.version),
        )),
        _ => {}
    }

    let known_areas: AHashSet<i32> = doc.areas.keys().chain(doc.area_names.keys()).copied().collect();

    for room in doc.rooms.values() {
        for dir in Direction::ALL {
            if let Some(target) = room.exit(dir) {
                if !doc.rooms.contains_key(&target) {
                    issues.push(ValidationIssue::new(
                        IssueKind::BrokenExit,
                        Some(room.id),
                        format!("room {} exit {} leads to missing room {target}", room.id, dir.name()),
                    ));
                }
            }
        }
        for (command, target) in &room.special_exits {
            if !doc.rooms.contains_key(target) {
                issues.push(ValidationIssue::new(
                    IssueKind::BrokenExit,
                    Some(room.id),
                    format!("room {} special exit {command:?} leads to missing room {target}", room.id),
                ));
            }
        }
        if !known_areas.contains(&room.area) {
            issues.push(ValidationIssue::new(
                IssueKind::UnknownArea,
                Some(room.id),
                format!("room {} belongs to unknown area {}", room.id, room.area),
            ));
        }
        if room.weight < MIN_WEIGHT {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidWeight,
                Some(room.id),
                format!("room {} has weight {}", room.id, room.weight),
            ));
        }
    }

    for area in doc.areas.values() {
        for id in area.rooms.iter().filter(|id| !doc.rooms.contains_key(id)) {
            issues.push(ValidationIssue::new(
                IssueKind::MissingAreaRoom,
                Some(*id),
                format!("area {} lists missing room {id}", area.id),
            ));
        }
    }
    issues
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStats {
    pub version: i32,
    pub rooms: usize,
    pub areas: usize,
    /// Distinct environment ids across both color tables
    pub environments: usize,
    pub labels: usize,
    pub labelled_areas: usize,
    /// `None` for a map without rooms
    pub bounding_box: Option<Bounds3D>,
    pub z_levels: Vec<i32>,
}

pub fn stats(doc: &Document) -> MapStats {
    let mut rooms = doc.rooms.values();
    let bounding_box = rooms.next().map(|first| {
        let mut bounds = Bounds3D::point(first.x, first.y, first.z);
        for room in rooms {
            bounds.extend(room.x, room.y, room.z);
        }
        bounds
    });

    let environments: BTreeSet<i32> = doc.env_colors.keys().chain(doc.custom_env_colors.keys()).copied().collect();
    let z_levels: BTreeSet<i32> = doc.rooms.values().map(|r| r.z).collect();

    MapStats {
        version: doc.version,
        rooms: doc.rooms.len(),
        areas: doc.areas.len(),
        environments: environments.len(),
        labels: doc.label_count(),
        labelled_areas: doc.labelled_area_count(),
        bounding_box,
        z_levels: z_levels.into_iter().collect(),
    }
}

/// Pretty-printed JSON of the whole document.
pub fn export_json(doc: &Document, writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(writer, doc).map_err(|e| Error::Io(format!("json export: {e}")))
}

pub fn to_json_string(doc: &Document) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(|e| Error::Io(format!("json export: {e}")))
}

/// Rooms and labels visible around a center room on its own level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub center: i32,
    pub area_id: i32,
    pub area_name: String,
    pub z: i32,
    pub bounds: Bounds3D,
    pub rooms: Vec<i32>,
    pub labels: Vec<i32>,
}

/// Select the neighborhood a renderer would draw; `None` for an unknown room.
pub fn fragment(doc: &Document, center: i32, radius: i32) -> Option<Fragment> {
    let room = doc.room(center)?;
    let bounds = Bounds3D::around(room.x, room.y, room.z, radius);
    let rooms = doc.rooms_in_box(room.area, &bounds).iter().map(|r| r.id).collect();
    let labels = doc
        .labels_on_level(room.area, room.z)
        .filter(|l| {
            let (x, y) = (l.pos.x.round() as i32, l.pos.y.round() as i32);
            bounds.contains(x, y, room.z)
        })
        .map(|l| l.id)
        .collect();
    Some(Fragment {
        center,
        area_id: room.area,
        area_name: doc.area_name(room.area).unwrap_or_default().to_string(),
        z: room.z,
        bounds,
        rooms,
        labels,
    })
}
