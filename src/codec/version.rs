//! Format-version decision table.
//!
//! Every field whose presence or shape depends on the stream version is
//! listed in [`GATES`]. Decoders ask [`field_encoding`] instead of comparing
//! version numbers themselves.

use serde::Serialize;

/// Oldest stream version the decoders understand.
///
/// Parses reject anything older, so table rows for versions below this
/// (such as special exits being absent before 6) only describe the format.
pub const MIN_SUPPORTED_VERSION: i32 = 6;

/// Newest stream version the decoders understand.
pub const MAX_SUPPORTED_VERSION: i32 = 21;

/// Version from which labels live inside area records.
pub const LABELS_IN_AREAS_VERSION: i32 = 21;

pub fn is_supported(version: i32) -> bool {
    (MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&version)
}

/// Version-sensitive fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldId {
    MapUserData,
    MapSymbolFont,
    AreaUserData,
    AreaLastZoom,
    AreaLabels,
    MapLabels,
    LabelPosition,
    LabelFlags,
    RoomSpecialExits,
    RoomSymbol,
    RoomSymbolColor,
    RoomUserData,
    RoomCustomLines,
    RoomCustomLineColor,
    RoomCustomLineStyle,
    RoomExitLocks,
    RoomSpecialExitLocks,
    RoomStubs,
    RoomExitWeights,
    RoomDoors,
}

/// Wire shape of a field at a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Encoding {
    /// Not present in the stream.
    Absent,
    /// Present with its only known shape.
    Present,
    /// Symbol stored as one character byte.
    SymbolByte,
    /// Symbol stored as a string.
    SymbolString,
    /// Special exits keyed by destination room, command prefixed with a lock digit.
    ExitsByDestination,
    /// Special exits keyed by command.
    ExitsByCommand,
    /// Custom line color as a list of r,g,b ints.
    ColorTriple,
    /// Custom line color as a QColor.
    ColorRecord,
    /// Custom line style as a pen-style name.
    StyleName,
    /// Custom line style as a pen-style enum value.
    StyleEnum,
    /// Label position as a 2D point.
    Planar,
    /// Label position as a 3D vector.
    Spatial,
}

/// One row of the table: from `since` onwards the field uses `encoding`.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub field: FieldId,
    pub since: i32,
    pub encoding: Encoding,
}

const fn gate(field: FieldId, since: i32, encoding: Encoding) -> Gate {
    Gate { field, since, encoding }
}

/// Thresholds per field, ascending by version. Below the first row a field is absent.
pub const GATES: &[Gate] = &[
    gate(FieldId::MapUserData, 17, Encoding::Present),
    gate(FieldId::MapSymbolFont, 19, Encoding::Present),
    gate(FieldId::AreaUserData, 17, Encoding::Present),
    gate(FieldId::AreaLastZoom, 21, Encoding::Present),
    gate(FieldId::AreaLabels, 21, Encoding::Present),
    gate(FieldId::MapLabels, MIN_SUPPORTED_VERSION, Encoding::Present),
    gate(FieldId::MapLabels, LABELS_IN_AREAS_VERSION, Encoding::Absent),
    gate(FieldId::LabelPosition, MIN_SUPPORTED_VERSION, Encoding::Planar),
    gate(FieldId::LabelPosition, 12, Encoding::Spatial),
    gate(FieldId::LabelFlags, 15, Encoding::Present),
    gate(FieldId::RoomSpecialExits, 6, Encoding::ExitsByDestination),
    gate(FieldId::RoomSpecialExits, 21, Encoding::ExitsByCommand),
    gate(FieldId::RoomSymbol, 9, Encoding::SymbolByte),
    gate(FieldId::RoomSymbol, 19, Encoding::SymbolString),
    gate(FieldId::RoomSymbolColor, 21, Encoding::Present),
    gate(FieldId::RoomUserData, 10, Encoding::Present),
    gate(FieldId::RoomCustomLines, 11, Encoding::Present),
    gate(FieldId::RoomCustomLineColor, 11, Encoding::ColorTriple),
    gate(FieldId::RoomCustomLineColor, 20, Encoding::ColorRecord),
    gate(FieldId::RoomCustomLineStyle, 11, Encoding::StyleName),
    gate(FieldId::RoomCustomLineStyle, 20, Encoding::StyleEnum),
    gate(FieldId::RoomExitLocks, 11, Encoding::Present),
    gate(FieldId::RoomSpecialExitLocks, 21, Encoding::Present),
    gate(FieldId::RoomStubs, 13, Encoding::Present),
    gate(FieldId::RoomExitWeights, 16, Encoding::Present),
    gate(FieldId::RoomDoors, 16, Encoding::Present),
];

/// Encoding of `field` in a stream of format `version`.
pub fn field_encoding(version: i32, field: FieldId) -> Encoding {
    GATES
        .iter()
        .filter(|g| g.field == field && version >= g.since)
        .last()
        .map(|g| g.encoding)
        .unwrap_or(Encoding::Absent)
}

/// Whether `field` is present at all in a stream of format `version`.
pub fn has_field(version: i32, field: FieldId) -> bool {
    field_encoding(version, field) != Encoding::Absent
}
