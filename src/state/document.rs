use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Area, Label, Room};
use crate::codec::types::{Bounds3D, Color, Font};
use crate::codec::version::LABELS_IN_AREAS_VERSION;

/// Where a room's environment gets its color from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentColor {
    Custom(Color),
    Palette(i32),
}

/// Fully decoded map: global tables plus the area/room/label graph
///
/// Built once per parse and not mutated afterwards. Areas refer to rooms
/// by id only; `rooms` owns every room.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub version: i32,
    /// Version byte of the deprecated tagged format, when the input used it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_version: Option<u8>,

    /// Environment id to palette index
    pub env_colors: IndexMap<i32, i32>,
    pub area_names: IndexMap<i32, String>,
    pub custom_env_colors: IndexMap<i32, Color>,
    pub room_db_hash_to_room_id: IndexMap<String, u32>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub user_data: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_symbol_font: Option<Font>,
    pub font_fudge_factor: f64,
    pub use_only_map_font: bool,

    pub areas: BTreeMap<i32, Area>,
    pub room_id_hash: IndexMap<String, i32>,
    /// Map-level labels, used by streams older than the area-owned layout
    pub labels_by_area: BTreeMap<i32, Vec<Label>>,
    pub rooms: BTreeMap<i32, Room>,
}

impl Document {
    pub fn new(version: i32) -> Self {
        Self { version, font_fudge_factor: 1.0, ..Self::default() }
    }

    pub fn room(&self, id: i32) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn area(&self, id: i32) -> Option<&Area> {
        self.areas.get(&id)
    }

    /// Display name for an area, from its record or the global name table
    pub fn area_name(&self, id: i32) -> Option<&str> {
        self.areas
            .get(&id)
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .or_else(|| self.area_names.get(&id).map(String::as_str))
    }

    /// Rooms whose owning area is `area_id`, in id order
    pub fn rooms_in_area(&self, area_id: i32) -> Vec<&Room> {
        self.rooms.values().filter(|r| r.area == area_id).collect()
    }

    /// Rooms of an area that fall inside `bounds`
    pub fn rooms_in_box(&self, area_id: i32, bounds: &Bounds3D) -> Vec<&Room> {
        self.rooms
            .values()
            .filter(|r| r.area == area_id && bounds.contains(r.x, r.y, r.z))
            .collect()
    }

    /// Labels drawn on an area's map
    pub fn labels_for_area(&self, area_id: i32) -> &[Label] {
        if self.version >= LABELS_IN_AREAS_VERSION {
            self.areas.get(&area_id).map(|a| a.labels.as_slice()).unwrap_or(&[])
        } else {
            self.labels_by_area.get(&area_id).map(Vec::as_slice).unwrap_or(&[])
        }
    }

    /// Labels of an area that sit on level `z`
    pub fn labels_on_level(&self, area_id: i32, z: i32) -> impl Iterator<Item = &Label> {
        self.labels_for_area(area_id).iter().filter(move |l| l.z_level() == z)
    }

    /// Label count across both storage layouts
    pub fn label_count(&self) -> usize {
        let map_level: usize = self.labels_by_area.values().map(Vec::len).sum();
        let area_owned: usize = self.areas.values().map(|a| a.labels.len()).sum();
        map_level + area_owned
    }

    /// Areas with at least one label
    pub fn labelled_area_count(&self) -> usize {
        let mut ids: Vec<i32> = self
            .labels_by_area
            .iter()
            .filter(|(_, labels)| !labels.is_empty())
            .map(|(id, _)| *id)
            .chain(self.areas.values().filter(|a| !a.labels.is_empty()).map(|a| a.id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Effective color for an environment id: the custom override when one
    /// exists, else the palette index.
    pub fn environment_color(&self, env: i32) -> Option<EnvironmentColor> {
        self.custom_env_colors
            .get(&env)
            .map(|c| EnvironmentColor::Custom(*c))
            .or_else(|| self.env_colors.get(&env).map(|i| EnvironmentColor::Palette(*i)))
    }
}
