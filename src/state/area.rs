use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Label;
use crate::codec::types::{Bounds3D, Vector3D};

/// Area every map has; rooms with no explicit area live here
pub const DEFAULT_AREA_ID: i32 = -1;

/// Exit leaving an area: room, destination, direction code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaExit {
    pub from_room: i32,
    pub to_room: i32,
    pub direction: i32,
}

/// Named grouping of rooms with per-level extents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Area {
    pub id: i32,
    pub name: String,
    pub rooms: BTreeSet<i32>,
    pub z_levels: Vec<i32>,
    pub exits: Vec<AreaExit>,
    pub grid_mode: bool,
    pub bounds: Bounds3D,
    pub span: Vector3D,
    pub x_max_for_z: IndexMap<i32, i32>,
    pub y_max_for_z: IndexMap<i32, i32>,
    pub x_min_for_z: IndexMap<i32, i32>,
    pub y_min_for_z: IndexMap<i32, i32>,
    pub pos: Vector3D,
    pub is_zone: bool,
    pub zone_area_ref: i32,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub user_data: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_2d_map_zoom: Option<f64>,
    /// Labels stored with the area record (newer streams)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Area {
    pub fn new(id: i32) -> Self {
        Self { id, ..Self::default() }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_AREA_ID
    }

    /// Levels in ascending order without duplicates
    pub fn sorted_z_levels(&self) -> Vec<i32> {
        let levels: BTreeSet<i32> = self.z_levels.iter().copied().collect();
        levels.into_iter().collect()
    }
}
