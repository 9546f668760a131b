use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec::types::{Color, Point2D};

/// Exit slot value meaning "no exit in this direction"
pub const NO_EXIT: i32 = -1;

/// Number of fixed exit directions per room
pub const EXIT_COUNT: usize = 12;

/// Lowest legal pathfinding weight
pub const MIN_WEIGHT: i32 = 1;

/// Fixed exit direction, in exit-slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
    Up = 8,
    Down = 9,
    In = 10,
    Out = 11,
}

impl Direction {
    pub const ALL: [Direction; EXIT_COUNT] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
        Self::Up,
        Self::Down,
        Self::In,
        Self::Out,
    ];

    const NAMES: [&'static str; EXIT_COUNT] = [
        "north", "northeast", "east", "southeast", "south", "southwest",
        "west", "northwest", "up", "down", "in", "out",
    ];

    const SHORT_NAMES: [&'static str; EXIT_COUNT] = [
        "n", "ne", "e", "se", "s", "sw", "w", "nw", "up", "down", "in", "out",
    ];

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction codes used by stub and lock lists start at 1 for north
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok()?.checked_sub(1).and_then(Self::from_index)
    }

    pub fn code(self) -> i32 {
        self as i32 + 1
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    pub fn short_name(self) -> &'static str {
        Self::SHORT_NAMES[self.index()]
    }

    /// Match a long or short direction name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == name || d.short_name() == name)
    }

    /// Unit grid step on the map plane; vertical and in/out directions have none
    pub fn to_vector(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
            Self::Up | Self::Down | Self::In | Self::Out => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

/// Door drawn on an exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorState {
    #[default]
    None,
    Open,
    Closed,
    Locked,
    Unknown(i32),
}

impl DoorState {
    pub fn from_raw(v: i32) -> Self {
        match v {
            0 => Self::None,
            1 => Self::Open,
            2 => Self::Closed,
            3 => Self::Locked,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Open => 1,
            Self::Closed => 2,
            Self::Locked => 3,
            Self::Unknown(v) => v,
        }
    }
}

/// Pen style of a custom line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    /// Pen-style value with no named counterpart
    Other(i32),
    /// Pen-style name with no enum counterpart
    Named(String),
}

impl LineStyle {
    /// From a Qt pen-style enum value
    pub fn from_pen_style(v: i32) -> Self {
        match v {
            1 => Self::Solid,
            2 => Self::Dash,
            3 => Self::Dot,
            4 => Self::DashDot,
            5 => Self::DashDotDot,
            other => Self::Other(other),
        }
    }

    /// From the pen-style names written by older versions
    pub fn from_name(name: &str) -> Self {
        match name {
            "solid line" => Self::Solid,
            "dash line" => Self::Dash,
            "dot line" => Self::Dot,
            "dash dot line" => Self::DashDot,
            "dash dot dot line" => Self::DashDotDot,
            other => Self::Named(other.to_string()),
        }
    }

    pub fn pen_style(&self) -> i32 {
        match self {
            Self::Solid | Self::Named(_) => 1,
            Self::Dash => 2,
            Self::Dot => 3,
            Self::DashDot => 4,
            Self::DashDotDot => 5,
            Self::Other(v) => *v,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Solid | Self::Other(_) => "solid line",
            Self::Dash => "dash line",
            Self::Dot => "dot line",
            Self::DashDot => "dash dot line",
            Self::DashDotDot => "dash dot dot line",
            Self::Named(name) => name,
        }
    }
}

/// A positioned map node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i32,
    pub area: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,

    /// Exit targets in [`Direction`] order; [`NO_EXIT`] when absent
    pub exits: [i32; EXIT_COUNT],

    pub environment: i32,
    pub weight: i32,
    pub name: String,
    pub is_locked: bool,

    /// Named exits: command to destination room
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub special_exits: IndexMap<String, i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_exit_locks: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_color: Option<Color>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub user_data: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_lines: IndexMap<String, Vec<Point2D>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_line_arrows: IndexMap<String, bool>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_line_colors: IndexMap<String, Color>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_line_styles: IndexMap<String, LineStyle>,

    /// Direction codes of locked exits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exit_locks: Vec<i32>,
    /// Direction codes of stub exits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stubs: Vec<i32>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub exit_weights: IndexMap<String, i32>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub doors: IndexMap<String, DoorState>,
}

impl Room {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            area: 0,
            x: 0,
            y: 0,
            z: 0,
            exits: [NO_EXIT; EXIT_COUNT],
            environment: 0,
            weight: MIN_WEIGHT,
            name: String::new(),
            is_locked: false,
            special_exits: IndexMap::new(),
            special_exit_locks: Vec::new(),
            symbol: String::new(),
            symbol_color: None,
            user_data: IndexMap::new(),
            custom_lines: IndexMap::new(),
            custom_line_arrows: IndexMap::new(),
            custom_line_colors: IndexMap::new(),
            custom_line_styles: IndexMap::new(),
            exit_locks: Vec::new(),
            stubs: Vec::new(),
            exit_weights: IndexMap::new(),
            doors: IndexMap::new(),
        }
    }

    pub fn position(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    /// Target room of a fixed exit, if the slot is set
    pub fn exit(&self, dir: Direction) -> Option<i32> {
        let target = self.exits[dir.index()];
        (target != NO_EXIT).then_some(target)
    }

    pub fn has_exit(&self, dir: Direction) -> bool {
        self.exit(dir).is_some()
    }

    pub fn active_exits(&self) -> Vec<Direction> {
        Direction::ALL.into_iter().filter(|d| self.has_exit(*d)).collect()
    }

    /// Every exit target, fixed and special
    pub fn exit_targets(&self) -> impl Iterator<Item = i32> + '_ {
        self.exits
            .iter()
            .copied()
            .filter(|t| *t != NO_EXIT)
            .chain(self.special_exits.values().copied())
    }

    pub fn has_stub(&self, dir: Direction) -> bool {
        self.stubs.contains(&dir.code())
    }

    pub fn is_exit_locked(&self, dir: Direction) -> bool {
        self.exit_locks.contains(&dir.code())
    }

    pub fn door(&self, dir: Direction) -> DoorState {
        self.doors.get(dir.short_name()).copied().unwrap_or_default()
    }
}
