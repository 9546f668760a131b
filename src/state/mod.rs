pub mod area;
pub mod document;
pub mod label;
pub mod room;

pub use area::{Area, AreaExit, DEFAULT_AREA_ID};
pub use document::{Document, EnvironmentColor};
pub use label::Label;
pub use room::{Direction, DoorState, LineStyle, Room, EXIT_COUNT, MIN_WEIGHT, NO_EXIT};
