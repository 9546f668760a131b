use serde::{Deserialize, Serialize};

use crate::codec::types::{Color, Vector3D};

/// Text or image annotation placed on an area's map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: i32,
    pub pos: Vector3D,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub fg_color: Color,
    pub bg_color: Color,
    /// Raw PNG bytes, signature through IEND CRC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixmap: Option<Vec<u8>>,
    pub no_scaling: bool,
    pub show_on_top: bool,
}

impl Label {
    pub fn new(id: i32, text: impl Into<String>) -> Self {
        Self {
            id,
            pos: Vector3D::default(),
            width: 0.0,
            height: 0.0,
            text: text.into(),
            fg_color: Color::default(),
            bg_color: Color::default(),
            pixmap: None,
            no_scaling: false,
            show_on_top: false,
        }
    }

    /// Map level the label is drawn on
    pub fn z_level(&self) -> i32 {
        self.pos.z.round() as i32
    }

    pub fn has_image(&self) -> bool {
        self.pixmap.is_some()
    }
}
