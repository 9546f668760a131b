use serde::{Deserialize, Serialize};

use super::{BinaryWriter, ByteCursor};
use crate::error::{FieldContext, Result};

/// QColor as streamed: spec byte then five 16-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Color specification; 0 means invalid
    pub spec: i8,
    pub alpha: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    #[serde(skip)]
    pub pad: u16,
}

impl Color {
    pub const SPEC_INVALID: i8 = 0;
    pub const SPEC_RGB: i8 = 1;

    /// Opaque RGB color from 8-bit channels
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let widen = |c: u8| (c as u16) * 0x101;
        Self {
            spec: Self::SPEC_RGB,
            alpha: widen(a),
            red: widen(r),
            green: widen(g),
            blue: widen(b),
            pad: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.spec != Self::SPEC_INVALID
    }

    /// 8-bit RGBA taken from the high byte of each channel
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            (self.red >> 8) as u8,
            (self.green >> 8) as u8,
            (self.blue >> 8) as u8,
            (self.alpha >> 8) as u8,
        ]
    }

    pub fn read(reader: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            spec: reader.read_i8()?,
            alpha: reader.read_u16()?,
            red: reader.read_u16()?,
            green: reader.read_u16()?,
            blue: reader.read_u16()?,
            pad: reader.read_u16()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_i8(self.spec);
        writer.write_u16(self.alpha);
        writer.write_u16(self.red);
        writer.write_u16(self.green);
        writer.write_u16(self.blue);
        writer.write_u16(self.pad);
    }
}

/// QPointF
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn read(reader: &mut ByteCursor) -> Result<Self> {
        Ok(Self { x: reader.read_f64()?, y: reader.read_f64()? })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
    }
}

/// Three doubles (QVector3D streamed at double precision)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn read(reader: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            x: reader.read_f64()?,
            y: reader.read_f64()?,
            z: reader.read_f64()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.z);
    }
}

/// Integer 3D bounding box, streamed as max x/y/z then min x/y/z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds3D {
    pub min_x: i32,
    pub min_y: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub max_z: i32,
}

impl Bounds3D {
    /// Degenerate box containing a single point
    pub fn point(x: i32, y: i32, z: i32) -> Self {
        Self { min_x: x, min_y: y, min_z: z, max_x: x, max_y: y, max_z: z }
    }

    /// Box of the given half-extent around a point
    pub fn around(x: i32, y: i32, z: i32, radius: i32) -> Self {
        let r = radius.max(0);
        Self {
            min_x: x.saturating_sub(r),
            min_y: y.saturating_sub(r),
            min_z: z,
            max_x: x.saturating_add(r),
            max_y: y.saturating_add(r),
            max_z: z,
        }
    }

    pub fn extend(&mut self, x: i32, y: i32, z: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.max_z = self.max_z.max(z);
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x)
            && (self.min_y..=self.max_y).contains(&y)
            && (self.min_z..=self.max_z).contains(&z)
    }

    pub fn read(reader: &mut ByteCursor) -> Result<Self> {
        let max_x = reader.read_i32()?;
        let max_y = reader.read_i32()?;
        let max_z = reader.read_i32()?;
        let min_x = reader.read_i32()?;
        let min_y = reader.read_i32()?;
        let min_z = reader.read_i32()?;
        Ok(Self { min_x, min_y, min_z, max_x, max_y, max_z })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        for v in [self.max_x, self.max_y, self.max_z, self.min_x, self.min_y, self.min_z] {
            writer.write_i32(v);
        }
    }
}

/// QFont as streamed by Qt 5
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub style_name: String,
    pub point_size: f64,
    pub pixel_size: i32,
    pub style_hint: i8,
    pub style_strategy: u16,
    #[serde(skip)]
    pub reserved: u8,
    pub weight: i8,
    pub font_bits: i8,
    pub stretch: u16,
    pub extended_font_bits: i8,
    pub letter_spacing: i32,
    pub word_spacing: i32,
    pub hinting_preference: i8,
    pub capitalization: i8,
}

impl Font {
    pub fn read(reader: &mut ByteCursor) -> Result<Self> {
        Ok(Self {
            family: reader.read_string().field("family")?,
            style_name: reader.read_string().field("style_name")?,
            point_size: reader.read_f64()?,
            pixel_size: reader.read_i32()?,
            style_hint: reader.read_i8()?,
            style_strategy: reader.read_u16()?,
            reserved: reader.read_u8()?,
            weight: reader.read_i8()?,
            font_bits: reader.read_i8()?,
            stretch: reader.read_u16()?,
            extended_font_bits: reader.read_i8()?,
            letter_spacing: reader.read_i32()?,
            word_spacing: reader.read_i32()?,
            hinting_preference: reader.read_i8()?,
            capitalization: reader.read_i8()?,
        })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_string(&self.family);
        writer.write_string(&self.style_name);
        writer.write_f64(self.point_size);
        writer.write_i32(self.pixel_size);
        writer.write_i8(self.style_hint);
        writer.write_u16(self.style_strategy);
        writer.write_u8(self.reserved);
        writer.write_i8(self.weight);
        writer.write_i8(self.font_bits);
        writer.write_u16(self.stretch);
        writer.write_i8(self.extended_font_bits);
        writer.write_i32(self.letter_spacing);
        writer.write_i32(self.word_spacing);
        writer.write_i8(self.hinting_preference);
        writer.write_i8(self.capitalization);
    }
}
