use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::Result;

use super::FixedSizeRecord;

/// Axis-aligned bounds with a bounding radius
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extent {
    pub radius: f32,
    pub min: Vec3,
    pub max: Vec3,
}

impl Extent {
    pub const SIZE: usize = 28;

    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            radius: cursor.read_f32()?,
            min: cursor.read_vec3()?,
            max: cursor.read_vec3()?,
        })
    }

    /// Bounds from corners, with the radius set to half the diagonal
    pub fn from_bounds(min: Vec3, max: Vec3) -> Self {
        Self {
            radius: (max - min).length() / 2.0,
            min,
            max,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// `VERS` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub u32);

impl FixedSizeRecord for Version {
    const SIZE: usize = 4;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self(cursor.read_u32()?))
    }
}

/// `MODL` chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub animation_file: String,
    pub extent: Extent,
    pub blend_time: u32,
}

impl FixedSizeRecord for ModelInfo {
    const SIZE: usize = 80 + 260 + Extent::SIZE + 4;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            name: cursor.read_fixed_string(80)?,
            animation_file: cursor.read_fixed_string(260)?,
            extent: Extent::read(cursor)?,
            blend_time: cursor.read_u32()?,
        })
    }
}
