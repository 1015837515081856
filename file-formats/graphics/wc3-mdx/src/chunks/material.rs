use glam::{Vec3, Vec4};

use crate::chunk_id::ChunkId;
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::{ChunkRecord, NodeRegistry, trailing_len};

/// Blending applied when drawing a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    None,
    Transparent,
    Blend,
    Additive,
    AddAlpha,
    Modulate,
    Modulate2x,
    Unknown(u32),
}

impl FilterMode {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Transparent,
            2 => Self::Blend,
            3 => Self::Additive,
            4 => Self::AddAlpha,
            5 => Self::Modulate,
            6 => Self::Modulate2x,
            other => Self::Unknown(other),
        }
    }

    /// Draw-order group: opaque, alpha tested, blended, then additive
    pub fn render_order(self) -> usize {
        match self {
            Self::None | Self::Unknown(_) => 0,
            Self::Transparent => 1,
            Self::Blend => 2,
            Self::Additive | Self::AddAlpha | Self::Modulate | Self::Modulate2x => 3,
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LayerFlags: u32 {
        const UNSHADED = 0x01;
        const SPHERE_ENVIRONMENT_MAP = 0x02;
        const TWO_SIDED = 0x10;
        const UNFOGGED = 0x20;
        const NO_DEPTH_TEST = 0x40;
        const NO_DEPTH_SET = 0x80;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct MaterialFlags: u32 {
        const CONSTANT_COLOR = 0x01;
        const SORT_PRIMITIVES_FAR_Z = 0x10;
        const FULL_RESOLUTION = 0x20;
    }
}

/// One render pass of a material
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub filter_mode: FilterMode,
    pub flags: LayerFlags,
    pub texture_id: u32,
    pub texture_animation_id: Option<u32>,
    pub coord_id: u32,
    pub alpha: f32,
    pub tracks: TrackContainer,
}

impl Layer {
    const FIXED_SIZE: usize = 28;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let track_len = trailing_len(size, Self::FIXED_SIZE, "Layer", offset)?;

        let filter_mode = FilterMode::from_raw(cursor.read_u32()?);
        let flags = LayerFlags::from_bits_retain(cursor.read_u32()?);
        let texture_id = cursor.read_u32()?;
        let texture_animation_id = u32::try_from(cursor.read_i32()?).ok();
        let coord_id = cursor.read_u32()?;
        let alpha = cursor.read_f32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok(Self {
            filter_mode,
            flags,
            texture_id,
            texture_animation_id,
            coord_id,
            alpha,
            tracks,
        })
    }

    pub fn render_order(&self) -> usize {
        self.filter_mode.render_order()
    }

    pub fn alpha(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KMTA, time, self.alpha)
    }

    pub fn texture_id(&self, time: &SampleTime<'_>) -> u32 {
        self.tracks.sample(tags::KMTF, time, self.texture_id)
    }
}

/// An ordered list of layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub priority_plane: u32,
    pub flags: MaterialFlags,
    pub layers: Vec<Layer>,
}

impl ChunkRecord for Material {
    fn read(cursor: &mut ByteCursor<'_>, _nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let size = cursor.read_u32()? as usize;
        let priority_plane = cursor.read_u32()?;
        let flags = MaterialFlags::from_bits_retain(cursor.read_u32()?);

        cursor.expect_tag(ChunkId::LAYS)?;
        let count = cursor.read_u32()?;
        let mut layers = Vec::new();
        for _ in 0..count {
            layers.push(Layer::read(cursor)?);
        }

        Ok((
            Self {
                priority_plane,
                flags,
                layers,
            },
            size,
        ))
    }
}

/// Animated texture coordinate transform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureAnimation {
    pub tracks: TrackContainer,
}

impl TextureAnimation {
    pub fn translation(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KTAT, time, Vec3::ZERO)
    }

    pub fn rotation(&self, time: &SampleTime<'_>) -> Vec4 {
        self.tracks.sample(tags::KTAR, time, Vec4::W)
    }

    pub fn scaling(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KTAS, time, Vec3::ONE)
    }
}

impl ChunkRecord for TextureAnimation {
    fn read(cursor: &mut ByteCursor<'_>, _nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let track_len = trailing_len(size, 4, "TextureAnimation", offset)?;
        let tracks = TrackContainer::read(cursor, track_len)?;
        Ok((Self { tracks }, size))
    }
}
