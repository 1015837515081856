use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::{ChunkRecord, NodeIndex, NodeRegistry, trailing_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Omni,
    Directional,
    Ambient,
    Unknown(u32),
}

impl LightType {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::Omni,
            1 => Self::Directional,
            2 => Self::Ambient,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub node: NodeIndex,
    pub light_type: LightType,
    /// `[start, end]` attenuation distances
    pub attenuation: [u32; 2],
    pub color: Vec3,
    pub intensity: f32,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub tracks: TrackContainer,
}

impl Light {
    const FIXED_SIZE: usize = 48;

    pub fn attenuation_start(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks
            .sample(tags::KLAS, time, self.attenuation[0] as f32)
    }

    pub fn attenuation_end(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks
            .sample(tags::KLAE, time, self.attenuation[1] as f32)
    }

    pub fn color(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KLAC, time, self.color)
    }

    pub fn intensity(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KLAI, time, self.intensity)
    }

    pub fn ambient_color(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KLBC, time, self.ambient_color)
    }

    pub fn ambient_intensity(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KLBI, time, self.ambient_intensity)
    }

    pub fn visibility(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KLAV, time, 1.0)
    }
}

impl ChunkRecord for Light {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let (node, node_size) = nodes.read_node(cursor)?;
        let track_len = trailing_len(size, node_size + Self::FIXED_SIZE, "Light", offset)?;

        let light_type = LightType::from_raw(cursor.read_u32()?);
        let attenuation = cursor.read_u32_array::<2>()?;
        let color = cursor.read_vec3()?;
        let intensity = cursor.read_f32()?;
        let ambient_color = cursor.read_vec3()?;
        let ambient_intensity = cursor.read_f32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                node,
                light_type,
                attenuation,
                color,
                intensity,
                ambient_color,
                ambient_intensity,
                tracks,
            },
            size,
        ))
    }
}
