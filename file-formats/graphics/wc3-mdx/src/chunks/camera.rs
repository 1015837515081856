use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::{ChunkRecord, NodeRegistry, trailing_len};

/// A named camera; not part of the node hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub position: Vec3,
    pub field_of_view: f32,
    pub far_clipping_plane: f32,
    pub near_clipping_plane: f32,
    pub target_position: Vec3,
    pub tracks: TrackContainer,
}

impl Camera {
    const FIXED_SIZE: usize = 120;

    /// Sampled translation added to `position`
    pub fn translation(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KCTR, time, Vec3::ZERO)
    }

    /// Sampled translation added to `target_position`
    pub fn target_translation(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KTTR, time, Vec3::ZERO)
    }

    pub fn roll(&self, time: &SampleTime<'_>) -> u32 {
        self.tracks.sample(tags::KCRL, time, 0)
    }

    pub fn eye(&self, time: &SampleTime<'_>) -> Vec3 {
        self.position + self.translation(time)
    }

    pub fn target(&self, time: &SampleTime<'_>) -> Vec3 {
        self.target_position + self.target_translation(time)
    }
}

impl ChunkRecord for Camera {
    fn read(cursor: &mut ByteCursor<'_>, _nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let track_len = trailing_len(size, Self::FIXED_SIZE, "Camera", offset)?;

        let name = cursor.read_fixed_string(80)?;
        let position = cursor.read_vec3()?;
        let field_of_view = cursor.read_f32()?;
        let far_clipping_plane = cursor.read_f32()?;
        let near_clipping_plane = cursor.read_f32()?;
        let target_position = cursor.read_vec3()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                name,
                position,
                field_of_view,
                far_clipping_plane,
                near_clipping_plane,
                target_position,
                tracks,
            },
            size,
        ))
    }
}
