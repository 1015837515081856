use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::{ChunkRecord, NodeIndex, NodeRegistry, trailing_len};

/// A `RIBB` emitter that leaves a textured trail
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonEmitter {
    pub node: NodeIndex,
    pub height_above: f32,
    pub height_below: f32,
    pub alpha: f32,
    pub color: Vec3,
    pub lifespan: f32,
    pub texture_slot: u32,
    /// Segments per second
    pub emission_rate: u32,
    pub rows: u32,
    pub columns: u32,
    pub material_id: u32,
    pub gravity: f32,
    pub tracks: TrackContainer,
}

impl RibbonEmitter {
    const FIXED_SIZE: usize = 56;

    pub fn height_above(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KRHA, time, self.height_above)
    }

    pub fn height_below(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KRHB, time, self.height_below)
    }

    pub fn alpha(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KRAL, time, self.alpha)
    }

    pub fn color(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KRCO, time, self.color)
    }

    pub fn texture_slot(&self, time: &SampleTime<'_>) -> u32 {
        self.tracks.sample(tags::KRTX, time, self.texture_slot)
    }

    pub fn visibility(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KRVS, time, 1.0)
    }
}

impl ChunkRecord for RibbonEmitter {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let (node, node_size) = nodes.read_node(cursor)?;
        let track_len = trailing_len(size, node_size + Self::FIXED_SIZE, "RibbonEmitter", offset)?;

        let height_above = cursor.read_f32()?;
        let height_below = cursor.read_f32()?;
        let alpha = cursor.read_f32()?;
        let color = cursor.read_vec3()?;
        let lifespan = cursor.read_f32()?;
        let texture_slot = cursor.read_u32()?;
        let emission_rate = cursor.read_u32()?;
        let rows = cursor.read_u32()?;
        let columns = cursor.read_u32()?;
        let material_id = cursor.read_u32()?;
        let gravity = cursor.read_f32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                node,
                height_above,
                height_below,
                alpha,
                color,
                lifespan,
                texture_slot,
                emission_rate,
                rows,
                columns,
                material_id,
                gravity,
                tracks,
            },
            size,
        ))
    }
}
