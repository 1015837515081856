use glam::Vec3;

use crate::chunk_id::ChunkId;
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::model_info::Extent;
use super::{ChunkRecord, NodeRegistry, trailing_len};

/// Raw geoset geometry as stored in a `GEOS` chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geoset {
    /// Flat `x, y, z` positions
    pub vertices: Vec<f32>,
    /// Flat `x, y, z` normals
    pub normals: Vec<f32>,
    pub face_type_groups: Vec<u32>,
    pub face_groups: Vec<u32>,
    /// Triangle list indices
    pub faces: Vec<u16>,
    /// Matrix group index per vertex
    pub vertex_groups: Vec<u8>,
    /// Number of bone indices in each matrix group
    pub matrix_groups: Vec<u32>,
    /// Concatenated bone indices of all matrix groups
    pub matrix_indices: Vec<u32>,
    pub material_id: u32,
    pub selection_group: u32,
    pub selection_flags: u32,
    pub extent: Extent,
    /// One extent per sequence
    pub sequence_extents: Vec<Extent>,
    /// Flat `u, v` coordinate sets
    pub texture_coordinate_sets: Vec<Vec<f32>>,
}

impl Geoset {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

fn read_counted<'a, T>(
    cursor: &mut ByteCursor<'a>,
    tag: ChunkId,
    per_count: usize,
    read: impl FnOnce(&mut ByteCursor<'a>, usize) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    cursor.expect_tag(tag)?;
    let count = cursor.read_u32()? as usize;
    read(cursor, count.saturating_mul(per_count))
}

impl ChunkRecord for Geoset {
    fn read(cursor: &mut ByteCursor<'_>, _nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let size = cursor.read_u32()? as usize;

        let vertices = read_counted(cursor, ChunkId::VRTX, 3, ByteCursor::read_f32_vec)?;
        let normals = read_counted(cursor, ChunkId::NRMS, 3, ByteCursor::read_f32_vec)?;
        let face_type_groups = read_counted(cursor, ChunkId::PTYP, 1, ByteCursor::read_u32_vec)?;
        let face_groups = read_counted(cursor, ChunkId::PCNT, 1, ByteCursor::read_u32_vec)?;
        let faces = read_counted(cursor, ChunkId::PVTX, 1, ByteCursor::read_u16_vec)?;
        let vertex_groups = read_counted(cursor, ChunkId::GNDX, 1, ByteCursor::read_u8_vec)?;
        let matrix_groups = read_counted(cursor, ChunkId::MTGC, 1, ByteCursor::read_u32_vec)?;
        let matrix_indices = read_counted(cursor, ChunkId::MATS, 1, ByteCursor::read_u32_vec)?;

        let material_id = cursor.read_u32()?;
        let selection_group = cursor.read_u32()?;
        let selection_flags = cursor.read_u32()?;
        let extent = Extent::read(cursor)?;

        let extent_count = cursor.read_u32()?;
        let mut sequence_extents = Vec::new();
        for _ in 0..extent_count {
            sequence_extents.push(Extent::read(cursor)?);
        }

        cursor.expect_tag(ChunkId::UVAS)?;
        let set_count = cursor.read_u32()?;
        let mut texture_coordinate_sets = Vec::new();
        for _ in 0..set_count {
            texture_coordinate_sets.push(read_counted(
                cursor,
                ChunkId::UVBS,
                2,
                ByteCursor::read_f32_vec,
            )?);
        }

        Ok((
            Self {
                vertices,
                normals,
                face_type_groups,
                face_groups,
                faces,
                vertex_groups,
                matrix_groups,
                matrix_indices,
                material_id,
                selection_group,
                selection_flags,
                extent,
                sequence_extents,
                texture_coordinate_sets,
            },
            size,
        ))
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct GeosetAnimationFlags: u32 {
        const DROP_SHADOW = 0x01;
        const COLOR = 0x02;
    }
}

/// Per-geoset animated alpha and color
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeosetAnimation {
    pub alpha: f32,
    pub flags: GeosetAnimationFlags,
    /// Stored in blue, green, red order
    pub color: Vec3,
    pub geoset_id: u32,
    pub tracks: TrackContainer,
}

impl GeosetAnimation {
    const FIXED_SIZE: usize = 28;

    pub fn alpha(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KGAO, time, self.alpha)
    }

    /// Sampled color as stored (blue, green, red)
    pub fn color(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KGAC, time, self.color)
    }

    /// Sampled color in red, green, blue order
    pub fn rgb(&self, time: &SampleTime<'_>) -> Vec3 {
        let bgr = self.color(time);
        Vec3::new(bgr.z, bgr.y, bgr.x)
    }
}

impl ChunkRecord for GeosetAnimation {
    fn read(cursor: &mut ByteCursor<'_>, _nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let track_len = trailing_len(size, Self::FIXED_SIZE, "GeosetAnimation", offset)?;

        let alpha = cursor.read_f32()?;
        let flags = GeosetAnimationFlags::from_bits_retain(cursor.read_u32()?);
        let color = cursor.read_vec3()?;
        let geoset_id = cursor.read_u32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                alpha,
                flags,
                color,
                geoset_id,
                tracks,
            },
            size,
        ))
    }
}
