//! Render-ready geometry derived from a parsed geoset

use glam::Vec3;

use crate::chunks::Geoset;
use crate::error::{MdxError, Result};

/// Bone slots per vertex
pub const BONES_PER_VERTEX: usize = 4;

/// Geometry buffers for one geoset
///
/// Bone indices are 1-based so that slot value 0 can mean "unused"; the
/// matching bone matrix palette starts with an identity matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeosetMesh {
    /// Position of this geoset in the `GEOS` chunk
    pub index: usize,
    pub material_id: u32,
    /// Flat `x, y, z`
    pub positions: Vec<f32>,
    /// Flat `x, y, z`
    pub normals: Vec<f32>,
    /// One flat `u, v` buffer per coordinate set
    pub uv_sets: Vec<Vec<f32>>,
    /// `BONES_PER_VERTEX` entries per vertex
    pub bone_indices: Vec<u8>,
    /// Used bone slots per vertex
    pub bone_counts: Vec<u8>,
    pub faces: Vec<u16>,
    /// Line list with three edges per triangle
    pub edges: Vec<u16>,
    pub min: Vec3,
    pub max: Vec3,
}

impl GeosetMesh {
    pub fn from_geoset(index: usize, geoset: &Geoset) -> Result<Self> {
        let vertex_count = geoset.vertex_count();

        // Split the concatenated matrix indices into per-group slices
        let mut groups = Vec::with_capacity(geoset.matrix_groups.len());
        let mut offset = 0usize;
        for &len in &geoset.matrix_groups {
            let end = offset.saturating_add(len as usize);
            let group = geoset.matrix_indices.get(offset..end).ok_or_else(|| {
                MdxError::ReferenceError(format!(
                    "Geoset {index}: matrix group [{offset}..{end}) exceeds {} matrix indices",
                    geoset.matrix_indices.len()
                ))
            })?;
            groups.push(group);
            offset = end;
        }

        let mut bone_indices = vec![0u8; vertex_count * BONES_PER_VERTEX];
        let mut bone_counts = vec![0u8; vertex_count];
        for vertex in 0..vertex_count {
            let Some(group) = geoset
                .vertex_groups
                .get(vertex)
                .and_then(|&g| groups.get(g as usize))
            else {
                continue;
            };

            let slots = &mut bone_indices[vertex * BONES_PER_VERTEX..][..BONES_PER_VERTEX];
            for (slot, &bone) in slots.iter_mut().zip(group.iter()) {
                *slot = bone
                    .checked_add(1)
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| {
                        MdxError::ReferenceError(format!(
                            "Geoset {index}: bone index {bone} does not fit a vertex slot"
                        ))
                    })?;
            }
            bone_counts[vertex] = group.len().min(BONES_PER_VERTEX) as u8;
        }

        let mut edges = Vec::with_capacity(geoset.faces.len() * 2);
        for tri in geoset.faces.chunks_exact(3) {
            edges.extend_from_slice(&[tri[0], tri[1], tri[1], tri[2], tri[2], tri[0]]);
        }

        let (min, max) = bounds(&geoset.vertices);

        Ok(Self {
            index,
            material_id: geoset.material_id,
            positions: geoset.vertices.clone(),
            normals: geoset.normals.clone(),
            uv_sets: geoset.texture_coordinate_sets.clone(),
            bone_indices,
            bone_counts,
            faces: geoset.faces.clone(),
            edges,
            min,
            max,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// All coordinate sets concatenated
    pub fn uvs(&self) -> Vec<f32> {
        self.uv_sets.concat()
    }
}

/// Component-wise bounds of flat positions; zero for no vertices
fn bounds(positions: &[f32]) -> (Vec3, Vec3) {
    let mut points = positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]));
    let Some(first) = points.next() else {
        return (Vec3::ZERO, Vec3::ZERO);
    };
    points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)))
}
