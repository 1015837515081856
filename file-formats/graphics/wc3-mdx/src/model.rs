//! Model-level assembly over a parsed MDX file
//!
//! [`MdxModel`] is immutable once built and is meant to be shared between
//! any number of [`ModelInstance`](crate::instance::ModelInstance)s through
//! an `Arc`.

use std::path::Path;

use glam::Vec3;

use crate::chunks::{
    Attachment, Bone, Camera, CollisionShape, EventObject, Extent, GeosetAnimation, Layer, Light,
    Material, Node, ParticleEmitter, ParticleEmitter2, RibbonEmitter, Sequence, Texture,
    TextureAnimation,
};
use crate::error::{MdxError, Result};
use crate::geoset::GeosetMesh;
use crate::parser::MdxFile;
use crate::track::SampleTime;

/// Layers and geoset animations below this alpha are not drawn
pub const VISIBILITY_THRESHOLD: f32 = 0.75;

/// Number of draw-order groups
pub const RENDER_ORDER_GROUPS: usize = 4;

/// One geoset drawn with one material layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub geoset: usize,
    pub material: usize,
    pub layer: usize,
    pub render_order: usize,
}

/// An assembled, read-only model
#[derive(Debug, Clone)]
pub struct MdxModel {
    file: MdxFile,
    name: String,
    nodes: Vec<Node>,
    pivots: Vec<Vec3>,
    bones: Vec<Bone>,
    meshes: Vec<GeosetMesh>,
    batches: Vec<Batch>,
    extent: Extent,
    texture_paths: Vec<String>,
    global_sequences: Vec<u32>,
}

impl MdxModel {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_file(MdxFile::parse(data)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(MdxFile::from_path(path)?)
    }

    pub fn from_file(file: MdxFile) -> Result<Self> {
        let name = file
            .model_info()
            .map(|info| info.name.clone())
            .unwrap_or_default();

        let mut nodes = file.nodes().as_slice().to_vec();
        let pivots = if nodes.is_empty() {
            log::debug!("Model '{name}' has no nodes; adding a root node");
            nodes.push(Node::new("", 0, None));
            vec![Vec3::ZERO]
        } else {
            // Object ids index pivots and bone palette slots
            if let Some(node) = nodes.iter().find(|n| n.object_id as usize >= nodes.len()) {
                return Err(MdxError::ReferenceError(format!(
                    "Node '{}' has object id {}, but there are {} nodes",
                    node.name,
                    node.object_id,
                    nodes.len()
                )));
            }
            let pivot_points = file.pivot_points();
            nodes
                .iter()
                .map(|node| {
                    pivot_points
                        .get(node.object_id as usize)
                        .map_or(Vec3::ZERO, |p| p.0)
                })
                .collect()
        };

        let mut bones = file.bones().to_vec();
        if bones.is_empty() {
            // Geosets always need at least one bone to bind against
            bones.push(Bone {
                node: 0,
                geoset_id: None,
                geoset_animation_id: None,
            });
        }

        let materials = file.materials();
        let mut meshes = Vec::with_capacity(file.geosets().len());
        let mut groups: [Vec<Batch>; RENDER_ORDER_GROUPS] = Default::default();
        for (index, geoset) in file.geosets().iter().enumerate() {
            let mesh = GeosetMesh::from_geoset(index, geoset)?;
            let material_index = geoset.material_id as usize;
            let material = materials.get(material_index).ok_or_else(|| {
                MdxError::ReferenceError(format!(
                    "Geoset {index} references material {material_index}, but there are {}",
                    materials.len()
                ))
            })?;

            for (layer_index, layer) in material.layers.iter().enumerate() {
                let render_order = layer.render_order();
                groups[render_order].push(Batch {
                    geoset: index,
                    material: material_index,
                    layer: layer_index,
                    render_order,
                });
            }
            meshes.push(mesh);
        }
        let batches = groups.concat();

        let extent = if meshes.is_empty() {
            file.model_info().map(|info| info.extent).unwrap_or_default()
        } else {
            let (min, max) = meshes.iter().fold(
                (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
                |(min, max), mesh| (min.min(mesh.min), max.max(mesh.max)),
            );
            Extent::from_bounds(min, max)
        };

        let texture_paths = file.textures().iter().map(Texture::resolved_path).collect();
        let global_sequences = file.global_sequence_durations();

        log::debug!(
            "Assembled model '{name}': {} nodes, {} geosets, {} batches",
            nodes.len(),
            meshes.len(),
            batches.len()
        );

        Ok(Self {
            file,
            name,
            nodes,
            pivots,
            bones,
            meshes,
            batches,
            extent,
            texture_paths,
            global_sequences,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed chunks this model was built from
    pub fn file(&self) -> &MdxFile {
        &self.file
    }

    /// Nodes in parse order, or a single synthetic root
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Pivot of the node at `index` in [`Self::nodes`]
    pub fn pivot(&self, index: usize) -> Vec3 {
        self.pivots.get(index).copied().unwrap_or(Vec3::ZERO)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn meshes(&self) -> &[GeosetMesh] {
        &self.meshes
    }

    /// Geoset/layer pairs sorted into draw-order groups
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Resolved texture paths, in `TEXS` order
    pub fn texture_paths(&self) -> &[String] {
        &self.texture_paths
    }

    pub fn global_sequences(&self) -> &[u32] {
        &self.global_sequences
    }

    pub fn sequences(&self) -> &[Sequence] {
        self.file.sequences()
    }

    pub fn find_sequence(&self, name: &str) -> Option<usize> {
        self.sequences()
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn materials(&self) -> &[Material] {
        self.file.materials()
    }

    pub fn layer(&self, batch: &Batch) -> Option<&Layer> {
        self.materials()
            .get(batch.material)
            .and_then(|m| m.layers.get(batch.layer))
    }

    pub fn texture_animations(&self) -> &[TextureAnimation] {
        self.file.texture_animations()
    }

    pub fn geoset_animations(&self) -> &[GeosetAnimation] {
        self.file.geoset_animations()
    }

    /// First geoset animation bound to `geoset`
    pub fn geoset_animation_for(&self, geoset: usize) -> Option<&GeosetAnimation> {
        self.geoset_animations()
            .iter()
            .find(|a| a.geoset_id as usize == geoset)
    }

    pub fn lights(&self) -> &[Light] {
        self.file.lights()
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.file.attachments()
    }

    pub fn cameras(&self) -> &[Camera] {
        self.file.cameras()
    }

    pub fn particle_emitters(&self) -> &[ParticleEmitter] {
        self.file.particle_emitters()
    }

    pub fn particle_emitters2(&self) -> &[ParticleEmitter2] {
        self.file.particle_emitters2()
    }

    pub fn ribbon_emitters(&self) -> &[RibbonEmitter] {
        self.file.ribbon_emitters()
    }

    pub fn event_objects(&self) -> &[EventObject] {
        self.file.event_objects()
    }

    pub fn collision_shapes(&self) -> &[CollisionShape] {
        self.file.collision_shapes()
    }

    /// Build a sampling clock, clamping `frame` into the sequence window
    ///
    /// With no (or an unknown) sequence the frame is used as given,
    /// saturated to the `i32` range.
    pub fn sample_time(&self, sequence: Option<usize>, frame: i64, counter: u32) -> SampleTime<'_> {
        let frame = match sequence.and_then(|i| self.sequences().get(i)) {
            Some(seq) => seq.clamp_frame(frame),
            None => frame.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        };
        SampleTime::new(frame, counter, &self.global_sequences)
    }

    /// Whether a batch is visible at `time`
    ///
    /// The layer alpha and every geoset animation bound to the geoset must
    /// reach [`VISIBILITY_THRESHOLD`].
    pub fn should_render(&self, batch: &Batch, time: &SampleTime<'_>) -> bool {
        let Some(layer) = self.layer(batch) else {
            return false;
        };
        if layer.alpha(time) < VISIBILITY_THRESHOLD {
            return false;
        }
        self.geoset_animations()
            .iter()
            .filter(|a| a.geoset_id as usize == batch.geoset)
            .all(|a| a.alpha(time) >= VISIBILITY_THRESHOLD)
    }

    /// Tint for a geoset in red, green, blue order
    pub fn geoset_color(&self, geoset: usize, time: &SampleTime<'_>) -> Vec3 {
        self.geoset_animation_for(geoset)
            .map_or(Vec3::ONE, |a| a.rgb(time))
    }

    /// Texture coordinate offset for a layer's texture animation
    pub fn uv_offset(&self, layer: &Layer, time: &SampleTime<'_>) -> Vec3 {
        layer
            .texture_animation_id
            .and_then(|id| self.texture_animations().get(id as usize))
            .map_or(Vec3::ZERO, |anim| anim.translation(time))
    }

    /// Resolved path of the texture a layer shows at `time`
    pub fn layer_texture(&self, layer: &Layer, time: &SampleTime<'_>) -> Option<&str> {
        self.texture_paths
            .get(layer.texture_id(time) as usize)
            .map(String::as_str)
    }
}
