//! Per-instance node hierarchy and world transform propagation
//!
//! The static [`Node`](crate::chunks::Node)s of a model never change. A
//! [`Skeleton`] holds one [`RuntimeNode`] per static node with its
//! evaluated local and world transforms, and is owned by a single instance.

use std::collections::HashMap;

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::chunks::NodeFlags;
use crate::model::MdxModel;
use crate::track::SampleTime;

/// Evaluated transform state of one node
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeNode {
    pub object_id: u32,
    /// Index of the parent in [`Skeleton::nodes`]
    pub parent: Option<usize>,
    pub flags: NodeFlags,
    pub pivot: Vec3,
    pub local_matrix: Mat4,
    pub local_translation: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub world_matrix: Mat4,
    /// The pivot carried into world space
    pub world_location: Vec3,
    pub world_rotation: Quat,
    /// Per-axis scale of the world matrix
    pub scale: Vec3,
    /// Component-wise reciprocal of `scale`, zero where `scale` is zero
    pub inverse_scale: Vec3,
}

impl RuntimeNode {
    pub(crate) fn new(object_id: u32, flags: NodeFlags, pivot: Vec3) -> Self {
        Self {
            object_id,
            parent: None,
            flags,
            pivot,
            local_matrix: Mat4::IDENTITY,
            local_translation: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            world_matrix: Mat4::IDENTITY,
            world_location: pivot,
            world_rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            inverse_scale: Vec3::ONE,
        }
    }
}

/// Maps billboard +X to the camera-facing axis and +Z to camera up
fn facing_rotation() -> Quat {
    Quat::from_mat3(&Mat3::from_cols(Vec3::Z, Vec3::X, Vec3::Y))
}

fn reciprocal(v: Vec3) -> Vec3 {
    let inv = |x: f32| if x == 0.0 { 0.0 } else { 1.0 / x };
    Vec3::new(inv(v.x), inv(v.y), inv(v.z))
}

fn column_scale(m: &Mat4) -> Vec3 {
    Vec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// Rotation that replaces the sampled one for a billboarded node
///
/// `camera` is the camera-to-world rotation of a camera looking down -Z.
/// The result is local to the parent, whose world rotation is
/// `parent_rotation`.
pub fn billboard_rotation(flags: NodeFlags, parent_rotation: Quat, camera: Quat) -> Quat {
    let to_local = parent_rotation.inverse();
    let toward_camera = to_local * (camera * Vec3::Z);

    if flags.contains(NodeFlags::BILLBOARDED_LOCK_X) {
        Quat::from_rotation_x((-toward_camera.y).atan2(toward_camera.z))
    } else if flags.contains(NodeFlags::BILLBOARDED_LOCK_Y) {
        Quat::from_rotation_y((-toward_camera.z).atan2(toward_camera.x))
    } else if flags.contains(NodeFlags::BILLBOARDED_LOCK_Z) {
        Quat::from_rotation_z(toward_camera.y.atan2(toward_camera.x))
    } else {
        (to_local * camera * facing_rotation()).normalize()
    }
}

/// The evaluated node hierarchy of one model instance
#[derive(Debug, Clone)]
pub struct Skeleton {
    nodes: Vec<RuntimeNode>,
    /// Parents always precede their children
    update_order: Vec<usize>,
    by_object_id: HashMap<u32, usize>,
}

impl Skeleton {
    pub fn new(model: &MdxModel) -> Self {
        let static_nodes = model.nodes();

        let mut by_object_id = HashMap::with_capacity(static_nodes.len());
        for (index, node) in static_nodes.iter().enumerate() {
            by_object_id.entry(node.object_id).or_insert(index);
        }

        let mut nodes: Vec<RuntimeNode> = static_nodes
            .iter()
            .enumerate()
            .map(|(index, node)| RuntimeNode::new(node.object_id, node.flags, model.pivot(index)))
            .collect();

        let mut parents: Vec<Option<usize>> = static_nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let parent_id = node.parent_id?;
                match by_object_id.get(&parent_id) {
                    Some(&parent) if parent != index => Some(parent),
                    Some(_) => {
                        log::warn!("Node '{}' is its own parent; treating it as a root", node.name);
                        None
                    }
                    None => {
                        log::warn!(
                            "Node '{}' references missing parent {parent_id}; treating it as a root",
                            node.name
                        );
                        None
                    }
                }
            })
            .collect();

        let update_order = topological_order(&mut parents);
        for (node, parent) in nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }

        Self {
            nodes,
            update_order,
            by_object_id,
        }
    }

    pub fn nodes(&self) -> &[RuntimeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&RuntimeNode> {
        self.nodes.get(index)
    }

    pub fn node_by_object_id(&self, object_id: u32) -> Option<&RuntimeNode> {
        self.by_object_id
            .get(&object_id)
            .and_then(|&i| self.nodes.get(i))
    }

    /// Node indices in update order
    pub fn update_order(&self) -> &[usize] {
        &self.update_order
    }

    /// Sample every node's pose tracks and propagate world transforms
    ///
    /// `camera` is the camera-to-world rotation used by billboarded nodes;
    /// without it they keep their sampled rotation.
    pub fn update(&mut self, model: &MdxModel, time: &SampleTime<'_>, camera: Option<Quat>) {
        let static_nodes = model.nodes();

        for &index in &self.update_order {
            let Some(source) = static_nodes.get(index) else {
                continue;
            };
            let translation = source.translation(time);
            let mut rotation = source.rotation(time);
            let scaling = source.scaling(time);

            let node = &self.nodes[index];
            let flags = node.flags;
            let pivot = node.pivot;

            let (mut parent_matrix, mut parent_rotation) = match node.parent {
                Some(parent) => (
                    self.nodes[parent].world_matrix,
                    self.nodes[parent].world_rotation,
                ),
                None => (Mat4::IDENTITY, Quat::IDENTITY),
            };

            let suppressed = NodeFlags::DONT_INHERIT_TRANSLATION
                | NodeFlags::DONT_INHERIT_ROTATION
                | NodeFlags::DONT_INHERIT_SCALING;
            if flags.intersects(suppressed) {
                let (mut s, mut r, mut t) = parent_matrix.to_scale_rotation_translation();
                if flags.contains(NodeFlags::DONT_INHERIT_TRANSLATION) {
                    t = Vec3::ZERO;
                }
                if flags.contains(NodeFlags::DONT_INHERIT_ROTATION) {
                    r = Quat::IDENTITY;
                    parent_rotation = Quat::IDENTITY;
                }
                if flags.contains(NodeFlags::DONT_INHERIT_SCALING) {
                    s = Vec3::ONE;
                }
                parent_matrix = Mat4::from_scale_rotation_translation(s, r, t);
            }

            if flags.is_billboarded() {
                if let Some(camera) = camera {
                    rotation = billboard_rotation(flags, parent_rotation, camera);
                }
            }

            let local_matrix = Mat4::from_translation(translation + pivot)
                * Mat4::from_quat(rotation)
                * Mat4::from_scale(scaling)
                * Mat4::from_translation(-pivot);
            let world_matrix = parent_matrix * local_matrix;
            let scale = column_scale(&world_matrix);

            let node = &mut self.nodes[index];
            node.local_matrix = local_matrix;
            node.local_translation = translation;
            node.local_rotation = rotation;
            node.local_scale = scaling;
            node.world_matrix = world_matrix;
            node.world_location = world_matrix.transform_point3(pivot);
            node.world_rotation = parent_rotation * rotation;
            node.scale = scale;
            node.inverse_scale = reciprocal(scale);
        }
    }

    /// Bone matrix palette for skinning
    ///
    /// Slot 0 is the identity, slot `object_id + 1` holds that node's world
    /// matrix, matching the 1-based bone indices of geoset meshes.
    pub fn bone_matrices(&self) -> Vec<Mat4> {
        let mut matrices = vec![Mat4::IDENTITY; self.nodes.len() + 1];
        for (&object_id, &index) in &self.by_object_id {
            if let Some(slot) = matrices.get_mut(object_id as usize + 1) {
                *slot = self.nodes[index].world_matrix;
            }
        }
        matrices
    }
}

/// Order nodes so that parents come first, demoting nodes that close a
/// parent cycle to roots
fn topological_order(parents: &mut [Option<usize>]) -> Vec<usize> {
    let count = parents.len();
    let mut done = vec![false; count];
    let mut on_path = vec![false; count];
    let mut order = Vec::with_capacity(count);

    for start in 0..count {
        loop {
            let mut path = Vec::new();
            let mut cycle_at = None;
            let mut current = Some(start);

            while let Some(index) = current {
                if done[index] {
                    break;
                }
                if on_path[index] {
                    cycle_at = Some(index);
                    break;
                }
                on_path[index] = true;
                path.push(index);
                current = parents[index];
            }

            for &index in &path {
                on_path[index] = false;
            }

            if let Some(index) = cycle_at {
                log::warn!("Parent cycle through node {index}; treating it as a root");
                parents[index] = None;
                continue;
            }

            for &index in path.iter().rev() {
                done[index] = true;
                order.push(index);
            }
            break;
        }
    }

    order
}
