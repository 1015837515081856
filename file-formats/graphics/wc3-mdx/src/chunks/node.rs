use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::{MdxError, Result};
use crate::track::{SampleTime, TrackContainer, tags};

use super::FixedSizeRecord;

bitflags::bitflags! {
    /// Node flags as defined in the MDX format
    ///
    /// Bits 15 and 16 mean different things depending on the record kind
    /// and carry two names each.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u32 {
        const DONT_INHERIT_TRANSLATION = 0x0000_0001;
        const DONT_INHERIT_ROTATION = 0x0000_0002;
        const DONT_INHERIT_SCALING = 0x0000_0004;
        const BILLBOARDED = 0x0000_0008;
        const BILLBOARDED_LOCK_X = 0x0000_0010;
        const BILLBOARDED_LOCK_Y = 0x0000_0020;
        const BILLBOARDED_LOCK_Z = 0x0000_0040;
        const CAMERA_ANCHORED = 0x0000_0080;
        const BONE = 0x0000_0100;
        const LIGHT = 0x0000_0200;
        const EVENT_OBJECT = 0x0000_0400;
        const ATTACHMENT = 0x0000_0800;
        const PARTICLE_EMITTER = 0x0000_1000;
        const COLLISION_SHAPE = 0x0000_2000;
        const RIBBON_EMITTER = 0x0000_4000;
        /// Particle emitters: spawn MDL models
        const EMITTER_USES_MDL = 0x0000_8000;
        /// Particle emitters 2: unshaded
        const UNSHADED = 0x0000_8000;
        /// Particle emitters: spawn TGA textures
        const EMITTER_USES_TGA = 0x0001_0000;
        /// Particle emitters 2: sort primitives far Z
        const SORT_PRIMITIVES_FAR_Z = 0x0001_0000;
        const LINE_EMITTER = 0x0002_0000;
        const UNFOGGED = 0x0004_0000;
        const MODEL_SPACE = 0x0008_0000;
        const XY_QUAD = 0x0010_0000;
    }
}

impl NodeFlags {
    /// Any of the billboard modes
    pub fn is_billboarded(&self) -> bool {
        self.intersects(
            Self::BILLBOARDED
                | Self::BILLBOARDED_LOCK_X
                | Self::BILLBOARDED_LOCK_Y
                | Self::BILLBOARDED_LOCK_Z,
        )
    }
}

/// The transform header shared by bones, helpers, lights, attachments,
/// emitters, event objects and collision shapes
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Inclusive byte size of the node block
    pub size: u32,
    pub name: String,
    pub object_id: u32,
    /// `None` for roots
    pub parent_id: Option<u32>,
    pub flags: NodeFlags,
    pub tracks: TrackContainer,
}

impl Node {
    /// Size of the fixed part preceding the track container
    pub const HEADER_SIZE: usize = 4 + 80 + 4 + 4 + 4;

    pub fn new(name: impl Into<String>, object_id: u32, parent_id: Option<u32>) -> Self {
        Self {
            size: Self::HEADER_SIZE as u32,
            name: name.into(),
            object_id,
            parent_id,
            flags: NodeFlags::empty(),
            tracks: TrackContainer::new(),
        }
    }

    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.position();
        let size = cursor.read_u32()?;
        let track_len = (size as usize)
            .checked_sub(Self::HEADER_SIZE)
            .ok_or_else(|| {
                MdxError::ParseError(format!(
                    "Node at {offset:#x} declares size {size}, smaller than its header"
                ))
            })?;

        let name = cursor.read_fixed_string(80)?;
        let object_id = cursor.read_u32()?;
        let parent_id = u32::try_from(cursor.read_i32()?).ok();
        let flags = NodeFlags::from_bits_retain(cursor.read_u32()?);
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok(Self {
            size,
            name,
            object_id,
            parent_id,
            flags,
            tracks,
        })
    }

    pub fn translation(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KGTR, time, Vec3::ZERO)
    }

    /// Sampled rotation as a normalized quaternion
    pub fn rotation(&self, time: &SampleTime<'_>) -> glam::Quat {
        let raw = self.tracks.sample(tags::KGRT, time, glam::Vec4::W);
        if raw.length_squared() > f32::EPSILON {
            glam::Quat::from_vec4(raw).normalize()
        } else {
            glam::Quat::IDENTITY
        }
    }

    pub fn scaling(&self, time: &SampleTime<'_>) -> Vec3 {
        self.tracks.sample(tags::KGSC, time, Vec3::ONE)
    }
}

/// Index of a node in the [`NodeRegistry`], in parse order
pub type NodeIndex = usize;

/// All nodes of a model in the order they were parsed
///
/// Records hold a [`NodeIndex`] into this arena. Parent links are stored
/// as object ids and resolved when a skeleton is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a node and register it, returning its index and encoded size
    pub fn read_node(&mut self, cursor: &mut ByteCursor<'_>) -> Result<(NodeIndex, usize)> {
        let node = Node::read(cursor)?;
        let size = node.size as usize;
        log::trace!(
            "Node '{}' (object {}, parent {:?})",
            node.name,
            node.object_id,
            node.parent_id
        );
        Ok((self.push(node), size))
    }

    pub fn push(&mut self, node: Node) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Parse-order index of the node with `object_id`
    pub fn find_by_object_id(&self, object_id: u32) -> Option<NodeIndex> {
        self.nodes.iter().position(|n| n.object_id == object_id)
    }
}

/// A node pivot, indexed by object id
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PivotPoint(pub Vec3);

impl FixedSizeRecord for PivotPoint {
    const SIZE: usize = 12;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self(cursor.read_vec3()?))
    }
}
