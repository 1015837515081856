use crate::cursor::ByteCursor;
use crate::error::Result;

use super::{ChunkRecord, NodeIndex, NodeRegistry, optional_id};

/// A skinning bone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bone {
    pub node: NodeIndex,
    pub geoset_id: Option<u32>,
    pub geoset_animation_id: Option<u32>,
}

impl ChunkRecord for Bone {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let (node, node_size) = nodes.read_node(cursor)?;
        let geoset_id = optional_id(cursor.read_u32()?);
        let geoset_animation_id = optional_id(cursor.read_u32()?);
        Ok((
            Self {
                node,
                geoset_id,
                geoset_animation_id,
            },
            node_size + 8,
        ))
    }
}

/// A transform-only node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Helper {
    pub node: NodeIndex,
}

impl ChunkRecord for Helper {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let (node, node_size) = nodes.read_node(cursor)?;
        Ok((Self { node }, node_size))
    }
}
