use crate::chunk_id::ChunkId;
use crate::cursor::ByteCursor;
use crate::error::Result;

use super::{ChunkRecord, NodeIndex, NodeRegistry};

/// A node that fires at fixed frames (sounds, splats, spawned models)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventObject {
    pub node: NodeIndex,
    pub global_sequence_id: Option<u32>,
    pub frames: Vec<u32>,
}

impl EventObject {
    /// Frames that fall inside `(from, to]`
    pub fn fired_between(&self, from: u32, to: u32) -> impl Iterator<Item = u32> + '_ {
        self.frames
            .iter()
            .copied()
            .filter(move |&f| f > from && f <= to)
    }
}

impl ChunkRecord for EventObject {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let (node, node_size) = nodes.read_node(cursor)?;
        cursor.expect_tag(ChunkId::KEVT)?;
        let count = cursor.read_u32()? as usize;
        let global_sequence_id = u32::try_from(cursor.read_i32()?).ok();
        let frames = cursor.read_u32_vec(count)?;

        Ok((
            Self {
                node,
                global_sequence_id,
                frames,
            },
            node_size + 12 + count * 4,
        ))
    }
}
