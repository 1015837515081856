use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::{ChunkRecord, NodeIndex, NodeRegistry, trailing_len};

/// A named mount point, optionally referencing a model path
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub node: NodeIndex,
    pub path: String,
    pub attachment_id: u32,
    pub tracks: TrackContainer,
}

impl Attachment {
    const FIXED_SIZE: usize = 4 + 260 + 4;

    pub fn visibility(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KATV, time, 1.0)
    }
}

impl ChunkRecord for Attachment {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let (node, node_size) = nodes.read_node(cursor)?;
        let track_len = trailing_len(size, node_size + Self::FIXED_SIZE, "Attachment", offset)?;

        let path = cursor.read_fixed_string(260)?;
        let attachment_id = cursor.read_u32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                node,
                path,
                attachment_id,
                tracks,
            },
            size,
        ))
    }
}
