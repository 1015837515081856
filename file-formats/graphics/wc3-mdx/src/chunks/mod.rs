//! Record decoders for every MDX chunk kind

pub mod attachment;
pub mod bone;
pub mod camera;
pub mod collision;
pub mod event;
pub mod geoset;
pub mod light;
pub mod material;
pub mod model_info;
pub mod node;
pub mod particle_emitter;
pub mod ribbon_emitter;
pub mod sequence;
pub mod texture;

pub use attachment::Attachment;
pub use bone::{Bone, Helper};
pub use camera::Camera;
pub use collision::{CollisionGeometry, CollisionShape};
pub use event::EventObject;
pub use geoset::{Geoset, GeosetAnimation, GeosetAnimationFlags};
pub use light::{Light, LightType};
pub use material::{FilterMode, Layer, LayerFlags, Material, MaterialFlags, TextureAnimation};
pub use model_info::{Extent, ModelInfo, Version};
pub use node::{Node, NodeFlags, NodeIndex, NodeRegistry, PivotPoint};
pub use particle_emitter::{ParticleEmitter, ParticleEmitter2};
pub use ribbon_emitter::RibbonEmitter;
pub use sequence::{GlobalSequence, Sequence, SequenceFlags};
pub use texture::{Texture, TextureFlags};

use crate::cursor::ByteCursor;
use crate::error::{MdxError, Result};

/// A record of constant encoded size
pub trait FixedSizeRecord: Sized {
    const SIZE: usize;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self>;
}

/// A record that reports its own encoded size
pub trait ChunkRecord: Sized {
    /// Decode one record, registering any embedded node
    ///
    /// Returns the record together with the byte size it reports for
    /// itself, which the dispatcher checks against the bytes consumed.
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)>;
}

/// `u32::MAX` marks an absent reference
pub(crate) fn optional_id(raw: u32) -> Option<u32> {
    (raw != u32::MAX).then_some(raw)
}

/// Bytes left for a trailing track container after `fixed` bytes
pub(crate) fn trailing_len(size: usize, fixed: usize, what: &str, offset: usize) -> Result<usize> {
    size.checked_sub(fixed).ok_or_else(|| {
        MdxError::ParseError(format!(
            "{what} at {offset:#x} declares size {size}, smaller than its {fixed} fixed bytes"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_id() {
        assert_eq!(optional_id(u32::MAX), None);
        assert_eq!(optional_id(0), Some(0));
    }

    #[test]
    fn test_trailing_len() {
        assert_eq!(trailing_len(40, 28, "Layer", 0).unwrap(), 12);
        assert!(trailing_len(20, 28, "Layer", 0).is_err());
    }
}
