use crate::cursor::ByteCursor;
use crate::error::Result;

use super::FixedSizeRecord;

bitflags::bitflags! {
    /// Texture flags as defined in the MDX format
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TextureFlags: u32 {
        /// Texture is wrapped horizontally
        const WRAP_WIDTH = 0x01;
        /// Texture is wrapped vertically
        const WRAP_HEIGHT = 0x02;
    }
}

/// A texture reference
///
/// When `replaceable_id` is non-zero the path is usually empty and the
/// texture is resolved from the replaceable texture table instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    pub replaceable_id: u32,
    pub path: String,
    pub flags: TextureFlags,
}

impl Texture {
    /// Known replaceable texture ids with their directory and file stem
    pub const REPLACEABLES: &'static [(u32, &'static str, &'static str)] = &[
        (1, "TeamColor", "TeamColor00"),
        (2, "TeamGlow", "TeamGlow00"),
        (11, "Cliff", "Cliff0"),
        (31, "LordaeronTree", "LordaeronSummerTree"),
        (32, "AshenvaleTree", "AshenTree"),
        (33, "BarrensTree", "BarrensTree"),
        (34, "NorthrendTree", "NorthTree"),
        (35, "Mushroom", "MushroomTree"),
    ];

    /// Path this texture should be loaded from
    ///
    /// Replaceable textures map to `replaceabletextures/<dir>/<file>.blp`;
    /// everything else keeps its stored path with forward slashes.
    pub fn resolved_path(&self) -> String {
        if self.replaceable_id != 0 {
            if let Some((_, dir, file)) = Self::REPLACEABLES
                .iter()
                .find(|(id, _, _)| *id == self.replaceable_id)
            {
                return format!("replaceabletextures/{dir}/{file}.blp");
            }
            log::debug!("Unknown replaceable texture id {}", self.replaceable_id);
        }
        self.path.replace('\\', "/")
    }
}

impl FixedSizeRecord for Texture {
    const SIZE: usize = 268;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            replaceable_id: cursor.read_u32()?,
            path: cursor.read_fixed_string(260)?,
            flags: TextureFlags::from_bits_retain(cursor.read_u32()?),
        })
    }
}
