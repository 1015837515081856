use crate::cursor::ByteCursor;
use crate::error::Result;

use super::FixedSizeRecord;
use super::model_info::Extent;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SequenceFlags: u32 {
        const NON_LOOPING = 0x01;
    }
}

/// An animation sequence: a named frame window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    pub name: String,
    /// `[start, end]` in frames (milliseconds)
    pub interval: [u32; 2],
    pub move_speed: f32,
    pub flags: SequenceFlags,
    pub rarity: f32,
    pub sync_point: u32,
    pub extent: Extent,
}

impl Sequence {
    pub fn start(&self) -> u32 {
        self.interval[0]
    }

    pub fn end(&self) -> u32 {
        self.interval[1]
    }

    pub fn duration(&self) -> u32 {
        self.end().saturating_sub(self.start())
    }

    pub fn is_looping(&self) -> bool {
        !self.flags.contains(SequenceFlags::NON_LOOPING)
    }

    /// Clamp `frame` into this sequence's window
    pub fn clamp_frame(&self, frame: i64) -> i32 {
        let start = i64::from(self.start());
        let end = i64::from(self.end()).max(start);
        frame.clamp(start, end) as i32
    }
}

impl FixedSizeRecord for Sequence {
    const SIZE: usize = 132;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            name: cursor.read_fixed_string(80)?,
            interval: cursor.read_u32_array::<2>()?,
            move_speed: cursor.read_f32()?,
            flags: SequenceFlags::from_bits_retain(cursor.read_u32()?),
            rarity: cursor.read_f32()?,
            sync_point: cursor.read_u32()?,
            extent: Extent::read(cursor)?,
        })
    }
}

/// An independent looping clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalSequence {
    pub duration: u32,
}

impl FixedSizeRecord for GlobalSequence {
    const SIZE: usize = 4;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            duration: cursor.read_u32()?,
        })
    }
}
