//! Positional little-endian reader over an in-memory MDX buffer

use byteorder::{ByteOrder, LittleEndian};
use glam::{Vec3, Vec4};

use crate::chunk_id::ChunkId;
use crate::error::{MdxError, Result};

/// A read cursor over a borrowed byte buffer
///
/// Every read is bounds checked and reports [`MdxError::UnexpectedEof`]
/// instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(MdxError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Look at the next tag without consuming it
    pub fn peek_tag(&self) -> Option<ChunkId> {
        let bytes = self.data.get(self.pos..self.pos + 4)?;
        Some(ChunkId::new([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_tag(&mut self) -> Result<ChunkId> {
        let bytes = self.take(4)?;
        Ok(ChunkId::new([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a tag and fail unless it equals `expected`
    pub fn expect_tag(&mut self, expected: ChunkId) -> Result<()> {
        let offset = self.pos;
        let found = self.read_tag()?;
        if found != expected {
            return Err(MdxError::UnexpectedTag {
                expected,
                found,
                offset,
            });
        }
        Ok(())
    }

    pub fn read_vec2(&mut self) -> Result<[f32; 2]> {
        Ok([self.read_f32()?, self.read_f32()?])
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        let bytes = self.take(12)?;
        Ok(Vec3::new(
            LittleEndian::read_f32(&bytes[0..4]),
            LittleEndian::read_f32(&bytes[4..8]),
            LittleEndian::read_f32(&bytes[8..12]),
        ))
    }

    pub fn read_vec4(&mut self) -> Result<Vec4> {
        let bytes = self.take(16)?;
        Ok(Vec4::new(
            LittleEndian::read_f32(&bytes[0..4]),
            LittleEndian::read_f32(&bytes[4..8]),
            LittleEndian::read_f32(&bytes[8..12]),
            LittleEndian::read_f32(&bytes[12..16]),
        ))
    }

    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N]> {
        let mut out = [0u32; N];
        LittleEndian::read_u32_into(self.take(N * 4)?, &mut out);
        Ok(out)
    }

    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0f32; N];
        LittleEndian::read_f32_into(self.take(N * 4)?, &mut out);
        Ok(out)
    }

    /// Read a NUL-padded string field of `len` bytes
    ///
    /// Everything from the first NUL onward is dropped; invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Borrow `count * elem_size` bytes, guarding the multiplication
    fn take_elements(&mut self, count: usize, elem_size: usize) -> Result<&'a [u8]> {
        let len = count.checked_mul(elem_size).ok_or(MdxError::UnexpectedEof {
            offset: self.pos,
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.take(len)
    }

    pub fn read_u8_vec(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.take_elements(count, 1)?.to_vec())
    }

    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = self.take_elements(count, 2)?;
        let mut out = vec![0u16; count];
        LittleEndian::read_u16_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_u32_vec(&mut self, count: usize) -> Result<Vec<u32>> {
        let bytes = self.take_elements(count, 4)?;
        let mut out = vec![0u32; count];
        LittleEndian::read_u32_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>> {
        let bytes = self.take_elements(count, 4)?;
        let mut out = vec![0f32; count];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    /// Sub-cursor over the next `len` bytes; the parent skips past them
    pub fn sub_cursor(&mut self, len: usize) -> Result<ByteCursor<'a>> {
        let start = self.pos;
        let slice = self.take(len)?;
        Ok(ByteCursor {
            data: &self.data[..start + slice.len()],
            pos: start,
        })
    }
}
