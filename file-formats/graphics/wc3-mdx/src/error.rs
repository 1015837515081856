use std::io;
use thiserror::Error;

use crate::chunk_id::ChunkId;

/// Error types for MDX model parsing and assembly
#[derive(Error, Debug)]
pub enum MdxError {
    /// I/O Error while loading a file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in the file header
    #[error("Invalid magic number: expected '{expected}', got '{actual}'")]
    InvalidMagic { expected: String, actual: String },

    /// A required inner tag did not match
    #[error("Unexpected tag at offset {offset:#x}: expected '{expected}', found '{found}'")]
    UnexpectedTag {
        expected: ChunkId,
        found: ChunkId,
        offset: usize,
    },

    /// A track container held a tag with no known value layout
    #[error("Unknown track tag '{tag}' at offset {offset:#x}")]
    UnknownTrackTag { tag: ChunkId, offset: usize },

    /// Declared and decoded sizes disagree
    #[error("Size mismatch in '{tag}': declared {declared} bytes, consumed {consumed} bytes")]
    ChunkSizeMismatch {
        tag: ChunkId,
        declared: usize,
        consumed: usize,
    },

    /// Read past the end of the buffer
    #[error("Unexpected end of data at offset {offset:#x}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Reference error: invalid cross reference between records
    #[error("Reference error: {0}")]
    ReferenceError(String),
}

/// Result type using MdxError
pub type Result<T> = std::result::Result<T, MdxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MdxError::InvalidMagic {
            expected: "MDLX".to_string(),
            actual: "MD20".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid magic number: expected 'MDLX', got 'MD20'"
        );

        let err = MdxError::ChunkSizeMismatch {
            tag: ChunkId::BONE,
            declared: 100,
            consumed: 104,
        };
        assert_eq!(
            err.to_string(),
            "Size mismatch in 'BONE': declared 100 bytes, consumed 104 bytes"
        );

        let err = MdxError::UnexpectedEof {
            offset: 16,
            needed: 4,
            remaining: 2,
        };
        assert!(err.to_string().contains("0x10"));
    }
}
