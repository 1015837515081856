use std::fmt;

/// A 4-byte tag identifying a chunk, an inner block, or a track
///
/// MDX stores tags in reading order, so the bytes compare directly
/// against their ASCII spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId {
    pub bytes: [u8; 4],
}

impl ChunkId {
    /// Container magic
    pub const MDLX: Self = Self::new(*b"MDLX");

    // Top-level chunks
    pub const VERS: Self = Self::new(*b"VERS");
    pub const MODL: Self = Self::new(*b"MODL");
    pub const SEQS: Self = Self::new(*b"SEQS");
    pub const GLBS: Self = Self::new(*b"GLBS");
    pub const TEXS: Self = Self::new(*b"TEXS");
    pub const MTLS: Self = Self::new(*b"MTLS");
    pub const TXAN: Self = Self::new(*b"TXAN");
    pub const GEOS: Self = Self::new(*b"GEOS");
    pub const GEOA: Self = Self::new(*b"GEOA");
    pub const BONE: Self = Self::new(*b"BONE");
    pub const LITE: Self = Self::new(*b"LITE");
    pub const HELP: Self = Self::new(*b"HELP");
    pub const ATCH: Self = Self::new(*b"ATCH");
    pub const PIVT: Self = Self::new(*b"PIVT");
    pub const PREM: Self = Self::new(*b"PREM");
    pub const PRE2: Self = Self::new(*b"PRE2");
    pub const RIBB: Self = Self::new(*b"RIBB");
    pub const EVTS: Self = Self::new(*b"EVTS");
    pub const CAMS: Self = Self::new(*b"CAMS");
    pub const CLID: Self = Self::new(*b"CLID");

    // Inner blocks
    pub const LAYS: Self = Self::new(*b"LAYS");
    pub const VRTX: Self = Self::new(*b"VRTX");
    pub const NRMS: Self = Self::new(*b"NRMS");
    pub const PTYP: Self = Self::new(*b"PTYP");
    pub const PCNT: Self = Self::new(*b"PCNT");
    pub const PVTX: Self = Self::new(*b"PVTX");
    pub const GNDX: Self = Self::new(*b"GNDX");
    pub const MTGC: Self = Self::new(*b"MTGC");
    pub const MATS: Self = Self::new(*b"MATS");
    pub const UVAS: Self = Self::new(*b"UVAS");
    pub const UVBS: Self = Self::new(*b"UVBS");
    pub const KEVT: Self = Self::new(*b"KEVT");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self { bytes }
    }

    /// Get the chunk ID as a string, replacing non-printable bytes with '?'
    pub fn as_string(&self) -> String {
        self.bytes
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '?'
                }
            })
            .collect()
    }
}

impl From<[u8; 4]> for ChunkId {
    fn from(bytes: [u8; 4]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}
