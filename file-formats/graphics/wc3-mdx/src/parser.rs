//! Chunk dispatcher for MDX files
//!
//! An MDX file is the magic `MDLX` followed by chunks of
//! `tag: [u8; 4], size: u32, payload: [u8; size]`. Each known tag maps to
//! one record kind and a size mode:
//!
//! - single: the payload is exactly one record of known size
//! - fixed: the payload is `size / record_size` records of known size
//! - variable: records report their own size and are read until the
//!   payload is consumed exactly
//!
//! Unknown tags are skipped by their declared size.

use std::collections::BTreeMap;
use std::path::Path;

use crate::chunk_id::ChunkId;
use crate::chunks::{
    Attachment, Bone, Camera, ChunkRecord, CollisionShape, EventObject, FixedSizeRecord, Geoset,
    GeosetAnimation, GlobalSequence, Helper, Light, Material, ModelInfo, NodeRegistry,
    ParticleEmitter, ParticleEmitter2, PivotPoint, RibbonEmitter, Sequence, Texture,
    TextureAnimation, Version,
};
use crate::cursor::ByteCursor;
use crate::error::{MdxError, Result};

/// How a chunk payload is divided into records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    /// Exactly one record of this size
    Single(usize),
    /// Any number of records of this size
    Fixed(usize),
    /// Records report their own size
    Variable,
}

/// The chunk kinds this parser decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Version,
    Model,
    Sequences,
    GlobalSequences,
    Textures,
    Materials,
    TextureAnimations,
    Geosets,
    GeosetAnimations,
    Bones,
    Lights,
    Helpers,
    Attachments,
    PivotPoints,
    ParticleEmitters,
    ParticleEmitters2,
    RibbonEmitters,
    EventObjects,
    Cameras,
    CollisionShapes,
}

impl ChunkKind {
    pub fn from_id(id: ChunkId) -> Option<Self> {
        let kind = match id {
            ChunkId::VERS => Self::Version,
            ChunkId::MODL => Self::Model,
            ChunkId::SEQS => Self::Sequences,
            ChunkId::GLBS => Self::GlobalSequences,
            ChunkId::TEXS => Self::Textures,
            ChunkId::MTLS => Self::Materials,
            ChunkId::TXAN => Self::TextureAnimations,
            ChunkId::GEOS => Self::Geosets,
            ChunkId::GEOA => Self::GeosetAnimations,
            ChunkId::BONE => Self::Bones,
            ChunkId::LITE => Self::Lights,
            ChunkId::HELP => Self::Helpers,
            ChunkId::ATCH => Self::Attachments,
            ChunkId::PIVT => Self::PivotPoints,
            ChunkId::PREM => Self::ParticleEmitters,
            ChunkId::PRE2 => Self::ParticleEmitters2,
            ChunkId::RIBB => Self::RibbonEmitters,
            ChunkId::EVTS => Self::EventObjects,
            ChunkId::CAMS => Self::Cameras,
            ChunkId::CLID => Self::CollisionShapes,
            _ => return None,
        };
        Some(kind)
    }

    pub fn size_mode(self) -> SizeMode {
        match self {
            Self::Version => SizeMode::Single(Version::SIZE),
            Self::Model => SizeMode::Single(ModelInfo::SIZE),
            Self::Sequences => SizeMode::Fixed(Sequence::SIZE),
            Self::GlobalSequences => SizeMode::Fixed(GlobalSequence::SIZE),
            Self::Textures => SizeMode::Fixed(Texture::SIZE),
            Self::PivotPoints => SizeMode::Fixed(PivotPoint::SIZE),
            _ => SizeMode::Variable,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Version => "Version",
            Self::Model => "Model",
            Self::Sequences => "Sequences",
            Self::GlobalSequences => "Global sequences",
            Self::Textures => "Textures",
            Self::Materials => "Materials",
            Self::TextureAnimations => "Texture animations",
            Self::Geosets => "Geosets",
            Self::GeosetAnimations => "Geoset animations",
            Self::Bones => "Bones",
            Self::Lights => "Lights",
            Self::Helpers => "Helpers",
            Self::Attachments => "Attachments",
            Self::PivotPoints => "Pivot points",
            Self::ParticleEmitters => "Particle emitters",
            Self::ParticleEmitters2 => "Particle emitters 2",
            Self::RibbonEmitters => "Ribbon emitters",
            Self::EventObjects => "Event objects",
            Self::Cameras => "Cameras",
            Self::CollisionShapes => "Collision shapes",
        }
    }
}

/// A decoded chunk
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Version(Version),
    Model(ModelInfo),
    Sequences(Vec<Sequence>),
    GlobalSequences(Vec<GlobalSequence>),
    Textures(Vec<Texture>),
    Materials(Vec<Material>),
    TextureAnimations(Vec<TextureAnimation>),
    Geosets(Vec<Geoset>),
    GeosetAnimations(Vec<GeosetAnimation>),
    Bones(Vec<Bone>),
    Lights(Vec<Light>),
    Helpers(Vec<Helper>),
    Attachments(Vec<Attachment>),
    PivotPoints(Vec<PivotPoint>),
    ParticleEmitters(Vec<ParticleEmitter>),
    ParticleEmitters2(Vec<ParticleEmitter2>),
    RibbonEmitters(Vec<RibbonEmitter>),
    EventObjects(Vec<EventObject>),
    Cameras(Vec<Camera>),
    CollisionShapes(Vec<CollisionShape>),
}

impl Chunk {
    /// Number of records held
    pub fn len(&self) -> usize {
        match self {
            Self::Version(_) | Self::Model(_) => 1,
            Self::Sequences(v) => v.len(),
            Self::GlobalSequences(v) => v.len(),
            Self::Textures(v) => v.len(),
            Self::Materials(v) => v.len(),
            Self::TextureAnimations(v) => v.len(),
            Self::Geosets(v) => v.len(),
            Self::GeosetAnimations(v) => v.len(),
            Self::Bones(v) => v.len(),
            Self::Lights(v) => v.len(),
            Self::Helpers(v) => v.len(),
            Self::Attachments(v) => v.len(),
            Self::PivotPoints(v) => v.len(),
            Self::ParticleEmitters(v) => v.len(),
            Self::ParticleEmitters2(v) => v.len(),
            Self::RibbonEmitters(v) => v.len(),
            Self::EventObjects(v) => v.len(),
            Self::Cameras(v) => v.len(),
            Self::CollisionShapes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Location of a chunk inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    /// Offset of the payload, just past the 8-byte header
    pub offset: usize,
    pub size: usize,
}

impl ChunkHeader {
    pub const SIZE: usize = 8;

    /// Read a header and check that its payload fits in the buffer
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let id = cursor.read_tag()?;
        let size = cursor.read_u32()? as usize;
        if size > cursor.remaining() {
            return Err(MdxError::ChunkSizeMismatch {
                tag: id,
                declared: size,
                consumed: cursor.remaining(),
            });
        }
        Ok(Self {
            id,
            offset: cursor.position(),
            size,
        })
    }
}

/// Parser for MDX files
#[derive(Debug, Clone, Copy, Default)]
pub struct MdxParser;

impl MdxParser {
    pub fn new() -> Self {
        Self
    }

    fn read_magic(cursor: &mut ByteCursor<'_>) -> Result<()> {
        let magic = cursor.read_tag().map_err(|_| MdxError::InvalidMagic {
            expected: ChunkId::MDLX.to_string(),
            actual: "<truncated>".to_string(),
        })?;
        if magic != ChunkId::MDLX {
            return Err(MdxError::InvalidMagic {
                expected: ChunkId::MDLX.to_string(),
                actual: magic.to_string(),
            });
        }
        Ok(())
    }

    /// List chunk headers without decoding payloads
    pub fn read_chunk_headers(&self, data: &[u8]) -> Result<Vec<ChunkHeader>> {
        let mut cursor = ByteCursor::new(data);
        Self::read_magic(&mut cursor)?;

        let mut headers = Vec::new();
        while !cursor.is_empty() {
            let header = ChunkHeader::read(&mut cursor)?;
            cursor.skip(header.size)?;
            headers.push(header);
        }
        Ok(headers)
    }

    /// Parse a complete MDX buffer
    pub fn parse(&self, data: &[u8]) -> Result<MdxFile> {
        let mut cursor = ByteCursor::new(data);
        Self::read_magic(&mut cursor)?;

        let mut nodes = NodeRegistry::new();
        let mut chunks = BTreeMap::new();
        let mut headers = Vec::new();

        while !cursor.is_empty() {
            let header = ChunkHeader::read(&mut cursor)?;
            let mut body = cursor.sub_cursor(header.size)?;
            headers.push(header);

            let Some(kind) = ChunkKind::from_id(header.id) else {
                log::warn!(
                    "Skipping unknown chunk '{}' ({} bytes at {:#x})",
                    header.id,
                    header.size,
                    header.offset
                );
                continue;
            };

            let chunk = Self::read_chunk(kind, header, &mut body, &mut nodes)?;
            if !body.is_empty() {
                return Err(MdxError::ChunkSizeMismatch {
                    tag: header.id,
                    declared: header.size,
                    consumed: header.size - body.remaining(),
                });
            }

            log::debug!(
                "Parsed {} chunk: {} records, {} bytes",
                header.id,
                chunk.len(),
                header.size
            );

            if chunks.insert(header.id, chunk).is_some() {
                log::warn!("Chunk '{}' appears more than once; keeping the last", header.id);
            }
        }

        Ok(MdxFile {
            chunks,
            nodes,
            headers,
        })
    }

    fn read_chunk(
        kind: ChunkKind,
        header: ChunkHeader,
        body: &mut ByteCursor<'_>,
        nodes: &mut NodeRegistry,
    ) -> Result<Chunk> {
        let tag = header.id;
        let chunk = match kind {
            ChunkKind::Version => Chunk::Version(read_single(tag, body)?),
            ChunkKind::Model => Chunk::Model(read_single(tag, body)?),
            ChunkKind::Sequences => Chunk::Sequences(read_fixed(tag, body)?),
            ChunkKind::GlobalSequences => Chunk::GlobalSequences(read_fixed(tag, body)?),
            ChunkKind::Textures => Chunk::Textures(read_fixed(tag, body)?),
            ChunkKind::PivotPoints => Chunk::PivotPoints(read_fixed(tag, body)?),
            ChunkKind::Materials => Chunk::Materials(read_variable(tag, body, nodes)?),
            ChunkKind::TextureAnimations => {
                Chunk::TextureAnimations(read_variable(tag, body, nodes)?)
            }
            ChunkKind::Geosets => Chunk::Geosets(read_variable(tag, body, nodes)?),
            ChunkKind::GeosetAnimations => {
                Chunk::GeosetAnimations(read_variable(tag, body, nodes)?)
            }
            ChunkKind::Bones => Chunk::Bones(read_variable(tag, body, nodes)?),
            ChunkKind::Lights => Chunk::Lights(read_variable(tag, body, nodes)?),
            ChunkKind::Helpers => Chunk::Helpers(read_variable(tag, body, nodes)?),
            ChunkKind::Attachments => Chunk::Attachments(read_variable(tag, body, nodes)?),
            ChunkKind::ParticleEmitters => {
                Chunk::ParticleEmitters(read_variable(tag, body, nodes)?)
            }
            ChunkKind::ParticleEmitters2 => {
                Chunk::ParticleEmitters2(read_variable(tag, body, nodes)?)
            }
            ChunkKind::RibbonEmitters => Chunk::RibbonEmitters(read_variable(tag, body, nodes)?),
            ChunkKind::EventObjects => Chunk::EventObjects(read_variable(tag, body, nodes)?),
            ChunkKind::Cameras => Chunk::Cameras(read_variable(tag, body, nodes)?),
            ChunkKind::CollisionShapes => {
                Chunk::CollisionShapes(read_variable(tag, body, nodes)?)
            }
        };
        Ok(chunk)
    }
}

fn read_single<R: FixedSizeRecord>(tag: ChunkId, body: &mut ByteCursor<'_>) -> Result<R> {
    if body.remaining() != R::SIZE {
        return Err(MdxError::ChunkSizeMismatch {
            tag,
            declared: body.remaining(),
            consumed: R::SIZE,
        });
    }
    R::read(body)
}

fn read_fixed<R: FixedSizeRecord>(tag: ChunkId, body: &mut ByteCursor<'_>) -> Result<Vec<R>> {
    let size = body.remaining();
    if size % R::SIZE != 0 {
        return Err(MdxError::ChunkSizeMismatch {
            tag,
            declared: size,
            consumed: size - size % R::SIZE,
        });
    }

    let count = size / R::SIZE;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(R::read(body)?);
    }
    Ok(records)
}

fn read_variable<R: ChunkRecord>(
    tag: ChunkId,
    body: &mut ByteCursor<'_>,
    nodes: &mut NodeRegistry,
) -> Result<Vec<R>> {
    let mut records = Vec::new();

    while !body.is_empty() {
        let start = body.position();
        let (record, reported) = R::read(body, nodes)?;
        let consumed = body.position() - start;

        if consumed > reported {
            return Err(MdxError::ChunkSizeMismatch {
                tag,
                declared: reported,
                consumed,
            });
        }
        if consumed < reported {
            let extra = reported - consumed;
            if extra > body.remaining() {
                return Err(MdxError::ChunkSizeMismatch {
                    tag,
                    declared: reported,
                    consumed: consumed + body.remaining(),
                });
            }
            log::debug!(
                "Skipping {extra} trailing bytes of '{tag}' record {} at {start:#x}",
                records.len()
            );
            body.skip(extra)?;
        }

        log::trace!("'{tag}' record {} at {start:#x}: {reported} bytes", records.len());
        records.push(record);
    }

    Ok(records)
}

/// A parsed MDX file: decoded chunks keyed by tag plus the node registry
#[derive(Debug, Clone, PartialEq)]
pub struct MdxFile {
    chunks: BTreeMap<ChunkId, Chunk>,
    nodes: NodeRegistry,
    headers: Vec<ChunkHeader>,
}

macro_rules! chunk_accessors {
    ($($(#[$doc:meta])* $name:ident: $id:ident => $variant:ident($ty:ty);)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> &[$ty] {
                match self.chunks.get(&ChunkId::$id) {
                    Some(Chunk::$variant(records)) => records,
                    _ => &[],
                }
            }
        )*
    };
}

impl MdxFile {
    pub fn parse(data: &[u8]) -> Result<Self> {
        MdxParser::new().parse(data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> {
        self.chunks.iter().map(|(id, chunk)| (*id, chunk))
    }

    /// Every chunk header in file order, including skipped ones
    pub fn headers(&self) -> &[ChunkHeader] {
        &self.headers
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn version(&self) -> Option<u32> {
        match self.chunks.get(&ChunkId::VERS) {
            Some(Chunk::Version(v)) => Some(v.0),
            _ => None,
        }
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        match self.chunks.get(&ChunkId::MODL) {
            Some(Chunk::Model(info)) => Some(info),
            _ => None,
        }
    }

    /// Global sequence durations in file order
    pub fn global_sequence_durations(&self) -> Vec<u32> {
        self.global_sequences().iter().map(|g| g.duration).collect()
    }

    chunk_accessors! {
        sequences: SEQS => Sequences(Sequence);
        global_sequences: GLBS => GlobalSequences(GlobalSequence);
        textures: TEXS => Textures(Texture);
        materials: MTLS => Materials(Material);
        texture_animations: TXAN => TextureAnimations(TextureAnimation);
        geosets: GEOS => Geosets(Geoset);
        geoset_animations: GEOA => GeosetAnimations(GeosetAnimation);
        bones: BONE => Bones(Bone);
        lights: LITE => Lights(Light);
        helpers: HELP => Helpers(Helper);
        attachments: ATCH => Attachments(Attachment);
        /// Pivots, indexed by node object id
        pivot_points: PIVT => PivotPoints(PivotPoint);
        particle_emitters: PREM => ParticleEmitters(ParticleEmitter);
        particle_emitters2: PRE2 => ParticleEmitters2(ParticleEmitter2);
        ribbon_emitters: RIBB => RibbonEmitters(RibbonEmitter);
        event_objects: EVTS => EventObjects(EventObject);
        cameras: CAMS => Cameras(Camera);
        collision_shapes: CLID => CollisionShapes(CollisionShape);
    }
}
