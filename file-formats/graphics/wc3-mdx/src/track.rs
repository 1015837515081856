//! Keyframe tracks and their sampling
//!
//! Every animatable record carries a [`TrackContainer`] that maps a
//! 4-byte track tag to a typed [`Track`]. Sampling is a single generic
//! routine over [`TrackValue`], so bone transforms, layer alpha, emitter
//! rates and camera targets all share the same code path.

use std::collections::BTreeMap;

use glam::{Vec3, Vec4};

use crate::chunk_id::ChunkId;
use crate::cursor::ByteCursor;
use crate::error::{MdxError, Result};

/// Track tags, grouped by the record kind that owns them
pub mod tags {
    use crate::chunk_id::ChunkId;

    // Layer
    pub const KMTF: ChunkId = ChunkId::new(*b"KMTF");
    pub const KMTA: ChunkId = ChunkId::new(*b"KMTA");
    // Texture animation
    pub const KTAT: ChunkId = ChunkId::new(*b"KTAT");
    pub const KTAR: ChunkId = ChunkId::new(*b"KTAR");
    pub const KTAS: ChunkId = ChunkId::new(*b"KTAS");
    // Geoset animation
    pub const KGAO: ChunkId = ChunkId::new(*b"KGAO");
    pub const KGAC: ChunkId = ChunkId::new(*b"KGAC");
    // Light
    pub const KLAS: ChunkId = ChunkId::new(*b"KLAS");
    pub const KLAE: ChunkId = ChunkId::new(*b"KLAE");
    pub const KLAC: ChunkId = ChunkId::new(*b"KLAC");
    pub const KLAI: ChunkId = ChunkId::new(*b"KLAI");
    pub const KLBI: ChunkId = ChunkId::new(*b"KLBI");
    pub const KLBC: ChunkId = ChunkId::new(*b"KLBC");
    pub const KLAV: ChunkId = ChunkId::new(*b"KLAV");
    // Attachment
    pub const KATV: ChunkId = ChunkId::new(*b"KATV");
    // Particle emitter
    pub const KPEE: ChunkId = ChunkId::new(*b"KPEE");
    pub const KPEG: ChunkId = ChunkId::new(*b"KPEG");
    pub const KPLN: ChunkId = ChunkId::new(*b"KPLN");
    pub const KPLT: ChunkId = ChunkId::new(*b"KPLT");
    pub const KPEL: ChunkId = ChunkId::new(*b"KPEL");
    pub const KPES: ChunkId = ChunkId::new(*b"KPES");
    pub const KPEV: ChunkId = ChunkId::new(*b"KPEV");
    // Particle emitter 2
    pub const KP2S: ChunkId = ChunkId::new(*b"KP2S");
    pub const KP2R: ChunkId = ChunkId::new(*b"KP2R");
    pub const KP2L: ChunkId = ChunkId::new(*b"KP2L");
    pub const KP2G: ChunkId = ChunkId::new(*b"KP2G");
    pub const KP2E: ChunkId = ChunkId::new(*b"KP2E");
    pub const KP2N: ChunkId = ChunkId::new(*b"KP2N");
    pub const KP2W: ChunkId = ChunkId::new(*b"KP2W");
    pub const KP2V: ChunkId = ChunkId::new(*b"KP2V");
    // Ribbon emitter
    pub const KRHA: ChunkId = ChunkId::new(*b"KRHA");
    pub const KRHB: ChunkId = ChunkId::new(*b"KRHB");
    pub const KRAL: ChunkId = ChunkId::new(*b"KRAL");
    pub const KRCO: ChunkId = ChunkId::new(*b"KRCO");
    pub const KRTX: ChunkId = ChunkId::new(*b"KRTX");
    pub const KRVS: ChunkId = ChunkId::new(*b"KRVS");
    // Camera
    pub const KCTR: ChunkId = ChunkId::new(*b"KCTR");
    pub const KTTR: ChunkId = ChunkId::new(*b"KTTR");
    pub const KCRL: ChunkId = ChunkId::new(*b"KCRL");
    // Node
    pub const KGTR: ChunkId = ChunkId::new(*b"KGTR");
    pub const KGRT: ChunkId = ChunkId::new(*b"KGRT");
    pub const KGSC: ChunkId = ChunkId::new(*b"KGSC");
}

/// Value layout of a track, determined by its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Uint,
    Vec3,
    Vec4,
}

impl ValueKind {
    /// Look up the value layout for a track tag
    pub fn for_tag(tag: ChunkId) -> Option<Self> {
        use tags::*;
        let kind = match tag {
            KMTF | KRTX | KCRL => Self::Uint,
            KGRT | KTAR => Self::Vec4,
            KGTR | KGSC | KTAT | KTAS | KGAC | KLAC | KLBC | KRCO | KCTR | KTTR => Self::Vec3,
            KMTA | KGAO | KLAS | KLAE | KLAI | KLBI | KLAV | KATV | KPEE | KPEG | KPLN | KPLT
            | KPEL | KPES | KPEV | KP2S | KP2R | KP2L | KP2G | KP2E | KP2N | KP2W | KP2V | KRHA
            | KRHB | KRAL | KRVS => Self::Float,
            _ => return None,
        };
        Some(kind)
    }
}

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Step function: hold the earlier keyframe
    None,
    #[default]
    Linear,
    /// Cubic Hermite using the stored tangents
    Hermite,
    /// Stored as Bezier, evaluated with the Hermite basis
    Bezier,
}

impl Interpolation {
    pub fn from_raw(value: u32) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Linear,
            2 => Self::Hermite,
            3 => Self::Bezier,
            other => {
                log::debug!("Interpolation type {other} treated as Hermite");
                Self::Hermite
            }
        }
    }

    /// Whether keyframes carry in/out tangents
    pub fn has_tangents(self) -> bool {
        matches!(self, Self::Hermite | Self::Bezier)
    }
}

/// One keyframe of a track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub frame: i32,
    pub value: T,
    /// `(in_tangent, out_tangent)`, present only for Hermite/Bezier tracks
    pub tangents: Option<(T, T)>,
}

impl<T> Keyframe<T> {
    pub fn new(frame: i32, value: T) -> Self {
        Self {
            frame,
            value,
            tangents: None,
        }
    }
}

/// The animation clock used when sampling
#[derive(Debug, Clone, Copy)]
pub struct SampleTime<'a> {
    /// Frame already clamped into the active sequence window
    pub frame: i32,
    /// Monotonic counter driving global sequences
    pub counter: u32,
    /// Global sequence durations
    pub global_sequences: &'a [u32],
}

impl<'a> SampleTime<'a> {
    pub fn new(frame: i32, counter: u32, global_sequences: &'a [u32]) -> Self {
        Self {
            frame,
            counter,
            global_sequences,
        }
    }

    /// A clock at `frame` with no global sequences
    pub fn at_frame(frame: i32) -> SampleTime<'static> {
        SampleTime {
            frame,
            counter: 0,
            global_sequences: &[],
        }
    }

    /// Effective clock for a track bound to `global_sequence_id`
    pub fn clock(&self, global_sequence_id: Option<u32>) -> i64 {
        let Some(id) = global_sequence_id else {
            return i64::from(self.frame);
        };
        match self.global_sequences.get(id as usize) {
            Some(0) => 0,
            Some(&duration) => i64::from(self.counter % duration),
            None => i64::from(self.frame),
        }
    }
}

/// A value type that tracks can hold
pub trait TrackValue: Copy + std::fmt::Debug {
    /// Number of 32-bit components per value
    const COMPONENTS: usize;

    fn zero() -> Self;

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self>;

    fn lerp(a: Self, b: Self, t: f32) -> Self;

    /// Cubic Hermite between `v0` and `v1` with tangents `m0` and `m1`
    fn hermite(v0: Self, m0: Self, m1: Self, v1: Self, t: f32) -> Self;

    fn from_data(data: &TrackData) -> Option<&Track<Self>>;

    fn into_data(track: Track<Self>) -> TrackData;
}

/// Standard Hermite basis `(h00, h10, h01, h11)`
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    (
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    )
}

impl TrackValue for f32 {
    const COMPONENTS: usize = 1;

    fn zero() -> Self {
        0.0
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        cursor.read_f32()
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }

    fn hermite(v0: Self, m0: Self, m1: Self, v1: Self, t: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(t);
        h00 * v0 + h10 * m0 + h01 * v1 + h11 * m1
    }

    fn from_data(data: &TrackData) -> Option<&Track<Self>> {
        match data {
            TrackData::Float(track) => Some(track),
            _ => None,
        }
    }

    fn into_data(track: Track<Self>) -> TrackData {
        TrackData::Float(track)
    }
}

impl TrackValue for u32 {
    const COMPONENTS: usize = 1;

    fn zero() -> Self {
        0
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        cursor.read_u32()
    }

    // Integer tracks blend in floating point and truncate
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        <f32 as TrackValue>::lerp(a as f32, b as f32, t) as u32
    }

    fn hermite(v0: Self, m0: Self, m1: Self, v1: Self, t: f32) -> Self {
        <f32 as TrackValue>::hermite(v0 as f32, m0 as f32, m1 as f32, v1 as f32, t) as u32
    }

    fn from_data(data: &TrackData) -> Option<&Track<Self>> {
        match data {
            TrackData::Uint(track) => Some(track),
            _ => None,
        }
    }

    fn into_data(track: Track<Self>) -> TrackData {
        TrackData::Uint(track)
    }
}

impl TrackValue for Vec3 {
    const COMPONENTS: usize = 3;

    fn zero() -> Self {
        Self::ZERO
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        cursor.read_vec3()
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }

    fn hermite(v0: Self, m0: Self, m1: Self, v1: Self, t: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(t);
        v0 * h00 + m0 * h10 + v1 * h01 + m1 * h11
    }

    fn from_data(data: &TrackData) -> Option<&Track<Self>> {
        match data {
            TrackData::Vec3(track) => Some(track),
            _ => None,
        }
    }

    fn into_data(track: Track<Self>) -> TrackData {
        TrackData::Vec3(track)
    }
}

// Rotation tracks land here too; blending stays component-wise and
// callers normalize into a quaternion.
impl TrackValue for Vec4 {
    const COMPONENTS: usize = 4;

    fn zero() -> Self {
        Self::ZERO
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        cursor.read_vec4()
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }

    fn hermite(v0: Self, m0: Self, m1: Self, v1: Self, t: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(t);
        v0 * h00 + m0 * h10 + v1 * h01 + m1 * h11
    }

    fn from_data(data: &TrackData) -> Option<&Track<Self>> {
        match data {
            TrackData::Vec4(track) => Some(track),
            _ => None,
        }
    }

    fn into_data(track: Track<Self>) -> TrackData {
        TrackData::Vec4(track)
    }
}

/// A typed keyframe track
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T> {
    pub interpolation: Interpolation,
    pub global_sequence_id: Option<u32>,
    pub keyframes: Vec<Keyframe<T>>,
}

impl<T: TrackValue> Track<T> {
    pub fn new(interpolation: Interpolation, keyframes: Vec<Keyframe<T>>) -> Self {
        Self {
            interpolation,
            global_sequence_id: None,
            keyframes,
        }
    }

    pub fn with_global_sequence(mut self, id: u32) -> Self {
        self.global_sequence_id = Some(id);
        self
    }

    /// Read the keyframe body of a track whose tag was already consumed
    fn read_body(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let count = cursor.read_u32()? as usize;
        let interpolation = Interpolation::from_raw(cursor.read_u32()?);
        let global_sequence_id = u32::try_from(cursor.read_i32()?).ok();

        let values_per_key = if interpolation.has_tangents() { 3 } else { 1 };
        let key_size = 4 + T::COMPONENTS * 4 * values_per_key;
        if count.saturating_mul(key_size) > cursor.remaining() {
            return Err(MdxError::UnexpectedEof {
                offset: cursor.position(),
                needed: count.saturating_mul(key_size),
                remaining: cursor.remaining(),
            });
        }

        let mut keyframes = Vec::with_capacity(count);
        for _ in 0..count {
            let frame = cursor.read_i32()?;
            let value = T::read(cursor)?;
            let tangents = if interpolation.has_tangents() {
                Some((T::read(cursor)?, T::read(cursor)?))
            } else {
                None
            };
            keyframes.push(Keyframe {
                frame,
                value,
                tangents,
            });
        }

        if !keyframes.is_sorted_by_key(|k| k.frame) {
            log::debug!("Sorting out-of-order keyframes");
            keyframes.sort_by_key(|k| k.frame);
        }

        Ok(Self {
            interpolation,
            global_sequence_id,
            keyframes,
        })
    }

    /// Sample this track at `time`
    ///
    /// Total over its inputs: empty tracks yield `default`, a single
    /// keyframe is returned as-is, and clocks outside the keyframe range
    /// clamp to the first or last value.
    pub fn sample(&self, time: &SampleTime<'_>, default: T) -> T {
        let keys = &self.keyframes;
        match keys.len() {
            0 => return default,
            1 => return keys[0].value,
            _ => {}
        }

        let clock = time.clock(self.global_sequence_id);
        let first = &keys[0];
        let last = &keys[keys.len() - 1];
        if clock <= i64::from(first.frame) {
            return first.value;
        }
        if clock >= i64::from(last.frame) {
            return last.value;
        }

        // First keyframe strictly after the clock; the one before it is k0
        let upper = keys.partition_point(|k| i64::from(k.frame) <= clock);
        let k0 = &keys[upper - 1];
        let k1 = &keys[upper];

        let span = i64::from(k1.frame) - i64::from(k0.frame);
        let t = if span == 0 {
            0.0
        } else {
            (clock - i64::from(k0.frame)) as f32 / span as f32
        };

        match self.interpolation {
            Interpolation::None => k0.value,
            Interpolation::Linear => T::lerp(k0.value, k1.value, t),
            Interpolation::Hermite | Interpolation::Bezier => {
                let out_tangent = k0.tangents.map_or_else(T::zero, |(_, out)| out);
                let in_tangent = k1.tangents.map_or_else(T::zero, |(tan_in, _)| tan_in);
                T::hermite(k0.value, out_tangent, in_tangent, k1.value, t)
            }
        }
    }
}

impl Track<f32> {
    /// Largest keyframe value, if any
    pub fn max_value(&self) -> Option<f32> {
        self.keyframes.iter().map(|k| k.value).reduce(f32::max)
    }
}

/// A track of any supported value type
#[derive(Debug, Clone, PartialEq)]
pub enum TrackData {
    Float(Track<f32>),
    Uint(Track<u32>),
    Vec3(Track<Vec3>),
    Vec4(Track<Vec4>),
}

impl TrackData {
    pub fn keyframe_count(&self) -> usize {
        match self {
            Self::Float(t) => t.keyframes.len(),
            Self::Uint(t) => t.keyframes.len(),
            Self::Vec3(t) => t.keyframes.len(),
            Self::Vec4(t) => t.keyframes.len(),
        }
    }

    pub fn global_sequence_id(&self) -> Option<u32> {
        match self {
            Self::Float(t) => t.global_sequence_id,
            Self::Uint(t) => t.global_sequence_id,
            Self::Vec3(t) => t.global_sequence_id,
            Self::Vec4(t) => t.global_sequence_id,
        }
    }
}

/// All tracks attached to one animatable record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackContainer {
    tracks: BTreeMap<ChunkId, TrackData>,
}

impl TrackContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read tracks until exactly `len` bytes have been consumed
    ///
    /// A track that would extend past `len` is a format error, as is any
    /// tag whose value layout is unknown.
    pub fn read(cursor: &mut ByteCursor<'_>, len: usize) -> Result<Self> {
        let mut sub = cursor.sub_cursor(len)?;
        let mut tracks = BTreeMap::new();

        while !sub.is_empty() {
            let offset = sub.position();
            let tag = sub.read_tag()?;
            let kind =
                ValueKind::for_tag(tag).ok_or(MdxError::UnknownTrackTag { tag, offset })?;
            let data = match kind {
                ValueKind::Float => TrackData::Float(Track::read_body(&mut sub)?),
                ValueKind::Uint => TrackData::Uint(Track::read_body(&mut sub)?),
                ValueKind::Vec3 => TrackData::Vec3(Track::read_body(&mut sub)?),
                ValueKind::Vec4 => TrackData::Vec4(Track::read_body(&mut sub)?),
            };
            log::trace!(
                "Track {tag}: {} keyframes at {offset:#x}",
                data.keyframe_count()
            );
            tracks.insert(tag, data);
        }

        Ok(Self { tracks })
    }

    pub fn insert<T: TrackValue>(&mut self, tag: ChunkId, track: Track<T>) {
        self.tracks.insert(tag, T::into_data(track));
    }

    pub fn with<T: TrackValue>(mut self, tag: ChunkId, track: Track<T>) -> Self {
        self.insert(tag, track);
        self
    }

    /// Typed access to a track; `None` if absent or of another value type
    pub fn get<T: TrackValue>(&self, tag: ChunkId) -> Option<&Track<T>> {
        self.tracks.get(&tag).and_then(T::from_data)
    }

    pub fn contains(&self, tag: ChunkId) -> bool {
        self.tracks.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &TrackData)> {
        self.tracks.iter().map(|(tag, data)| (*tag, data))
    }

    /// Sample the track `tag`, or return `default` when there is none
    pub fn sample<T: TrackValue>(&self, tag: ChunkId, time: &SampleTime<'_>, default: T) -> T {
        match self.get::<T>(tag) {
            Some(track) => track.sample(time, default),
            None => default,
        }
    }
}
