use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::track::{SampleTime, TrackContainer, tags};

use super::material::FilterMode;
use super::{ChunkRecord, NodeIndex, NodeRegistry, trailing_len};

/// A `PREM` emitter that spawns copies of another model
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    pub node: NodeIndex,
    pub emission_rate: f32,
    pub gravity: f32,
    pub longitude: f32,
    pub latitude: f32,
    /// Model spawned for each particle
    pub path: String,
    pub lifespan: f32,
    pub speed: f32,
    pub tracks: TrackContainer,
}

impl ParticleEmitter {
    const FIXED_SIZE: usize = 4 + 16 + 260 + 8;

    pub fn emission_rate(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPEE, time, self.emission_rate)
    }

    pub fn gravity(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPEG, time, self.gravity)
    }

    pub fn longitude(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPLN, time, self.longitude)
    }

    pub fn latitude(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPLT, time, self.latitude)
    }

    pub fn lifespan(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPEL, time, self.lifespan)
    }

    pub fn speed(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPES, time, self.speed)
    }

    pub fn visibility(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KPEV, time, 1.0)
    }

    /// Spawned model path with forward slashes and an `.mdx` extension
    pub fn spawn_model_path(&self) -> String {
        let path = self.path.replace('\\', "/").to_lowercase();
        match path.strip_suffix(".mdl") {
            Some(stem) => format!("{stem}.mdx"),
            None => path,
        }
    }
}

impl ChunkRecord for ParticleEmitter {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let (node, node_size) = nodes.read_node(cursor)?;
        let track_len = trailing_len(size, node_size + Self::FIXED_SIZE, "ParticleEmitter", offset)?;

        let emission_rate = cursor.read_f32()?;
        let gravity = cursor.read_f32()?;
        let longitude = cursor.read_f32()?;
        let latitude = cursor.read_f32()?;
        let path = cursor.read_fixed_string(260)?;
        let lifespan = cursor.read_f32()?;
        let speed = cursor.read_f32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                node,
                emission_rate,
                gravity,
                longitude,
                latitude,
                path,
                lifespan,
                speed,
                tracks,
            },
            size,
        ))
    }
}

/// A `PRE2` billboard particle emitter
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter2 {
    pub node: NodeIndex,
    pub speed: f32,
    pub variation: f32,
    pub latitude: f32,
    pub gravity: f32,
    pub lifespan: f32,
    pub emission_rate: f32,
    pub width: f32,
    pub length: f32,
    pub filter_mode: FilterMode,
    pub rows: u32,
    pub columns: u32,
    /// 0 head, 1 tail, 2 both
    pub head_or_tail: u32,
    pub tail_length: f32,
    pub time_middle: f32,
    /// Start, middle and end colors
    pub segment_color: [Vec3; 3],
    pub segment_alpha: [u8; 3],
    pub segment_scaling: [f32; 3],
    pub head_interval: [u32; 3],
    pub head_decay_interval: [u32; 3],
    pub tail_interval: [u32; 3],
    pub tail_decay_interval: [u32; 3],
    pub texture_id: u32,
    pub squirt: u32,
    pub priority_plane: u32,
    pub replaceable_id: u32,
    pub tracks: TrackContainer,
}

impl ParticleEmitter2 {
    const FIXED_SIZE: usize = 175;

    pub fn speed(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2S, time, self.speed)
    }

    pub fn variation(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2R, time, self.variation)
    }

    pub fn latitude(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2L, time, self.latitude)
    }

    pub fn gravity(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2G, time, self.gravity)
    }

    pub fn emission_rate(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2E, time, self.emission_rate)
    }

    pub fn length(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2N, time, self.length)
    }

    pub fn width(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2W, time, self.width)
    }

    pub fn visibility(&self, time: &SampleTime<'_>) -> f32 {
        self.tracks.sample(tags::KP2V, time, 1.0)
    }
}

impl ChunkRecord for ParticleEmitter2 {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let offset = cursor.position();
        let size = cursor.read_u32()? as usize;
        let (node, node_size) = nodes.read_node(cursor)?;
        let track_len =
            trailing_len(size, node_size + Self::FIXED_SIZE, "ParticleEmitter2", offset)?;

        let speed = cursor.read_f32()?;
        let variation = cursor.read_f32()?;
        let latitude = cursor.read_f32()?;
        let gravity = cursor.read_f32()?;
        let lifespan = cursor.read_f32()?;
        let emission_rate = cursor.read_f32()?;
        let width = cursor.read_f32()?;
        let length = cursor.read_f32()?;
        let filter_mode = FilterMode::from_raw(cursor.read_u32()?);
        let rows = cursor.read_u32()?;
        let columns = cursor.read_u32()?;
        let head_or_tail = cursor.read_u32()?;
        let tail_length = cursor.read_f32()?;
        let time_middle = cursor.read_f32()?;
        let segment_color = [cursor.read_vec3()?, cursor.read_vec3()?, cursor.read_vec3()?];
        let segment_alpha = [cursor.read_u8()?, cursor.read_u8()?, cursor.read_u8()?];
        let segment_scaling = cursor.read_f32_array::<3>()?;
        let head_interval = cursor.read_u32_array::<3>()?;
        let head_decay_interval = cursor.read_u32_array::<3>()?;
        let tail_interval = cursor.read_u32_array::<3>()?;
        let tail_decay_interval = cursor.read_u32_array::<3>()?;
        let texture_id = cursor.read_u32()?;
        let squirt = cursor.read_u32()?;
        let priority_plane = cursor.read_u32()?;
        let replaceable_id = cursor.read_u32()?;
        let tracks = TrackContainer::read(cursor, track_len)?;

        Ok((
            Self {
                node,
                speed,
                variation,
                latitude,
                gravity,
                lifespan,
                emission_rate,
                width,
                length,
                filter_mode,
                rows,
                columns,
                head_or_tail,
                tail_length,
                time_middle,
                segment_color,
                segment_alpha,
                segment_scaling,
                head_interval,
                head_decay_interval,
                tail_interval,
                tail_decay_interval,
                texture_id,
                squirt,
                priority_plane,
                replaceable_id,
                tracks,
            },
            size,
        ))
    }
}
