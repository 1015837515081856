//! Particle emitter runtime state

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};
use rand::Rng;

use super::{SPAWN_VISIBILITY_THRESHOLD, SpawnAccumulator};
use crate::chunk_id::ChunkId;
use crate::chunks::NodeIndex;
use crate::model::MdxModel;
use crate::skeleton::{RuntimeNode, Skeleton};
use crate::track::{SampleTime, TrackContainer, tags};

/// Upper bound on the particle pool of a single emitter
pub const MAX_POOL_SIZE: usize = 1 << 16;

/// Which emitter record drives a runtime emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleSource {
    /// Index into `PREM`
    Model(usize),
    /// Index into `PRE2`
    Billboard(usize),
}

/// Emitter values sampled for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EmissionParams {
    visibility: f32,
    emission_rate: f32,
    speed: f32,
    /// Relative speed jitter
    variation: f32,
    latitude: f32,
    gravity: f32,
    lifespan: f32,
}

impl ParticleSource {
    fn node(self, model: &MdxModel) -> Option<NodeIndex> {
        match self {
            Self::Model(i) => model.particle_emitters().get(i).map(|e| e.node),
            Self::Billboard(i) => model.particle_emitters2().get(i).map(|e| e.node),
        }
    }

    /// Pool size for the emitter
    ///
    /// With an emission rate track the largest keyframe value is used with
    /// twice the lifespan worth of headroom.
    fn capacity(self, model: &MdxModel) -> Option<usize> {
        let (tracks, rate_tag, rate, lifespan) = match self {
            Self::Model(i) => {
                let e = model.particle_emitters().get(i)?;
                (&e.tracks, tags::KPEE, e.emission_rate, e.lifespan)
            }
            Self::Billboard(i) => {
                let e = model.particle_emitters2().get(i)?;
                (&e.tracks, tags::KP2E, e.emission_rate, e.lifespan)
            }
        };
        Some(pool_capacity(
            rate_track_max(tracks, rate_tag),
            rate,
            lifespan,
        ))
    }

    fn params(self, model: &MdxModel, time: &SampleTime<'_>) -> EmissionParams {
        match self {
            Self::Model(i) => model
                .particle_emitters()
                .get(i)
                .map(|e| EmissionParams {
                    visibility: e.visibility(time),
                    emission_rate: e.emission_rate(time),
                    speed: e.speed(time),
                    variation: 0.0,
                    latitude: e.latitude(time),
                    gravity: e.gravity(time),
                    lifespan: e.lifespan(time),
                })
                .unwrap_or_default(),
            Self::Billboard(i) => model
                .particle_emitters2()
                .get(i)
                .map(|e| EmissionParams {
                    visibility: e.visibility(time),
                    emission_rate: e.emission_rate(time),
                    speed: e.speed(time),
                    variation: e.variation(time),
                    latitude: e.latitude(time),
                    gravity: e.gravity(time),
                    lifespan: e.lifespan,
                })
                .unwrap_or_default(),
        }
    }
}

fn rate_track_max(tracks: &TrackContainer, tag: ChunkId) -> Option<f32> {
    tracks
        .get::<f32>(tag)
        .map(|track| track.max_value().unwrap_or(0.0).max(0.0))
}

fn pool_capacity(rate_track_max: Option<f32>, emission_rate: f32, lifespan: f32) -> usize {
    let lifespan = lifespan.ceil();
    let count = match rate_track_max {
        Some(biggest) => (biggest * lifespan * 2.0).round(),
        None => (emission_rate * lifespan).round(),
    };
    if !count.is_finite() || count <= 0.0 {
        return 0;
    }
    let count = count as usize;
    if count > MAX_POOL_SIZE {
        log::warn!("Particle pool of {count} clamped to {MAX_POOL_SIZE}");
        return MAX_POOL_SIZE;
    }
    count
}

/// Uniform sample from `[-half_width, half_width]`, or 0 for an empty range
fn spread<R: Rng + ?Sized>(rng: &mut R, half_width: f32) -> f32 {
    let half_width = half_width.abs();
    if half_width.is_finite() && half_width > 0.0 {
        rng.random_range(-half_width..=half_width)
    } else {
        0.0
    }
}

/// One pooled particle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Downward acceleration along world Z
    pub gravity: f32,
    /// Spin about Z, radians
    pub orientation: f32,
    /// Seconds left to live
    pub health: f32,
    alive: bool,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn spawn<R: Rng + ?Sized>(&mut self, node: &RuntimeNode, params: &EmissionParams, rng: &mut R) {
        let azimuth = rng.random_range(-PI..PI);
        let tilt = spread(rng, params.latitude);
        let local = Quat::from_rotation_z(azimuth) * Quat::from_rotation_y(tilt) * Vec3::Z;
        let direction = node.world_matrix.transform_vector3(local).normalize_or_zero();

        let speed = params.speed * (1.0 + spread(rng, params.variation));

        self.position = node.world_matrix.transform_point3(node.pivot);
        self.velocity = direction * speed * node.scale;
        self.gravity = params.gravity * node.scale.z;
        self.orientation = rng.random_range(0.0..TAU);
        self.health = params.lifespan;
        self.alive = true;
    }

    fn advance(&mut self, dt: f32) {
        self.health -= dt;
        self.velocity.z -= self.gravity * dt;
        self.position += self.velocity * dt;
    }
}

/// A fixed-capacity particle pool bound to one emitter record
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    source: ParticleSource,
    node: NodeIndex,
    particles: Vec<Particle>,
    /// Indices of dead particles; popped from the back
    free: Vec<usize>,
    accumulator: SpawnAccumulator,
}

impl ParticleEmitter {
    /// Create the runtime for `source`, or `None` if the record does not
    /// exist in `model`
    pub fn new(model: &MdxModel, source: ParticleSource) -> Option<Self> {
        let node = source.node(model)?;
        let capacity = source.capacity(model)?;
        log::trace!("Particle emitter {source:?}: pool of {capacity}");

        Some(Self {
            source,
            node,
            particles: vec![Particle::default(); capacity],
            free: (0..capacity).rev().collect(),
            accumulator: SpawnAccumulator::default(),
        })
    }

    pub fn source(&self) -> ParticleSource {
        self.source
    }

    pub fn node(&self) -> NodeIndex {
        self.node
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn live_count(&self) -> usize {
        self.particles.len() - self.free.len()
    }

    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.alive)
    }

    /// Kill every particle
    pub fn clear(&mut self) {
        for particle in &mut self.particles {
            particle.alive = false;
        }
        self.free = (0..self.particles.len()).rev().collect();
        self.accumulator = SpawnAccumulator::default();
    }

    /// Advance live particles by `dt` seconds, retire the expired ones and
    /// spawn new ones when `allow_create` is set
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        model: &MdxModel,
        skeleton: &Skeleton,
        time: &SampleTime<'_>,
        allow_create: bool,
        rng: &mut R,
    ) {
        for (index, particle) in self.particles.iter_mut().enumerate() {
            if !particle.alive {
                continue;
            }
            particle.advance(dt);
            if particle.health <= 0.0 {
                particle.alive = false;
                self.free.push(index);
            }
        }

        if !allow_create {
            return;
        }
        let params = self.source.params(model, time);
        if params.visibility <= SPAWN_VISIBILITY_THRESHOLD {
            return;
        }
        let amount = self.accumulator.advance(params.emission_rate, dt);
        if amount == 0 {
            return;
        }
        let Some(node) = skeleton.node(self.node) else {
            return;
        };

        for _ in 0..amount {
            let Some(index) = self.free.pop() else {
                break;
            };
            self.particles[index].spawn(node, &params, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::NodeFlags;
    use glam::Mat4;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn params() -> EmissionParams {
        EmissionParams {
            visibility: 1.0,
            emission_rate: 10.0,
            speed: 2.0,
            variation: 0.0,
            latitude: 0.0,
            gravity: 4.0,
            lifespan: 1.5,
        }
    }

    fn node_at(translation: Vec3, scale: f32) -> RuntimeNode {
        let mut node = RuntimeNode::new(0, NodeFlags::empty(), Vec3::new(1.0, 0.0, 0.0));
        node.world_matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::IDENTITY,
            translation,
        );
        node.scale = Vec3::splat(scale);
        node
    }

    #[test]
    fn test_pool_capacity() {
        assert_eq!(pool_capacity(None, 10.0, 1.5), 20);
        assert_eq!(pool_capacity(Some(12.0), 10.0, 1.5), 48);
        assert_eq!(pool_capacity(None, -3.0, 1.0), 0);
        assert_eq!(pool_capacity(None, f32::INFINITY, 1.0), 0);
        assert_eq!(pool_capacity(Some(1.0e9), 0.0, 1.0), MAX_POOL_SIZE);
    }

    #[test]
    fn test_spawn_straight_up() {
        let mut rng = StdRng::seed_from_u64(1);
        let node = node_at(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let mut particle = Particle::default();
        particle.spawn(&node, &params(), &mut rng);

        assert!(particle.is_alive());
        assert_eq!(particle.position, Vec3::new(2.0, 0.0, 10.0));
        // Zero latitude leaves +Z regardless of azimuth
        assert!((particle.velocity - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
        assert_eq!(particle.gravity, 8.0);
        assert_eq!(particle.health, 1.5);
        assert!((0.0..TAU).contains(&particle.orientation));
    }

    #[test]
    fn test_spawn_stays_in_cone() {
        let mut rng = StdRng::seed_from_u64(99);
        let node = node_at(Vec3::ZERO, 1.0);
        let mut p = params();
        p.latitude = 0.5;
        for _ in 0..64 {
            let mut particle = Particle::default();
            particle.spawn(&node, &p, &mut rng);
            let angle = particle.velocity.normalize().angle_between(Vec3::Z);
            assert!(angle <= 0.5 + 1e-4, "angle {angle}");
        }
    }

    #[test]
    fn test_advance_applies_gravity() {
        let mut particle = Particle {
            velocity: Vec3::new(1.0, 0.0, 0.0),
            gravity: 2.0,
            health: 1.0,
            alive: true,
            ..Default::default()
        };
        particle.advance(0.5);
        assert_eq!(particle.health, 0.5);
        assert_eq!(particle.velocity, Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(particle.position, Vec3::new(0.5, 0.0, -0.5));
    }

    #[test]
    fn test_spread_empty_range() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(spread(&mut rng, 0.0), 0.0);
        assert_eq!(spread(&mut rng, f32::NAN), 0.0);
        let v = spread(&mut rng, -0.25);
        assert!((-0.25..=0.25).contains(&v));
    }
}
