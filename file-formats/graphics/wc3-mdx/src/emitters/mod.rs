//! Per-instance particle and ribbon emitter state

mod particle;
mod ribbon;

pub use particle::{MAX_POOL_SIZE, Particle, ParticleEmitter, ParticleSource};
pub use ribbon::{FLOATS_PER_SEGMENT, MAX_SEGMENTS, RibbonEmitter, RibbonSegment};

/// Emitters only spawn while their visibility is above this value
pub const SPAWN_VISIBILITY_THRESHOLD: f32 = 0.75;

/// Fractional spawn counter shared by both emitter kinds
///
/// `rate × dt` is integrated every frame. Once at least one whole unit is
/// available the whole part is handed out and the counter starts over.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SpawnAccumulator {
    pending: f32,
}

impl SpawnAccumulator {
    pub(crate) fn advance(&mut self, rate: f32, dt: f32) -> usize {
        self.pending += rate * dt;
        if !self.pending.is_finite() || self.pending < 0.0 {
            self.pending = 0.0;
            return 0;
        }
        if self.pending < 1.0 {
            return 0;
        }
        let amount = self.pending.floor() as usize;
        self.pending = 0.0;
        amount
    }
}
