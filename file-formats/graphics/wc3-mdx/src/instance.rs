//! A single animated placement of a shared model

use std::sync::Arc;

use glam::{Mat4, Quat};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::emitters::{ParticleEmitter, ParticleSource, RibbonEmitter};
use crate::error::{MdxError, Result};
use crate::model::{Batch, MdxModel};
use crate::skeleton::Skeleton;
use crate::track::SampleTime;

/// Longest wall-clock step a single update advances, in seconds
pub const MAX_STEP_SECONDS: f32 = 86_400.0;

/// What happens when playback reaches the end of a sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Loop unless the sequence is flagged non-looping
    #[default]
    Auto,
    Always,
    Never,
}

/// Per-instance playback settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceOptions {
    pub loop_mode: LoopMode,
    /// Seed for particle spawn directions
    pub seed: u64,
    pub emitters_enabled: bool,
    /// Playback rate multiplier
    pub speed: f32,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            loop_mode: LoopMode::Auto,
            seed: 0,
            emitters_enabled: true,
            speed: 1.0,
        }
    }
}

impl InstanceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_emitters(mut self, enabled: bool) -> Self {
        self.emitters_enabled = enabled;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Playback state, skeleton and emitters of one model placement
///
/// Frames and the global counter are in milliseconds.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    model: Arc<MdxModel>,
    options: InstanceOptions,
    skeleton: Skeleton,
    particle_emitters: Vec<ParticleEmitter>,
    ribbon_emitters: Vec<RibbonEmitter>,
    rng: StdRng,
    sequence: Option<usize>,
    frame: i64,
    counter: u32,
    /// Set once a non-looping sequence reaches its end
    finished: bool,
    geoset_visible: Vec<bool>,
}

impl ModelInstance {
    pub fn new(model: Arc<MdxModel>) -> Self {
        Self::with_options(model, InstanceOptions::default())
    }

    pub fn with_options(model: Arc<MdxModel>, options: InstanceOptions) -> Self {
        let skeleton = Skeleton::new(&model);

        let particle_emitters = (0..model.particle_emitters().len())
            .map(ParticleSource::Model)
            .chain((0..model.particle_emitters2().len()).map(ParticleSource::Billboard))
            .filter_map(|source| ParticleEmitter::new(&model, source))
            .collect();
        let ribbon_emitters = (0..model.ribbon_emitters().len())
            .filter_map(|i| RibbonEmitter::new(&model, i))
            .collect();
        let geoset_visible = vec![true; model.meshes().len()];

        let mut instance = Self {
            model,
            options,
            skeleton,
            particle_emitters,
            ribbon_emitters,
            rng: StdRng::seed_from_u64(options.seed),
            sequence: None,
            frame: 0,
            counter: 0,
            finished: false,
            geoset_visible,
        };
        instance.refresh(None);
        instance
    }

    pub fn model(&self) -> &Arc<MdxModel> {
        &self.model
    }

    pub fn options(&self) -> &InstanceOptions {
        &self.options
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn particle_emitters(&self) -> &[ParticleEmitter] {
        &self.particle_emitters
    }

    pub fn ribbon_emitters(&self) -> &[RibbonEmitter] {
        &self.ribbon_emitters
    }

    pub fn sequence(&self) -> Option<usize> {
        self.sequence
    }

    pub fn frame(&self) -> i64 {
        self.frame
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether a non-looping sequence has played to its end
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Start playing sequence `index` from its first frame
    pub fn set_sequence(&mut self, index: usize) -> Result<()> {
        let sequence = self.model.sequences().get(index).ok_or_else(|| {
            MdxError::ReferenceError(format!(
                "Sequence {index} does not exist; the model has {}",
                self.model.sequences().len()
            ))
        })?;
        log::debug!("Playing sequence {index} '{}'", sequence.name);

        self.frame = i64::from(sequence.start());
        self.sequence = Some(index);
        self.finished = false;
        self.refresh(None);
        Ok(())
    }

    /// Start playing the sequence called `name`, ignoring ASCII case
    pub fn set_sequence_by_name(&mut self, name: &str) -> Result<()> {
        let index = self.model.find_sequence(name).ok_or_else(|| {
            MdxError::ReferenceError(format!("No sequence named '{name}'"))
        })?;
        self.set_sequence(index)
    }

    /// Stop playback and return to the bind pose
    pub fn clear_sequence(&mut self) {
        self.sequence = None;
        self.frame = 0;
        self.finished = false;
        self.refresh(None);
    }

    /// Show or hide a geoset; returns `false` if it does not exist
    pub fn set_geoset_visible(&mut self, geoset: usize, visible: bool) -> bool {
        match self.geoset_visible.get_mut(geoset) {
            Some(slot) => {
                *slot = visible;
                true
            }
            None => false,
        }
    }

    pub fn is_geoset_visible(&self, geoset: usize) -> bool {
        self.geoset_visible.get(geoset).copied().unwrap_or(false)
    }

    /// The clock at the current playback position
    pub fn sample_time(&self) -> SampleTime<'_> {
        self.model
            .sample_time(self.sequence, self.frame, self.counter)
    }

    /// Advance playback by `dt_seconds` of wall time and re-evaluate the
    /// skeleton and emitters
    ///
    /// `camera` is the camera-to-world rotation used by billboarded nodes.
    pub fn update(&mut self, dt_seconds: f32, camera: Option<Quat>) {
        let dt = dt_seconds * self.options.speed;
        let dt = if dt.is_finite() && dt > 0.0 {
            dt.min(MAX_STEP_SECONDS)
        } else {
            0.0
        };
        let dt_ms = (dt * 1000.0).round() as i64;

        self.counter = self.counter.wrapping_add(dt_ms as u32);
        self.advance_frame(dt_ms);

        let allow_create = self.options.emitters_enabled && !self.finished;
        let time = self
            .model
            .sample_time(self.sequence, self.frame, self.counter);

        self.skeleton.update(&self.model, &time, camera);
        for emitter in &mut self.particle_emitters {
            emitter.update(
                dt,
                &self.model,
                &self.skeleton,
                &time,
                allow_create,
                &mut self.rng,
            );
        }
        for emitter in &mut self.ribbon_emitters {
            emitter.update(dt, &self.model, &self.skeleton, &time, allow_create);
        }
    }

    fn advance_frame(&mut self, dt_ms: i64) {
        let Some(sequence) = self.sequence.and_then(|i| self.model.sequences().get(i)) else {
            return;
        };
        if self.finished {
            return;
        }

        let start = i64::from(sequence.start());
        let end = i64::from(sequence.end());
        self.frame = self.frame.saturating_add(dt_ms);
        if self.frame <= end {
            return;
        }

        let looping = match self.options.loop_mode {
            LoopMode::Auto => sequence.is_looping(),
            LoopMode::Always => true,
            LoopMode::Never => false,
        };
        let duration = end - start;
        if looping && duration > 0 {
            self.frame = start + (self.frame - start) % duration;
        } else if looping {
            self.frame = start;
        } else {
            self.frame = end;
            self.finished = true;
        }
    }

    /// Evaluate the skeleton without advancing time
    fn refresh(&mut self, camera: Option<Quat>) {
        let time = self
            .model
            .sample_time(self.sequence, self.frame, self.counter);
        self.skeleton.update(&self.model, &time, camera);
    }

    /// Bone palette at the current pose
    pub fn bone_matrices(&self) -> Vec<Mat4> {
        self.skeleton.bone_matrices()
    }

    /// Batches to draw at the current pose, in draw order
    pub fn visible_batches(&self) -> Vec<Batch> {
        let time = self.sample_time();
        self.model
            .batches()
            .iter()
            .filter(|b| self.is_geoset_visible(b.geoset))
            .filter(|b| self.model.should_render(b, &time))
            .copied()
            .collect()
    }

    /// Ribbon strip vertices for ribbon emitter `index`
    pub fn ribbon_vertex_data(&self, index: usize) -> Vec<f32> {
        self.ribbon_emitters
            .iter()
            .find(|r| r.index() == index)
            .map(|r| r.vertex_data(&self.model, &self.sample_time()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = InstanceOptions::new()
            .with_loop_mode(LoopMode::Never)
            .with_seed(42)
            .with_emitters(false)
            .with_speed(2.0);
        assert_eq!(options.loop_mode, LoopMode::Never);
        assert_eq!(options.seed, 42);
        assert!(!options.emitters_enabled);
        assert_eq!(options.speed, 2.0);
        assert_eq!(InstanceOptions::default().speed, 1.0);
    }
}
