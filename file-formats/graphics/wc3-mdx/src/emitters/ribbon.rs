//! Ribbon emitter runtime state

use std::collections::VecDeque;

use glam::Vec3;

use super::{SPAWN_VISIBILITY_THRESHOLD, SpawnAccumulator};
use crate::chunks::NodeIndex;
use crate::model::MdxModel;
use crate::skeleton::{RuntimeNode, Skeleton};
use crate::track::SampleTime;

/// Floats written per segment by [`RibbonEmitter::vertex_data`]
pub const FLOATS_PER_SEGMENT: usize = 10;

/// Upper bound on live segments per emitter
pub const MAX_SEGMENTS: usize = 1 << 16;

/// One cross-section of a ribbon trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonSegment {
    /// Edge above the emitter
    pub top: Vec3,
    /// Edge below the emitter
    pub bottom: Vec3,
    /// Seconds left to live
    pub health: f32,
}

impl RibbonSegment {
    fn new(node: &RuntimeNode, height_above: f32, height_below: f32, lifespan: f32) -> Self {
        let top = node.pivot + Vec3::new(0.0, height_above, 0.0);
        let bottom = node.pivot - Vec3::new(0.0, height_below, 0.0);
        Self {
            top: node.world_matrix.transform_point3(top),
            bottom: node.world_matrix.transform_point3(bottom),
            health: lifespan,
        }
    }

    fn advance(&mut self, dt: f32, gravity: f32) {
        self.health -= dt;
        let fall = gravity * dt * dt;
        self.top.z -= fall;
        self.bottom.z -= fall;
    }
}

/// Ordered ribbon segments for one `RIBB` record, oldest first
#[derive(Debug, Clone)]
pub struct RibbonEmitter {
    index: usize,
    node: NodeIndex,
    max_ribbons: usize,
    segments: VecDeque<RibbonSegment>,
    accumulator: SpawnAccumulator,
}

impl RibbonEmitter {
    /// Create the runtime for ribbon emitter `index`, or `None` if it does
    /// not exist in `model`
    pub fn new(model: &MdxModel, index: usize) -> Option<Self> {
        let record = model.ribbon_emitters().get(index)?;
        let max_ribbons = (record.emission_rate as f32 * record.lifespan).ceil();
        let max_ribbons = if max_ribbons.is_finite() && max_ribbons > 0.0 {
            max_ribbons as usize
        } else {
            0
        };

        Some(Self {
            index,
            node: record.node,
            max_ribbons,
            segments: VecDeque::with_capacity(max_ribbons),
            accumulator: SpawnAccumulator::default(),
        })
    }

    /// Position of the record in `RIBB`
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> NodeIndex {
        self.node
    }

    /// Most segments drawn at once
    pub fn max_ribbons(&self) -> usize {
        self.max_ribbons
    }

    pub fn segments(&self) -> &VecDeque<RibbonSegment> {
        &self.segments
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.accumulator = SpawnAccumulator::default();
    }

    /// Age segments by `dt` seconds, drop expired ones from the front and
    /// append new ones when `allow_create` is set
    pub fn update(
        &mut self,
        dt: f32,
        model: &MdxModel,
        skeleton: &Skeleton,
        time: &SampleTime<'_>,
        allow_create: bool,
    ) {
        let Some(record) = model.ribbon_emitters().get(self.index) else {
            return;
        };

        for segment in &mut self.segments {
            segment.advance(dt, record.gravity);
        }
        while self.segments.front().is_some_and(|s| s.health <= 0.0) {
            self.segments.pop_front();
        }

        if !allow_create || record.visibility(time) <= SPAWN_VISIBILITY_THRESHOLD {
            return;
        }
        let amount = self
            .accumulator
            .advance(record.emission_rate as f32, dt);
        if amount == 0 {
            return;
        }
        let Some(node) = skeleton.node(self.node) else {
            return;
        };

        let height_above = record.height_above(time);
        let height_below = record.height_below(time);
        for _ in 0..amount.min(MAX_SEGMENTS) {
            self.segments.push_back(RibbonSegment::new(
                node,
                height_above,
                height_below,
                record.lifespan,
            ));
        }
        if self.segments.len() > MAX_SEGMENTS {
            let excess = self.segments.len() - MAX_SEGMENTS;
            self.segments.drain(..excess);
        }
    }

    /// Triangle strip vertices as `[x, y, z, u, v]`, two per segment
    ///
    /// Covers the oldest `max_ribbons` segments. Empty until more than two
    /// segments are active.
    pub fn vertex_data(&self, model: &MdxModel, time: &SampleTime<'_>) -> Vec<f32> {
        let Some(record) = model.ribbon_emitters().get(self.index) else {
            return Vec::new();
        };
        let ribbons = self.segments.len().min(self.max_ribbons);
        if ribbons <= 2 {
            return Vec::new();
        }

        let rows = record.rows.max(1) as f32;
        let columns = record.columns.max(1) as f32;
        let slot = record.texture_slot(time) as f32;
        let top = (slot / rows).floor() / rows;
        let bottom = top + 1.0 / rows;
        let uv_factor = 1.0 / ribbons as f32 / columns;

        let mut data = Vec::with_capacity(ribbons * FLOATS_PER_SEGMENT);
        for (i, segment) in self.segments.iter().take(ribbons).enumerate() {
            let left = (ribbons - i) as f32 * uv_factor;
            let right = left - uv_factor;
            data.extend_from_slice(&[
                segment.top.x,
                segment.top.y,
                segment.top.z,
                left,
                top,
                segment.bottom.x,
                segment.bottom.y,
                segment.bottom.z,
                right,
                bottom,
            ]);
        }
        data
    }
}
