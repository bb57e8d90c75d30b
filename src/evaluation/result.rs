//! Per-frame outcomes and per-configuration aggregates.

use serde::Serialize;

use crate::evaluation::pose_error::PoseError;
use crate::tracking::BodyId;

/// Score of one body at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub frame: usize,
    pub body: BodyId,
    pub rotation_error: f64,
    pub translation_error: f64,
    pub success: bool,
    /// The recovery protocol ran for this body after scoring this frame.
    pub recovered: bool,
}

impl FrameOutcome {
    pub fn new(frame: usize, body: BodyId, error: &PoseError) -> Self {
        Self {
            frame,
            body,
            rotation_error: error.rotation_error,
            translation_error: error.translation_error,
            success: error.success,
            recovered: false,
        }
    }
}

/// Running totals for one tracked body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BodyStats {
    pub frames: usize,
    pub successes: usize,
    pub recoveries: usize,
}

impl BodyStats {
    pub fn record(&mut self, success: bool) {
        self.frames += 1;
        if success {
            self.successes += 1;
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.successes as f64 / self.frames as f64
    }
}

/// Result of one configuration run.
///
/// Every modeled body is scored and recovered, but the benchmark figure is
/// the primary body's success rate; the occluder only exists to produce
/// realistic occlusions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Indexed by `BodyId`; entry 0 is the primary body.
    pub bodies: Vec<BodyStats>,
}

impl AggregateResult {
    pub fn new(num_bodies: usize) -> Self {
        Self {
            bodies: vec![BodyStats::default(); num_bodies],
        }
    }

    pub fn record(&mut self, outcome: &FrameOutcome) {
        if let Some(stats) = self.bodies.get_mut(outcome.body.index()) {
            stats.record(outcome.success);
            if outcome.recovered {
                stats.recoveries += 1;
            }
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&BodyStats> {
        self.bodies.get(id.index())
    }

    pub fn primary(&self) -> BodyStats {
        self.body(BodyId::PRIMARY).copied().unwrap_or_default()
    }

    /// Frames evaluated for the primary body.
    pub fn total_frames(&self) -> usize {
        self.primary().frames
    }

    pub fn successes(&self) -> usize {
        self.primary().successes
    }

    /// `successes / total_frames` of the primary body.
    pub fn success_rate(&self) -> f64 {
        self.primary().success_rate()
    }
}
