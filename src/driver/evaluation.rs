//! Frame loop of one benchmark configuration.
//!
//! 1. Load frame 0, seed every body with its ground truth, start tracking
//!    (building the appearance models).
//! 2. For each frame `1..=N`: load the frame, let the tracker update all
//!    bodies once, then score each body against its own ground truth and
//!    re-anchor it immediately if it failed.
//! 3. Return the aggregate. The tracker itself is released by the caller.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::EvalConfig;
use crate::error::{Error, Result};
use crate::evaluation::{AggregateResult, FrameOutcome, PoseErrorEvaluator};
use crate::io::{Frame, FrameSource, GroundTruthTrajectory, TrajectoryPair};
use crate::system::{CancelToken, RenderContext};
use crate::tracking::{BodyId, PoseTracker};

use super::slot::BodySlot;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Evaluated frames (N); frame 0 only initializes.
    pub frame_count: usize,
    pub undistort: bool,
    pub evaluator: PoseErrorEvaluator,
    /// Wall-clock limit for one run, checked between frames.
    pub timeout: Option<Duration>,
    pub cancel: CancelToken,
}

impl DriverOptions {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            undistort: false,
            evaluator: PoseErrorEvaluator::default(),
            timeout: None,
            cancel: CancelToken::new(),
        }
    }
}

pub struct EvaluationDriver<'a, T: PoseTracker, S: FrameSource> {
    tracker: &'a mut T,
    frames: &'a S,
    options: &'a DriverOptions,
    slots: Vec<BodySlot<'a>>,
}

impl<'a, T: PoseTracker, S: FrameSource> EvaluationDriver<'a, T, S> {
    pub fn new(tracker: &'a mut T, frames: &'a S, options: &'a DriverOptions) -> Self {
        Self {
            tracker,
            frames,
            options,
            slots: Vec::new(),
        }
    }

    /// Driver for `config`: the primary body, plus the occluder when its
    /// occlusions are modeled.
    pub fn for_config(
        config: &EvalConfig,
        tracker: &'a mut T,
        frames: &'a S,
        trajectories: &'a TrajectoryPair,
        options: &'a DriverOptions,
    ) -> Self {
        let driver = Self::new(tracker, frames, options)
            .with_body(BodyId::PRIMARY, &trajectories.primary);
        if config.model_occlusions {
            driver.with_body(BodyId::OCCLUDER, &trajectories.occluder)
        } else {
            driver
        }
    }

    pub fn with_body(mut self, id: BodyId, ground_truth: &'a GroundTruthTrajectory) -> Self {
        self.slots.push(BodySlot::new(id, ground_truth));
        self
    }

    pub fn run(self, render: &RenderContext) -> Result<AggregateResult> {
        self.run_observed(render, |_| {})
    }

    /// Run to completion, passing every per-body frame outcome to `observer`
    /// once any recovery for it has finished.
    pub fn run_observed<F>(
        mut self,
        render: &RenderContext,
        mut observer: F,
    ) -> Result<AggregateResult>
    where
        F: FnMut(&FrameOutcome),
    {
        self.validate()?;

        let _render = render.acquire();
        let started = Instant::now();
        let deadline = self.options.timeout.map(|t| started + t);
        let undistort = self.options.undistort;
        let evaluator = self.options.evaluator;

        let num_bodies = self
            .slots
            .iter()
            .map(|s| s.id.index() + 1)
            .max()
            .unwrap_or(0);
        let mut result = AggregateResult::new(num_bodies);

        let frame = self.load_frame(0)?;
        for slot in &self.slots {
            slot.seed(self.tracker, 0)?;
        }
        for slot in &mut self.slots {
            slot.start_tracking(self.tracker, &frame, undistort)?;
        }

        for i in 1..=self.options.frame_count {
            if self.options.cancel.is_cancelled()
                || deadline.is_some_and(|d| Instant::now() >= d)
            {
                return Err(Error::Cancelled { frame: i });
            }

            let frame = self.load_frame(i)?;
            self.tracker.estimate_poses(&frame, undistort, false)?;

            for slot in &mut self.slots {
                let outcome = slot.step(self.tracker, &frame, &evaluator, undistort)?;
                if outcome.recovered {
                    debug!(
                        "Frame {}: {} lost (rot {:.2} deg, trans {:.1}), reset to ground truth",
                        i,
                        outcome.body,
                        outcome.rotation_error.to_degrees(),
                        outcome.translation_error
                    );
                }
                result.record(&outcome);
                observer(&outcome);
            }
        }

        let primary = result.primary();
        info!(
            "{} frames in {:.1}s: {}/{} successful, {} recoveries",
            self.options.frame_count,
            started.elapsed().as_secs_f64(),
            primary.successes,
            primary.frames,
            primary.recoveries
        );

        Ok(result)
    }

    /// Ground truth is indexed by `frame.index`, so it must be the index asked for.
    fn load_frame(&self, index: usize) -> Result<Frame> {
        let frame = self.frames.load(index)?;
        if frame.index != index {
            return Err(Error::FrameIndex {
                expected: index,
                found: frame.index,
            });
        }
        Ok(frame)
    }

    fn validate(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(Error::Config("no bodies to evaluate".into()));
        }
        let expected = self.options.frame_count + 1;
        for slot in &self.slots {
            if slot.ground_truth.len() < expected {
                return Err(Error::Config(format!(
                    "ground truth for {} has {} poses, run needs {}",
                    slot.id,
                    slot.ground_truth.len(),
                    expected
                )));
            }
        }
        Ok(())
    }
}
