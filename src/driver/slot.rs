//! Per-body evaluation state.
//!
//! Each modeled body gets its own slot holding its ground truth and state.
//! Slots share nothing, so re-anchoring one body never touches another.

use crate::error::{Error, Result};
use crate::evaluation::{FrameOutcome, PoseErrorEvaluator};
use crate::geometry::RigidPose;
use crate::io::{Frame, GroundTruthTrajectory};
use crate::tracking::{BodyId, BodyState, PoseTracker, TrackedBody};

#[derive(Debug)]
pub struct BodySlot<'a> {
    pub id: BodyId,
    pub ground_truth: &'a GroundTruthTrajectory,
    pub state: BodyState,
}

impl<'a> BodySlot<'a> {
    pub fn new(id: BodyId, ground_truth: &'a GroundTruthTrajectory) -> Self {
        Self {
            id,
            ground_truth,
            state: BodyState::Uninitialized,
        }
    }

    fn ground_truth_at(&self, frame: usize) -> Result<RigidPose> {
        self.ground_truth.get(frame).copied().ok_or_else(|| {
            Error::Config(format!(
                "no ground truth for {} at frame {} ({} poses)",
                self.id,
                frame,
                self.ground_truth.len()
            ))
        })
    }

    /// Set pose and initial pose to the ground truth of `frame`.
    pub fn seed<T: PoseTracker>(&self, tracker: &mut T, frame: usize) -> Result<()> {
        let gt = self.ground_truth_at(frame)?;
        let body = body_mut(tracker, self.id)?;
        body.set_pose(gt);
        body.set_initial_pose(gt);
        Ok(())
    }

    /// Start tracking; the tracker builds the appearance model from the
    /// current frame and pose.
    pub fn start_tracking<T: PoseTracker>(
        &mut self,
        tracker: &mut T,
        frame: &Frame,
        undistort: bool,
    ) -> Result<()> {
        tracker.toggle_tracking(frame, self.id, undistort)?;
        self.state = BodyState::Tracking;
        Ok(())
    }

    /// Score the body's current pose against ground truth for `frame` and,
    /// on failure, re-anchor it before returning.
    pub fn step<T: PoseTracker>(
        &mut self,
        tracker: &mut T,
        frame: &Frame,
        evaluator: &PoseErrorEvaluator,
        undistort: bool,
    ) -> Result<FrameOutcome> {
        if !self.state.is_tracking() {
            return Err(Error::Tracker(format!(
                "{} scored at frame {} while {:?}",
                self.id, frame.index, self.state
            )));
        }
        let gt = self.ground_truth_at(frame.index)?;
        let estimated = tracker
            .body(self.id)
            .ok_or_else(|| missing_body(self.id))?
            .pose();

        let error = evaluator.evaluate(&estimated, &gt);
        let mut outcome = FrameOutcome::new(frame.index, self.id, &error);
        if !error.success {
            self.recover(tracker, frame, undistort)?;
            outcome.recovered = true;
        }
        Ok(outcome)
    }

    /// Recovery: stop tracking (dropping the appearance model), reset pose
    /// and initial pose to this frame's ground truth, start tracking again.
    pub fn recover<T: PoseTracker>(
        &mut self,
        tracker: &mut T,
        frame: &Frame,
        undistort: bool,
    ) -> Result<()> {
        debug_assert!(self.state.is_tracking(), "recovering an untracked body");
        self.state = BodyState::Recovering;
        tracker.toggle_tracking(frame, self.id, undistort)?;
        self.seed(tracker, frame.index)?;
        tracker.toggle_tracking(frame, self.id, undistort)?;
        self.state = BodyState::Tracking;
        Ok(())
    }
}

fn body_mut<T: PoseTracker>(tracker: &mut T, id: BodyId) -> Result<&mut T::Body> {
    tracker.body_mut(id).ok_or_else(|| missing_body(id))
}

fn missing_body(id: BodyId) -> Error {
    Error::Tracker(format!("tracker has no {}", id))
}
