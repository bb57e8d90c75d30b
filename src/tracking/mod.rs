//! Interface to the external 6-DoF object tracker.
//!
//! The benchmark never looks inside the tracker. It only needs:
//! - `toggle_tracking`: start or stop tracking one body; starting (re)builds
//!   the body's appearance model from the frame and the body's current pose
//! - `estimate_poses`: advance every tracked body by one frame, in place
//! - per-body pose access through [`TrackedBody`]
//!
//! Bodies are owned by the tracker and addressed by [`BodyId`].

pub mod replay;
pub mod state;

use std::fmt;

use serde::Serialize;

use crate::config::{EvalConfig, TrackerSetup};
use crate::error::Result;
use crate::geometry::RigidPose;
use crate::io::Frame;

pub use replay::{ReplayTracker, ReplayTrackerFactory};
pub use state::BodyState;

/// Index of a body inside the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyId(pub usize);

impl BodyId {
    /// The evaluated object.
    pub const PRIMARY: BodyId = BodyId(0);
    /// The optional occluding object.
    pub const OCCLUDER: BodyId = BodyId(1);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body {}", self.0)
    }
}

/// Pose state of one tracked body.
pub trait TrackedBody {
    fn pose(&self) -> RigidPose;
    fn set_pose(&mut self, pose: RigidPose);
    /// Pose used to seed the appearance model on (re)initialization.
    fn set_initial_pose(&mut self, pose: RigidPose);
}

pub trait PoseTracker {
    type Body: TrackedBody;

    /// Toggle tracking of `body`: on (building its appearance model from
    /// `frame` and the current pose) if it is off, off if it is on.
    fn toggle_tracking(&mut self, frame: &Frame, body: BodyId, undistort: bool) -> Result<()>;

    /// Update the pose of every tracked body for `frame`.
    fn estimate_poses(&mut self, frame: &Frame, undistort: bool, render: bool) -> Result<()>;

    fn body(&self, id: BodyId) -> Option<&Self::Body>;

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Self::Body>;
}

/// Builds a fresh tracker (and its bodies) for each configuration.
pub trait TrackerFactory {
    type Tracker: PoseTracker;

    fn create(&self, config: &EvalConfig, setup: &TrackerSetup) -> Result<Self::Tracker>;
}
