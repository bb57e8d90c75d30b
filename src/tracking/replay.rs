//! Tracker that replays pose estimates recorded by an external run.
//!
//! Estimates use the ground-truth file format (header + one 12-value pose
//! line per frame, frame 0 first) and are laid out as:
//!
//! ```text
//! <estimates>/<sequence>/<body>.txt            primary body
//! <estimates>/<sequence>/<body>.occluder.txt   occluder, when modeled
//! ```
//!
//! Starting to track a body restarts it from its initial pose.
//! `estimate_poses` sets every tracked body to its recorded pose for the
//! frame. Bodies that are not tracked keep their pose.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{EvalConfig, TrackerSetup};
use crate::error::{Error, Result};
use crate::geometry::RigidPose;
use crate::io::{load_trajectory, Frame};

use super::{BodyId, PoseTracker, TrackedBody, TrackerFactory};

#[derive(Debug, Clone)]
pub struct ReplayBody {
    name: String,
    pose: RigidPose,
    initial_pose: RigidPose,
    tracking: bool,
    /// Pose the appearance model was last built from.
    model_pose: Option<RigidPose>,
    estimates: Vec<RigidPose>,
}

impl ReplayBody {
    pub fn new(name: impl Into<String>, estimates: Vec<RigidPose>) -> Self {
        Self {
            name: name.into(),
            pose: RigidPose::identity(),
            initial_pose: RigidPose::identity(),
            tracking: false,
            model_pose: None,
            estimates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn initial_pose(&self) -> RigidPose {
        self.initial_pose
    }

    pub fn model_pose(&self) -> Option<RigidPose> {
        self.model_pose
    }
}

impl TrackedBody for ReplayBody {
    fn pose(&self) -> RigidPose {
        self.pose
    }

    fn set_pose(&mut self, pose: RigidPose) {
        self.pose = pose;
    }

    fn set_initial_pose(&mut self, pose: RigidPose) {
        self.initial_pose = pose;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplayTracker {
    bodies: Vec<ReplayBody>,
}

impl ReplayTracker {
    pub fn new(bodies: Vec<ReplayBody>) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &[ReplayBody] {
        &self.bodies
    }

    fn body_or_err(&mut self, id: BodyId) -> Result<&mut ReplayBody> {
        self.bodies
            .get_mut(id.index())
            .ok_or_else(|| Error::Tracker(format!("no {}", id)))
    }
}

impl PoseTracker for ReplayTracker {
    type Body = ReplayBody;

    fn toggle_tracking(&mut self, frame: &Frame, body: BodyId, _undistort: bool) -> Result<()> {
        let b = self.body_or_err(body)?;
        if b.tracking {
            b.tracking = false;
            b.model_pose = None;
        } else {
            // Tracking restarts from the initial pose.
            b.tracking = true;
            b.pose = b.initial_pose;
            b.model_pose = Some(b.initial_pose);
        }
        debug!(
            "{} ({}) tracking {} at frame {}",
            body,
            b.name,
            if b.tracking { "on" } else { "off" },
            frame.index
        );
        Ok(())
    }

    fn estimate_poses(&mut self, frame: &Frame, _undistort: bool, _render: bool) -> Result<()> {
        for b in self.bodies.iter_mut().filter(|b| b.tracking) {
            b.pose = *b.estimates.get(frame.index).ok_or_else(|| {
                Error::Tracker(format!(
                    "no recorded estimate for {} at frame {}",
                    b.name, frame.index
                ))
            })?;
        }
        Ok(())
    }

    fn body(&self, id: BodyId) -> Option<&ReplayBody> {
        self.bodies.get(id.index())
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut ReplayBody> {
        self.bodies.get_mut(id.index())
    }
}

/// Loads recorded estimates for each configuration.
#[derive(Debug, Clone)]
pub struct ReplayTrackerFactory {
    estimates_dir: PathBuf,
    frame_count: usize,
}

impl ReplayTrackerFactory {
    pub fn new<P: AsRef<Path>>(estimates_dir: P, frame_count: usize) -> Self {
        Self {
            estimates_dir: estimates_dir.as_ref().to_path_buf(),
            frame_count,
        }
    }

    pub fn primary_path(&self, config: &EvalConfig) -> PathBuf {
        self.estimates_dir
            .join(&config.sequence)
            .join(format!("{}.txt", config.body))
    }

    pub fn occluder_path(&self, config: &EvalConfig) -> PathBuf {
        self.estimates_dir
            .join(&config.sequence)
            .join(format!("{}.occluder.txt", config.body))
    }
}

impl TrackerFactory for ReplayTrackerFactory {
    type Tracker = ReplayTracker;

    fn create(&self, config: &EvalConfig, setup: &TrackerSetup) -> Result<ReplayTracker> {
        let mut paths = vec![self.primary_path(config)];
        if config.model_occlusions {
            paths.push(self.occluder_path(config));
        }
        if setup.bodies.len() != paths.len() {
            return Err(Error::Config(format!(
                "{}: tracker setup has {} bodies, expected {}",
                config.label(),
                setup.bodies.len(),
                paths.len()
            )));
        }

        let bodies = setup
            .bodies
            .iter()
            .zip(&paths)
            .map(|(model, path)| {
                let estimates = load_trajectory(path, self.frame_count)?.into_poses();
                Ok(ReplayBody::new(model.name.clone(), estimates))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ReplayTracker::new(bodies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchmarkConfig;
    use image::DynamicImage;
    use nalgebra::Vector3;
    use std::fs;
    use tempfile::tempdir;

    fn frame(index: usize) -> Frame {
        Frame::new(index, DynamicImage::new_rgb8(1, 1))
    }

    fn offsets(n: usize) -> Vec<RigidPose> {
        (0..n)
            .map(|i| RigidPose::from_translation(Vector3::new(i as f64, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn test_toggle_on_restarts_from_initial_pose() {
        let mut tracker = ReplayTracker::new(vec![ReplayBody::new("cube", offsets(3))]);
        let seed = RigidPose::from_translation(Vector3::new(0.0, 0.0, 500.0));
        let body = tracker.body_mut(BodyId::PRIMARY).unwrap();
        body.set_initial_pose(seed);
        body.set_pose(RigidPose::from_translation(Vector3::new(90.0, 0.0, 0.0)));

        tracker.toggle_tracking(&frame(0), BodyId::PRIMARY, false).unwrap();
        let body = tracker.body(BodyId::PRIMARY).unwrap();
        assert!(body.is_tracking());
        assert_eq!(body.pose(), seed);
        assert_eq!(body.initial_pose(), seed);
        assert_eq!(body.model_pose(), Some(seed));

        tracker.toggle_tracking(&frame(0), BodyId::PRIMARY, false).unwrap();
        let body = tracker.body(BodyId::PRIMARY).unwrap();
        assert!(!body.is_tracking());
        assert_eq!(body.model_pose(), None);
    }

    #[test]
    fn test_estimate_only_moves_tracked_bodies() {
        let mut tracker = ReplayTracker::new(vec![
            ReplayBody::new("cube", offsets(3)),
            ReplayBody::new("squirrel_small", offsets(3)),
        ]);
        tracker.toggle_tracking(&frame(0), BodyId::PRIMARY, false).unwrap();

        tracker.estimate_poses(&frame(2), false, false).unwrap();
        assert_eq!(tracker.body(BodyId::PRIMARY).unwrap().pose().translation.x, 2.0);
        assert_eq!(
            tracker.body(BodyId::OCCLUDER).unwrap().pose(),
            RigidPose::identity()
        );
    }

    #[test]
    fn test_missing_estimate_is_tracker_error() {
        let mut tracker = ReplayTracker::new(vec![ReplayBody::new("cube", offsets(2))]);
        tracker.toggle_tracking(&frame(0), BodyId::PRIMARY, false).unwrap();
        let err = tracker.estimate_poses(&frame(5), false, false).unwrap_err();
        assert!(matches!(err, Error::Tracker(_)));
    }

    #[test]
    fn test_unknown_body_is_tracker_error() {
        let mut tracker = ReplayTracker::default();
        let err = tracker
            .toggle_tracking(&frame(0), BodyId::OCCLUDER, false)
            .unwrap_err();
        assert!(matches!(err, Error::Tracker(_)));
    }

    #[test]
    fn test_factory_loads_primary_and_occluder() {
        let dir = tempdir().unwrap();
        let seq_dir = dir.path().join("d_occlusion");
        fs::create_dir_all(&seq_dir).unwrap();
        let lines = "h\n1 0 0 0 1 0 0 0 1 0 0 0\n1 0 0 0 1 0 0 0 1 1 0 0\n";
        fs::write(seq_dir.join("ape.txt"), lines).unwrap();
        fs::write(seq_dir.join("ape.occluder.txt"), lines).unwrap();

        let factory = ReplayTrackerFactory::new(dir.path(), 1);
        let config = EvalConfig::new("ape", "d_occlusion", true);
        let setup = BenchmarkConfig::default().tracker_setup(&config);

        let tracker = factory.create(&config, &setup).unwrap();
        assert_eq!(tracker.bodies().len(), 2);
        assert_eq!(tracker.bodies()[0].name(), "ape");
        assert_eq!(tracker.bodies()[1].name(), "squirrel_small");
    }

    #[test]
    fn test_factory_missing_estimates() {
        let dir = tempdir().unwrap();
        let factory = ReplayTrackerFactory::new(dir.path(), 1);
        let config = EvalConfig::new("ape", "a_regular", false);
        let setup = BenchmarkConfig::default().tracker_setup(&config);

        assert!(matches!(
            factory.create(&config, &setup),
            Err(Error::Io { .. })
        ));
    }
}
