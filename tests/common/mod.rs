#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use nalgebra::{Rotation3, Unit, Vector3};

use rbot_eval::io::Frame;
use rbot_eval::{BodyId, PoseTracker, RigidPose, TrackedBody};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Toggle {
        frame: usize,
        body: BodyId,
        on: bool,
        pose: RigidPose,
        initial_pose: RigidPose,
    },
    /// `estimate_poses` was called for `frame`.
    Estimate { frame: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedBody {
    pub pose: RigidPose,
    pub initial_pose: RigidPose,
    pub tracking: bool,
}

impl TrackedBody for ScriptedBody {
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

/// Follows a given truth exactly, except for scripted translation offsets.
pub struct ScriptedTracker {
    pub bodies: Vec<ScriptedBody>,
    truth: Vec<Vec<RigidPose>>,
    offsets: HashMap<(usize, usize), Vector3<f64>>,
    pub events: Vec<Event>,
    /// Poses of every body on entry to `estimate_poses`, keyed by frame.
    pub poses_on_entry: HashMap<usize, Vec<RigidPose>>,
}

impl ScriptedTracker {
    pub fn new(truth: Vec<Vec<RigidPose>>) -> Self {
        Self {
            bodies: vec![ScriptedBody::default(); truth.len()],
            truth,
            offsets: HashMap::new(),
            events: Vec::new(),
            poses_on_entry: HashMap::new(),
        }
    }

    /// Report `truth + offset` for `body` at `frame`.
    pub fn deviate(mut self, body: BodyId, frame: usize, offset: Vector3<f64>) -> Self {
        self.offsets.insert((body.index(), frame), offset);
        self
    }

    pub fn toggles_for(&self, body: BodyId) -> Vec<(usize, bool)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                Event::Toggle { frame, body: b, on, .. } if b == body => Some((frame, on)),
                _ => None,
            })
            .collect()
    }
}

impl PoseTracker for ScriptedTracker {
    type Body = ScriptedBody;

    fn toggle_tracking(
        &mut self,
        frame: &Frame,
        body: BodyId,
        _undistort: bool,
    ) -> rbot_eval::Result<()> {
        let b = self
            .bodies
            .get_mut(body.index())
            .ok_or_else(|| rbot_eval::Error::Tracker(format!("no {}", body)))?;
        b.tracking = !b.tracking;
        self.events.push(Event::Toggle {
            frame: frame.index,
            body,
            on: b.tracking,
            pose: b.pose,
            initial_pose: b.initial_pose,
        });
        Ok(())
    }

    fn estimate_poses(
        &mut self,
        frame: &Frame,
        _undistort: bool,
        _render: bool,
    ) -> rbot_eval::Result<()> {
        self.poses_on_entry
            .insert(frame.index, self.bodies.iter().map(|b| b.pose).collect());
        self.events.push(Event::Estimate { frame: frame.index });

        for (idx, body) in self.bodies.iter_mut().enumerate() {
            if !body.tracking {
                continue;
            }
            let truth = self.truth[idx][frame.index];
            body.pose = match self.offsets.get(&(idx, frame.index)) {
                Some(offset) => truth.translated(*offset),
                None => truth,
            };
        }
        Ok(())
    }

    fn body(&self, id: BodyId) -> Option<&ScriptedBody> {
        self.bodies.get(id.index())
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut ScriptedBody> {
        self.bodies.get_mut(id.index())
    }
}

pub fn blank_frame(index: usize) -> rbot_eval::Result<Frame> {
    Ok(Frame::new(index, DynamicImage::new_luma8(2, 2)))
}

/// A body slowly circling the camera: `n + 1` distinct poses.
pub fn circling_trajectory(n: usize, phase: f64) -> Vec<RigidPose> {
    (0..=n)
        .map(|i| {
            let angle = phase + 0.01 * i as f64;
            let axis = Unit::new_normalize(Vector3::new(0.1, 1.0, 0.2));
            RigidPose::new(
                Rotation3::from_axis_angle(&axis, angle).into_inner(),
                Vector3::new(15.0 + i as f64, -35.0, 515.0 - 0.5 * i as f64),
            )
        })
        .collect()
}

pub fn write_trajectory(path: &Path, poses: &[RigidPose]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut text = String::from("r00 r01 r02 r10 r11 r12 r20 r21 r22 tx ty tz\n");
    for pose in poses {
        let r = &pose.rotation;
        let t = &pose.translation;
        // `{:?}` keeps full precision so values round-trip exactly.
        let values = [
            r[(0, 0)],
            r[(0, 1)],
            r[(0, 2)],
            r[(1, 0)],
            r[(1, 1)],
            r[(1, 2)],
            r[(2, 0)],
            r[(2, 1)],
            r[(2, 2)],
            t.x,
            t.y,
            t.z,
        ];
        let line: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

/// Write `n + 1` tiny PNG frames for `(body, sequence)`.
pub fn write_frames(dataset: &Path, body: &str, sequence: &str, n: usize) {
    let dir = dataset.join(body).join("frames");
    fs::create_dir_all(&dir).unwrap();
    for i in 0..=n {
        let img = GrayImage::from_pixel(2, 2, Luma([(i % 256) as u8]));
        img.save(dir.join(format!("{}{:04}.png", sequence, i))).unwrap();
    }
}
