//! Ground-truth trajectory files.
//!
//! A trajectory file is plain text. The first line is a header and is
//! skipped; every following line holds one pose as 12 whitespace-separated
//! numbers, the row-major rotation followed by the translation:
//!
//! ```text
//! r00 r01 r02 r10 r11 r12 r20 r21 r22 tx ty tz
//! ```
//!
//! Line `k + 2` of the file is the pose for frame `k`; frame 0 seeds the
//! tracker and frames `1..=N` are evaluated.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::RigidPose;

/// Number of values on a pose line.
pub const POSE_FIELDS: usize = 12;

/// Immutable per-frame ground-truth poses of one body, `N + 1` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthTrajectory {
    poses: Vec<RigidPose>,
}

impl GroundTruthTrajectory {
    /// Wrap already-known poses. Index 0 is the initialization frame.
    pub fn from_poses(poses: Vec<RigidPose>) -> Self {
        Self { poses }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Number of evaluation frames (entries after the initialization frame).
    pub fn frame_count(&self) -> usize {
        self.poses.len().saturating_sub(1)
    }

    pub fn get(&self, idx: usize) -> Option<&RigidPose> {
        self.poses.get(idx)
    }

    pub fn poses(&self) -> &[RigidPose] {
        &self.poses
    }

    pub fn into_poses(self) -> Vec<RigidPose> {
        self.poses
    }
}

impl Index<usize> for GroundTruthTrajectory {
    type Output = RigidPose;

    fn index(&self, idx: usize) -> &RigidPose {
        &self.poses[idx]
    }
}

/// Ground truth of the evaluated body and of the occluding body, loaded once
/// per batch and shared read-only by every configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPair {
    pub primary: GroundTruthTrajectory,
    pub occluder: GroundTruthTrajectory,
}

impl TrajectoryPair {
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        primary: P,
        occluder: Q,
        frame_count: usize,
    ) -> Result<Self> {
        Ok(Self {
            primary: load_trajectory(primary, frame_count)?,
            occluder: load_trajectory(occluder, frame_count)?,
        })
    }
}

/// Load exactly `frame_count + 1` poses from the file at `path`.
pub fn load_trajectory<P: AsRef<Path>>(
    path: P,
    frame_count: usize,
) -> Result<GroundTruthTrajectory> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let trajectory = parse_trajectory(BufReader::new(file), frame_count, path)?;
    debug!(
        "Loaded {} ground-truth poses from {}",
        trajectory.len(),
        path.display()
    );
    Ok(trajectory)
}

/// Parse a trajectory from any reader. `origin` only labels error messages.
pub fn parse_trajectory<R: BufRead>(
    reader: R,
    frame_count: usize,
    origin: &Path,
) -> Result<GroundTruthTrajectory> {
    let expected = frame_count + 1;
    let mut lines = reader.lines();

    // Header: read, never validated.
    match lines.next() {
        Some(header) => {
            header.map_err(|source| io_error(origin, source))?;
        }
        None => {
            return Err(Error::TrajectoryLength {
                path: origin.to_path_buf(),
                expected,
                found: 0,
            });
        }
    }

    let mut poses = Vec::with_capacity(expected);
    for (offset, line) in lines.enumerate() {
        if poses.len() == expected {
            debug!(
                "{}: ignoring lines after pose {}",
                origin.display(),
                expected - 1
            );
            break;
        }
        let line = line.map_err(|source| io_error(origin, source))?;
        // Header is line 1, so the first pose is on line 2.
        let line_no = offset + 2;
        poses.push(parse_pose_line(&line, line_no, origin)?);
    }

    if poses.len() < expected {
        return Err(Error::TrajectoryLength {
            path: origin.to_path_buf(),
            expected,
            found: poses.len(),
        });
    }

    Ok(GroundTruthTrajectory { poses })
}

/// Parse one `r00 .. r22 tx ty tz` line.
pub fn parse_pose_line(line: &str, line_no: usize, origin: &Path) -> Result<RigidPose> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != POSE_FIELDS {
        return Err(Error::TrajectoryParse {
            path: origin.to_path_buf(),
            line: line_no,
            reason: format!("expected {} fields, got {}", POSE_FIELDS, fields.len()),
        });
    }

    let mut values = [0.0f64; POSE_FIELDS];
    for (value, field) in values.iter_mut().zip(&fields) {
        let parsed: f64 = field.parse().map_err(|_| Error::TrajectoryParse {
            path: origin.to_path_buf(),
            line: line_no,
            reason: format!("'{}' is not a number", field),
        })?;
        // `f64::from_str` takes "NaN" and "inf"; a pose never holds them.
        if !parsed.is_finite() {
            return Err(Error::TrajectoryParse {
                path: origin.to_path_buf(),
                line: line_no,
                reason: format!("'{}' is not a finite number", field),
            });
        }
        *value = parsed;
    }

    Ok(RigidPose::from_row_major(&values))
}

fn io_error(origin: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: PathBuf::from(origin),
        source,
    }
}
