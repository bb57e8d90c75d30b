//! Dataset input: ground-truth trajectories and camera frames.

pub mod frames;
pub mod trajectory;

pub use frames::{frame_file_name, DatasetFrames, Frame, FrameSource};
pub use trajectory::{load_trajectory, parse_trajectory, GroundTruthTrajectory, TrajectoryPair};
