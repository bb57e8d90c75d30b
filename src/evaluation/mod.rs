//! Scoring of tracker output against ground truth.

pub mod pose_error;
pub mod result;

pub use pose_error::{rotation_error, translation_error, PoseError, PoseErrorEvaluator};
pub use result::{AggregateResult, BodyStats, FrameOutcome};
