//! Benchmark harness for 6-DoF rigid-object trackers.
//!
//! Drives an external pose tracker through recorded sequences, scores each
//! frame against ground truth (geodesic rotation error, Euclidean translation
//! error), re-anchors lost bodies to ground truth, and reports per-configuration
//! success rates.

pub mod batch;
pub mod config;
pub mod driver;
mod error;
pub mod evaluation;
pub mod geometry;
pub mod io;
pub mod system;
pub mod tracking;

pub use batch::{BatchReport, BatchRunner, ConfigOutcome, ConfigReport};
pub use config::{BenchmarkConfig, EvalConfig};
pub use driver::{DriverOptions, EvaluationDriver};
pub use error::{Error, Result};
pub use evaluation::{AggregateResult, FrameOutcome, PoseErrorEvaluator};
pub use geometry::RigidPose;
pub use tracking::{BodyId, PoseTracker, TrackedBody, TrackerFactory};
