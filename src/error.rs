use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a benchmark configuration (or the batch, when they
/// happen while loading the shared trajectories).
///
/// Per-frame tracking failures are not errors: they are scored and repaired
/// by the recovery protocol.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {reason}")]
    TrajectoryParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}: expected {expected} poses, found {found}")]
    TrajectoryLength {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("failed to load frame {path}: {reason}")]
    Frame { path: PathBuf, reason: String },

    #[error("frame source returned frame {found} when asked for frame {expected}")]
    FrameIndex { expected: usize, found: usize },

    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("run cancelled before frame {frame}")]
    Cancelled { frame: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
