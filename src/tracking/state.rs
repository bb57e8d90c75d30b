//! Per-body tracking state during an evaluation run.

/// State of one tracked body.
///
/// There is no terminal "lost" state: a failed frame is repaired within the
/// same frame step, so a body is back in `Tracking` before the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Pose not yet seeded from ground truth.
    Uninitialized,
    /// Tracked; appearance model built.
    Tracking,
    /// Being re-anchored to ground truth after a failed frame.
    Recovering,
}

impl BodyState {
    pub fn is_tracking(self) -> bool {
        self == Self::Tracking
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::Uninitialized
    }
}
