//! Pose error metric used to score a tracker against ground truth.
//!
//! Rotation error is the geodesic angle on SO(3):
//!
//! ```text
//! e_R = acos( (trace(R_est^T * R_gt) - 1) / 2 )
//! ```
//!
//! and translation error is the L2 distance between the translation columns.
//! A frame is a success when both errors are within threshold.

use crate::geometry::RigidPose;

/// Default translation threshold in trajectory units (5% of a 1000 mm scene).
pub const DEFAULT_TRANS_THRESHOLD: f64 = 1000.0 * 0.05;

/// Default rotation threshold in degrees.
pub const DEFAULT_ROT_THRESHOLD_DEG: f64 = 5.0;

/// Errors of one estimated pose against its ground truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseError {
    /// Geodesic rotation error in radians, in `[0, pi]`.
    pub rotation_error: f64,
    /// Euclidean translation error in trajectory units.
    pub translation_error: f64,
    pub success: bool,
}

/// Fixed-threshold success classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseErrorEvaluator {
    pub trans_threshold: f64,
    /// Radians.
    pub rot_threshold: f64,
}

impl PoseErrorEvaluator {
    pub fn new(trans_threshold: f64, rot_threshold: f64) -> Self {
        Self {
            trans_threshold,
            rot_threshold,
        }
    }

    pub fn with_degrees(trans_threshold: f64, rot_threshold_deg: f64) -> Self {
        Self::new(trans_threshold, rot_threshold_deg.to_radians())
    }

    pub fn evaluate(&self, estimated: &RigidPose, ground_truth: &RigidPose) -> PoseError {
        let rotation_error = rotation_error(estimated, ground_truth);
        let translation_error = translation_error(estimated, ground_truth);
        // NaN on either side compares false, so garbage poses never count.
        let success =
            translation_error <= self.trans_threshold && rotation_error <= self.rot_threshold;

        PoseError {
            rotation_error,
            translation_error,
            success,
        }
    }
}

impl Default for PoseErrorEvaluator {
    fn default() -> Self {
        Self::with_degrees(DEFAULT_TRANS_THRESHOLD, DEFAULT_ROT_THRESHOLD_DEG)
    }
}

/// Geodesic angle between the rotation blocks of `a` and `b`, in radians.
///
/// The `acos` argument is clamped to `[-1, 1]`; rounding pushes it just
/// outside the domain for near-identical or near-opposite rotations.
pub fn rotation_error(a: &RigidPose, b: &RigidPose) -> f64 {
    let trace = (a.rotation.transpose() * b.rotation).trace();
    ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

pub fn translation_error(a: &RigidPose, b: &RigidPose) -> f64 {
    (a.translation - b.translation).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
    use std::f64::consts::PI;

    fn rotated(axis: Vector3<f64>, angle: f64) -> RigidPose {
        let axis = Unit::new_normalize(axis);
        RigidPose::new(
            Rotation3::from_axis_angle(&axis, angle).into_inner(),
            Vector3::zeros(),
        )
    }

    fn axes() -> Vec<Vector3<f64>> {
        vec![
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-0.3, 0.8, 0.5),
            Vector3::new(2.0, -1.0, 3.0),
        ]
    }

    #[test]
    fn test_identical_poses_have_zero_error() {
        let evaluator = PoseErrorEvaluator::default();
        for axis in axes() {
            let mut pose = rotated(axis, 1.234);
            pose.translation = Vector3::new(15.0, -35.0, 515.0);

            let err = evaluator.evaluate(&pose, &pose);
            assert_relative_eq!(err.rotation_error, 0.0, epsilon = 1e-6);
            assert_eq!(err.translation_error, 0.0);
            assert!(err.success);
        }
    }

    #[test]
    fn test_identity_example() {
        let err = PoseErrorEvaluator::default()
            .evaluate(&RigidPose::identity(), &RigidPose::identity());
        assert_eq!(err.rotation_error, 0.0);
        assert_eq!(err.translation_error, 0.0);
        assert!(err.success);
    }

    #[test]
    fn test_rotation_error_equals_angle() {
        for axis in axes() {
            for step in 0..=20 {
                let theta = PI * step as f64 / 20.0;
                let base = rotated(Vector3::new(0.2, 0.1, -1.0), 0.4);
                let delta = rotated(axis, theta);
                let moved = base.compose(&delta);

                assert_relative_eq!(rotation_error(&base, &moved), theta, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_rotation_error_is_symmetric() {
        let a = rotated(Vector3::new(1.0, 2.0, 3.0), 0.9);
        let b = rotated(Vector3::new(-2.0, 0.5, 1.0), 2.1);
        assert_relative_eq!(
            rotation_error(&a, &b),
            rotation_error(&b, &a),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_acos_argument_is_clamped() {
        // Slightly scaled identity: trace = 3.0000003, argument > 1.
        let a = RigidPose::new(Matrix3::identity() * 1.00000005, Vector3::zeros());
        let err = rotation_error(&a, &RigidPose::identity());
        assert!(!err.is_nan());
        assert_eq!(err, 0.0);

        // Half-turn scaled past -1.
        let flip = RigidPose::new(
            Matrix3::from_diagonal(&Vector3::new(-1.0000001, -1.0000001, 1.0)),
            Vector3::zeros(),
        );
        let err = rotation_error(&flip, &RigidPose::identity());
        assert_relative_eq!(err, PI, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_threshold_is_inclusive() {
        let evaluator = PoseErrorEvaluator::default();
        let gt = RigidPose::identity();

        let at_threshold = gt.translated(Vector3::new(30.0, 40.0, 0.0));
        let err = evaluator.evaluate(&at_threshold, &gt);
        assert_eq!(err.translation_error, 50.0);
        assert!(err.success);

        let beyond = gt.translated(Vector3::new(0.0, 0.0, 50.001));
        assert!(!evaluator.evaluate(&beyond, &gt).success);
    }

    #[test]
    fn test_rotation_threshold() {
        let evaluator = PoseErrorEvaluator::default();
        let gt = RigidPose::identity();

        let small = rotated(Vector3::z(), 4.9_f64.to_radians());
        assert!(evaluator.evaluate(&small, &gt).success);

        let large = rotated(Vector3::z(), 5.1_f64.to_radians());
        let err = evaluator.evaluate(&large, &gt);
        assert!(!err.success);
        assert_relative_eq!(err.rotation_error, 5.1_f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_nan_pose_fails() {
        let gt = RigidPose::identity();
        let bad = gt.translated(Vector3::new(f64::NAN, 0.0, 0.0));
        assert!(!PoseErrorEvaluator::default().evaluate(&bad, &gt).success);
    }

    #[test]
    fn test_default_thresholds() {
        let evaluator = PoseErrorEvaluator::default();
        assert_eq!(evaluator.trans_threshold, 50.0);
        assert_relative_eq!(evaluator.rot_threshold, 5.0 * PI / 180.0, epsilon = 1e-15);
    }
}
