//! Geometry primitives: rigid poses of tracked bodies.

pub mod pose;

pub use pose::RigidPose;
