//! Evaluation of one configuration: tracker frame loop, scoring and
//! recovery.

mod evaluation;
pub mod slot;

pub use evaluation::{DriverOptions, EvaluationDriver};
pub use slot::BodySlot;
