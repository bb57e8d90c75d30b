//! Process-level resources shared by evaluation runs: the offscreen render
//! context and cancellation.

pub mod cancel;
pub mod render;

pub use cancel::CancelToken;
pub use render::{RenderContext, RenderGuard};
