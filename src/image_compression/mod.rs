//! Image recompression used by the image rewrite filter
//!
//! Both optimizers only report success when their output is strictly smaller
//! than their input, so callers never publish a regression.

pub mod jpeg;
pub mod png;

pub use jpeg::optimize_jpeg;
pub use png::{PngOptimizer, PngReader};
