//! Segmenter implementations shipped with the crate
//!
//! Real segmentation models live outside this crate and plug in through the
//! [`Segmenter`](crate::Segmenter) trait. The mock backend is a deterministic
//! stand-in used by the CLI demo, benchmarks and tests.

pub mod mock;

pub use self::mock::{MockSegmenter, MockSegmenterBuilder};
