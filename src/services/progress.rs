//! Benchmark progress reporting
//!
//! The harness reports each call to a [`BenchmarkProgress`] observer so
//! frontends can draw their own progress display. The library default is
//! [`NoOpProgress`].

use crate::types::{BenchmarkResult, BenchmarkSample};

/// Observer for benchmark runs
///
/// Methods are called from the task running the benchmark, in call order.
pub trait BenchmarkProgress: Send + Sync {
    /// A run is about to start
    fn on_start(&self, _warmup_count: usize, _sample_count: usize) {}

    /// Warm-up call `index` (1-based) finished
    fn on_warmup(&self, index: usize);

    /// Timed call finished
    fn on_sample(&self, sample: &BenchmarkSample);

    /// All samples were collected
    fn on_complete(&self, result: &BenchmarkResult);
}

/// Progress observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgress;

impl BenchmarkProgress for NoOpProgress {
    fn on_warmup(&self, _index: usize) {}

    fn on_sample(&self, _sample: &BenchmarkSample) {}

    fn on_complete(&self, _result: &BenchmarkResult) {}
}
