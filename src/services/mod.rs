//! Services around the core flows
//!
//! File I/O, the save-to-library sink and benchmark progress reporting are
//! kept out of the compositing and benchmarking logic so frontends can swap
//! them out.

pub mod io;
pub mod progress;
pub mod sink;

pub use io::ImageIOService;
pub use progress::{BenchmarkProgress, NoOpProgress};
pub use sink::{DirectorySink, ImageSink, SaveKind};
