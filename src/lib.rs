#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # segdemo
//!
//! Person segmentation demo library: white-background cutouts and per-frame
//! latency benchmarks on top of an external segmentation capability.
//!
//! The segmenter itself is not part of this crate. Anything implementing the
//! async [`Segmenter`] trait can be plugged in; [`MockSegmenter`] is a
//! deterministic stand-in used by the CLI and the tests.
//!
//! ## Features
//!
//! - **Orientation**: quarter-turn EXIF orientations are rotated upright before segmentation
//! - **Compositing**: masks of any resolution are resampled and blended over white
//! - **Benchmarking**: warm-up plus timed calls, with 5 s / 15 s video cost estimates at 30 fps
//! - **Single operation**: a [`SegmentationSession`] refuses overlapping operations with `Busy`
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use segdemo::{ImageIOService, MockSegmenter, QualityPreset, SegmentationSession};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = SegmentationSession::new(Arc::new(MockSegmenter::new()));
//!
//! let image = ImageIOService::load_image("portrait.jpg")?;
//! let result = session.cutout(image.clone(), QualityPreset::Balanced).await?;
//! ImageIOService::save_image(&result.cutout, "cutout.png")?;
//!
//! let benchmark = session.benchmark(image, QualityPreset::Fast).await?;
//! println!("{}", benchmark.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bars and tracing subscriber setup
//! - `tracing-json`: JSON log output for the CLI
//! - `tracing-files`: log file output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! segdemo = { version = "0.1", default-features = false }
//! ```

pub mod backends;
pub mod benchmark;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod device;
pub mod error;
pub mod orientation;
pub mod segmenter;
pub mod services;
pub mod session;
pub mod tracing_config;
pub mod types;

use tokio::io::AsyncRead;

// Public API exports
pub use backends::{MockSegmenter, MockSegmenterBuilder};
pub use benchmark::{run_benchmark, BenchmarkHarness};
pub use compositor::{composite, MaskCompositor};
pub use config::{
    BenchmarkConfig, BenchmarkConfigBuilder, BlendPathway, CompositeConfig, QualityPreset,
    ResampleFilter,
};
pub use device::DeviceInfo;
pub use error::{BenchmarkPhase, Result, SegDemoError};
pub use orientation::{normalize, OrientationNormalizer};
pub use segmenter::Segmenter;
pub use services::{
    BenchmarkProgress, DirectorySink, ImageIOService, ImageSink, NoOpProgress, SaveKind,
};
pub use session::{OperationFlag, OperationGuard, SegmentationSession};
pub use tracing_config::{TracingConfig, TracingFormat, TracingOutput};
pub use types::{
    BenchmarkResult, BenchmarkSample, ChannelLayout, CutoutResult, Image, Mask, MaskStatistics,
    Orientation,
};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;

/// Run the mask/cutout flow once with default compositing
///
/// Orientation is normalized, the image is segmented at `quality` and the
/// original is blended over white using the mask.
///
/// # Examples
/// ```rust,no_run
/// use segdemo::{generate_cutout, Image, MockSegmenter, QualityPreset};
/// use image::DynamicImage;
///
/// # async fn example() -> segdemo::Result<()> {
/// let image = Image::new(DynamicImage::new_rgb8(640, 480));
/// let result = generate_cutout(&MockSegmenter::new(), image, QualityPreset::Fast).await?;
/// assert_eq!(result.cutout.dimensions(), (640, 480));
/// # Ok(())
/// # }
/// ```
pub async fn generate_cutout<S>(
    segmenter: &S,
    image: Image,
    quality: QualityPreset,
) -> Result<CutoutResult>
where
    S: Segmenter + ?Sized,
{
    let original = normalize(image);
    let mask = segmenter.segment(&original, quality).await?;
    let cutout = composite(&original, &mask)?;
    Ok(CutoutResult {
        original,
        mask,
        cutout,
        quality,
    })
}

/// Run the mask/cutout flow on encoded image bytes (PNG, JPEG, TIFF)
///
/// The EXIF orientation of the bytes is honored.
pub async fn generate_cutout_from_bytes<S>(
    segmenter: &S,
    image_bytes: &[u8],
    quality: QualityPreset,
) -> Result<CutoutResult>
where
    S: Segmenter + ?Sized,
{
    let image = ImageIOService::load_image_from_bytes(image_bytes)?;
    generate_cutout(segmenter, image, quality).await
}

/// Run the mask/cutout flow on an async stream of encoded image bytes
pub async fn generate_cutout_from_reader<S, R>(
    segmenter: &S,
    mut reader: R,
    quality: QualityPreset,
) -> Result<CutoutResult>
where
    S: Segmenter + ?Sized,
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;
    generate_cutout_from_bytes(segmenter, &buffer, quality).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let buffer = RgbImage::from_pixel(width, height, Rgb([90, 60, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_generate_cutout_from_bytes() {
        let segmenter = MockSegmenter::new();
        let result =
            generate_cutout_from_bytes(&segmenter, &encoded_png(32, 24), QualityPreset::Accurate)
                .await
                .unwrap();

        assert_eq!(result.cutout.dimensions(), (32, 24));
        assert_eq!(result.mask.dimensions, (16, 12));
        assert_eq!(result.quality, QualityPreset::Accurate);
    }

    #[tokio::test]
    async fn test_generate_cutout_from_reader() {
        let bytes = encoded_png(10, 10);
        let result = generate_cutout_from_reader(
            &MockSegmenter::new(),
            Cursor::new(bytes),
            QualityPreset::Fast,
        )
        .await
        .unwrap();
        assert_eq!(result.original.dimensions(), (10, 10));
    }

    #[tokio::test]
    async fn test_undecodable_bytes() {
        let result =
            generate_cutout_from_bytes(&MockSegmenter::new(), b"garbage", QualityPreset::Fast)
                .await;
        assert!(matches!(result, Err(SegDemoError::Image(_))));
    }
}
