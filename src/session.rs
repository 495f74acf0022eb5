//! Caller-facing flows: mask/cutout generation and benchmarking
//!
//! A session runs at most one operation at a time. Starting a second one
//! while the first is in flight fails with [`SegDemoError::Busy`] instead of
//! queueing.

use crate::{
    benchmark::BenchmarkHarness,
    compositor::MaskCompositor,
    config::{BenchmarkConfig, CompositeConfig, QualityPreset},
    error::{Result, SegDemoError},
    orientation::OrientationNormalizer,
    segmenter::Segmenter,
    services::progress::BenchmarkProgress,
    types::{BenchmarkResult, CutoutResult, Image, Mask},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// "Operation running" flag shared by every flow of a session
#[derive(Debug, Default)]
pub struct OperationFlag {
    running: AtomicBool,
}

impl OperationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `operation` as running
    ///
    /// # Errors
    /// - `Busy` when another operation holds the flag
    pub fn try_begin(&self, operation: &str) -> Result<OperationGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::debug!(operation, "Refusing overlapping operation");
                SegDemoError::busy(operation)
            })?;
        Ok(OperationGuard { flag: self })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Clears the [`OperationFlag`] when dropped, on success and failure alike
#[derive(Debug)]
pub struct OperationGuard<'a> {
    flag: &'a OperationFlag,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.flag.running.store(false, Ordering::Release);
    }
}

/// Runs the cutout and benchmark flows against one segmenter
pub struct SegmentationSession {
    segmenter: Arc<dyn Segmenter>,
    compositor: MaskCompositor,
    harness: BenchmarkHarness,
    flag: OperationFlag,
}

impl std::fmt::Debug for SegmentationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationSession")
            .field("segmenter", &self.segmenter.name())
            .field("compositor", &self.compositor)
            .field("harness", &self.harness)
            .field("running", &self.flag.is_running())
            .finish()
    }
}

impl SegmentationSession {
    /// Session with default compositing and benchmark settings
    #[must_use]
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            segmenter,
            compositor: MaskCompositor::default(),
            harness: BenchmarkHarness::default(),
            flag: OperationFlag::new(),
        }
    }

    #[must_use]
    pub fn with_composite_config(mut self, config: CompositeConfig) -> Self {
        self.compositor = MaskCompositor::new(config);
        self
    }

    #[must_use]
    pub fn with_benchmark_config(mut self, config: BenchmarkConfig) -> Self {
        self.harness = self.harness.with_config(config);
        self
    }

    /// Report benchmark progress to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn BenchmarkProgress>) -> Self {
        self.harness = self.harness.with_progress(progress);
        self
    }

    #[must_use]
    pub fn segmenter(&self) -> &dyn Segmenter {
        self.segmenter.as_ref()
    }

    /// Whether an operation is currently in flight
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// Normalize orientation and segment, returning the upright image and its mask
    ///
    /// # Errors
    /// - `Busy` when another operation is running
    /// - `Model` from the segmenter
    pub async fn generate_mask(
        &self,
        image: Image,
        quality: QualityPreset,
    ) -> Result<(Image, Mask)> {
        let _guard = self.flag.try_begin("generate mask")?;
        self.segment_upright(image, quality).await
    }

    /// Full mask/cutout flow: normalize, segment, composite over white
    ///
    /// # Errors
    /// - `Busy` when another operation is running
    /// - `Model` from the segmenter
    /// - `Decode`/`Resample` from the compositor
    pub async fn cutout(&self, image: Image, quality: QualityPreset) -> Result<CutoutResult> {
        let _guard = self.flag.try_begin("cutout")?;
        let (original, mask) = self.segment_upright(image, quality).await?;

        let cutout = self.compositor.composite(&original, &mask)?;
        let stats = mask.statistics();
        tracing::info!(
            width = cutout.width(),
            height = cutout.height(),
            foreground_ratio = stats.foreground_ratio,
            "Cutout generated"
        );

        Ok(CutoutResult {
            original,
            mask,
            cutout,
            quality,
        })
    }

    /// Benchmark the session's segmenter on `image`
    ///
    /// # Errors
    /// - `Busy` when another operation is running
    /// - `InvalidConfig`/`AbortedRun` from the harness
    pub async fn benchmark(&self, image: Image, quality: QualityPreset) -> Result<BenchmarkResult> {
        let _guard = self.flag.try_begin("benchmark")?;
        self.harness
            .run(self.segmenter.as_ref(), image, quality)
            .await
    }

    /// Benchmark every quality preset in turn as one operation
    ///
    /// # Errors
    /// - Same as [`benchmark`](Self::benchmark); the first failure ends the run
    pub async fn benchmark_all_qualities(&self, image: Image) -> Result<Vec<BenchmarkResult>> {
        let _guard = self.flag.try_begin("benchmark")?;
        self.harness
            .run_all_qualities(self.segmenter.as_ref(), image)
            .await
    }

    async fn segment_upright(&self, image: Image, quality: QualityPreset) -> Result<(Image, Mask)> {
        let upright = OrientationNormalizer.normalize(image);
        tracing::debug!(
            segmenter = self.segmenter.name(),
            %quality,
            width = upright.width(),
            height = upright.height(),
            "Segmenting"
        );
        let mask = self.segmenter.segment(&upright, quality).await?;
        Ok((upright, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockSegmenter;
    use crate::types::Orientation;
    use crate::types::BenchmarkSample;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::sync::atomic::AtomicUsize;

    fn portrait() -> Image {
        Image::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            30,
            40,
            Rgb([20, 120, 220]),
        )))
    }

    #[test]
    fn test_flag_is_exclusive_and_released() {
        let flag = OperationFlag::new();
        {
            let _guard = flag.try_begin("first").unwrap();
            assert!(flag.is_running());
            let error = flag.try_begin("second").unwrap_err();
            assert!(matches!(error, SegDemoError::Busy(ref op) if op == "second"));
        }
        assert!(!flag.is_running());
        assert!(flag.try_begin("third").is_ok());
    }

    #[tokio::test]
    async fn test_cutout_flow() {
        let segmenter = Arc::new(MockSegmenter::new());
        let session = SegmentationSession::new(segmenter.clone());

        let result = session
            .cutout(portrait().with_orientation(Orientation::Rotate270), QualityPreset::Fast)
            .await
            .unwrap();

        assert_eq!(result.original.dimensions(), (40, 30));
        assert_eq!(result.original.orientation(), Orientation::Identity);
        assert_eq!(result.mask.dimensions, (20, 15));
        assert_eq!(result.cutout.dimensions(), (40, 30));
        assert_eq!(result.quality, QualityPreset::Fast);
        // Corners are background, so they turn white.
        assert_eq!(result.cutout.pixel(0, 0), Some(&[255u8, 255, 255][..]));
        assert_eq!(segmenter.call_history(), vec![QualityPreset::Fast]);
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_flag_released_after_failure() {
        let session =
            SegmentationSession::new(Arc::new(MockSegmenter::builder().fail_on_call(1).build()));

        let error = session
            .generate_mask(portrait(), QualityPreset::Balanced)
            .await
            .unwrap_err();
        assert!(matches!(error, SegDemoError::Model(_)));
        assert!(!session.is_running());

        assert!(session
            .generate_mask(portrait(), QualityPreset::Balanced)
            .await
            .is_ok());
    }

    #[derive(Default)]
    struct SampleCounter {
        samples: AtomicUsize,
    }

    impl BenchmarkProgress for SampleCounter {
        fn on_warmup(&self, _index: usize) {}

        fn on_sample(&self, _sample: &BenchmarkSample) {
            self.samples.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, _result: &BenchmarkResult) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_benchmark_config_keeps_progress_observer() {
        let counter = Arc::new(SampleCounter::default());
        let config = BenchmarkConfig::builder()
            .warmup_count(1)
            .sample_count(6)
            .build()
            .unwrap();
        let session = SegmentationSession::new(Arc::new(MockSegmenter::new()))
            .with_progress(counter.clone())
            .with_benchmark_config(config);

        let result = session
            .benchmark(portrait(), QualityPreset::Fast)
            .await
            .unwrap();

        assert_eq!(result.sample_count(), 6);
        assert_eq!(counter.samples.load(Ordering::SeqCst), 6);
    }
}
