//! Segmentation latency benchmark
//!
//! A run normalizes the image once, performs a few discarded warm-up calls
//! and then a fixed number of timed calls, all strictly sequential. Any
//! failing call aborts the whole run; partial samples are never reported.

use crate::{
    config::{BenchmarkConfig, QualityPreset},
    error::{BenchmarkPhase, Result, SegDemoError},
    orientation::OrientationNormalizer,
    segmenter::Segmenter,
    services::progress::{BenchmarkProgress, NoOpProgress},
    types::{BenchmarkResult, BenchmarkSample, Image},
};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::Instrument;

/// Measures per-frame segmentation latency
#[derive(Clone)]
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
    progress: Arc<dyn BenchmarkProgress>,
}

impl std::fmt::Debug for BenchmarkHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkHarness")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new(BenchmarkConfig::default())
    }
}

impl BenchmarkHarness {
    #[must_use]
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Replace the call counts, keeping the progress observer
    #[must_use]
    pub fn with_config(mut self, config: BenchmarkConfig) -> Self {
        self.config = config;
        self
    }

    /// Report warm-up and sample calls to `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn BenchmarkProgress>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Benchmark `segmenter` on `image` at `quality`
    ///
    /// Each sample is the wall time from just before to just after one
    /// awaited `segment` call, in milliseconds.
    ///
    /// # Errors
    /// - `InvalidConfig` when the configuration does not validate
    /// - `AbortedRun` when any warm-up or timed call fails; the source is the
    ///   segmenter's error
    pub async fn run<S>(
        &self,
        segmenter: &S,
        image: Image,
        quality: QualityPreset,
    ) -> Result<BenchmarkResult>
    where
        S: Segmenter + ?Sized,
    {
        self.config.validate()?;

        let image = OrientationNormalizer.normalize(image);
        let resolution = image.dimensions();
        let span = tracing::debug_span!(
            "benchmark",
            segmenter = segmenter.name(),
            %quality,
            width = resolution.0,
            height = resolution.1
        );

        async move {
            let BenchmarkConfig {
                warmup_count,
                sample_count,
            } = self.config;
            self.progress.on_start(warmup_count, sample_count);

            for index in 1..=warmup_count {
                segmenter
                    .segment(&image, quality)
                    .await
                    .map_err(|e| abort(BenchmarkPhase::Warmup, index, e))?;
                self.progress.on_warmup(index);
            }
            tracing::debug!(warmup_count, "Warm-up finished");

            let mut samples = Vec::with_capacity(sample_count);
            for index in 1..=sample_count {
                let start = Instant::now();
                let outcome = segmenter.segment(&image, quality).await;
                let elapsed = start.elapsed();
                outcome.map_err(|e| abort(BenchmarkPhase::Sampling, index, e))?;

                let sample = BenchmarkSample {
                    index,
                    latency_ms: elapsed.as_nanos() as f64 / 1_000_000.0,
                };
                tracing::debug!(index, latency_ms = sample.latency_ms, "Sample");
                self.progress.on_sample(&sample);
                samples.push(sample);
            }

            let result =
                BenchmarkResult::from_samples(resolution, quality, segmenter.name(), samples)?;
            tracing::info!(
                mean_ms = result.mean_latency_ms,
                min_ms = result.min_latency_ms,
                max_ms = result.max_latency_ms,
                estimated_5s_secs = result.estimated_5s_secs(),
                estimated_15s_secs = result.estimated_15s_secs(),
                "Benchmark completed"
            );
            self.progress.on_complete(&result);
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Run once per preset in [`QualityPreset::ALL`], stopping at the first failure
    pub async fn run_all_qualities<S>(
        &self,
        segmenter: &S,
        image: Image,
    ) -> Result<Vec<BenchmarkResult>>
    where
        S: Segmenter + ?Sized,
    {
        let mut results = Vec::with_capacity(QualityPreset::ALL.len());
        for quality in QualityPreset::ALL {
            results.push(self.run(segmenter, image.clone(), quality).await?);
        }
        Ok(results)
    }
}

fn abort(phase: BenchmarkPhase, index: usize, error: SegDemoError) -> SegDemoError {
    tracing::warn!(%phase, index, error = %error, "Benchmark run aborted");
    SegDemoError::aborted_run(phase, index, error)
}

/// Benchmark with the default configuration (3 warm-ups, 10 samples)
pub async fn run_benchmark<S>(
    segmenter: &S,
    image: Image,
    quality: QualityPreset,
) -> Result<BenchmarkResult>
where
    S: Segmenter + ?Sized,
{
    BenchmarkHarness::default().run(segmenter, image, quality).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockSegmenter;
    use crate::types::Orientation;
    use image::DynamicImage;
    use std::sync::Mutex;
    use std::time::Duration;

    fn landscape() -> Image {
        Image::new(DynamicImage::new_rgb8(64, 48))
    }

    #[derive(Default)]
    struct Recorder {
        warmups: Mutex<Vec<usize>>,
        samples: Mutex<Vec<usize>>,
        completed: Mutex<usize>,
    }

    impl BenchmarkProgress for Recorder {
        fn on_warmup(&self, index: usize) {
            self.warmups.lock().unwrap().push(index);
        }

        fn on_sample(&self, sample: &BenchmarkSample) {
            self.samples.lock().unwrap().push(sample.index);
        }

        fn on_complete(&self, _result: &BenchmarkResult) {
            *self.completed.lock().unwrap() += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_latency_gives_exact_statistics() {
        let segmenter = MockSegmenter::builder()
            .latency(Duration::from_millis(25))
            .build();

        let result = run_benchmark(&segmenter, landscape(), QualityPreset::Fast)
            .await
            .unwrap();

        assert_eq!(result.sample_count(), 10);
        assert!((result.mean_latency_ms - 25.0).abs() < 1e-6);
        assert_eq!(result.min_latency_ms, result.mean_latency_ms);
        assert_eq!(result.max_latency_ms, result.mean_latency_ms);
        assert_eq!(segmenter.call_count(), 13);
        assert_eq!(result.segmenter, "mock");
        assert_eq!(result.resolution, (64, 48));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_is_recorded_after_normalization() {
        let segmenter = MockSegmenter::new();
        let image = landscape().with_orientation(Orientation::Rotate90);

        let result = run_benchmark(&segmenter, image, QualityPreset::Balanced)
            .await
            .unwrap();
        assert_eq!(result.resolution, (48, 64));
    }

    #[tokio::test(start_paused = true)]
    async fn test_warmup_failure_aborts() {
        let segmenter = MockSegmenter::builder().fail_on_call(2).build();

        let error = run_benchmark(&segmenter, landscape(), QualityPreset::Fast)
            .await
            .unwrap_err();

        match error {
            SegDemoError::AbortedRun { phase, index, .. } => {
                assert_eq!(phase, BenchmarkPhase::Warmup);
                assert_eq!(index, 2);
            },
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(segmenter.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_reported_in_order() {
        let recorder = Arc::new(Recorder::default());
        let config = BenchmarkConfig::builder()
            .warmup_count(2)
            .sample_count(4)
            .build()
            .unwrap();
        let harness = BenchmarkHarness::new(config).with_progress(recorder.clone());

        harness
            .run(&MockSegmenter::new(), landscape(), QualityPreset::Accurate)
            .await
            .unwrap();

        assert_eq!(*recorder.warmups.lock().unwrap(), vec![1, 2]);
        assert_eq!(*recorder.samples.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(*recorder.completed.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_config_keeps_progress() {
        let recorder = Arc::new(Recorder::default());
        let config = BenchmarkConfig::builder()
            .warmup_count(0)
            .sample_count(3)
            .build()
            .unwrap();
        let harness = BenchmarkHarness::default()
            .with_progress(recorder.clone())
            .with_config(config);
        assert_eq!(harness.config().sample_count, 3);

        harness
            .run(&MockSegmenter::new(), landscape(), QualityPreset::Fast)
            .await
            .unwrap();

        assert!(recorder.warmups.lock().unwrap().is_empty());
        assert_eq!(*recorder.samples.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_is_rejected_before_calls() {
        let config = BenchmarkConfig {
            warmup_count: 0,
            sample_count: 0,
        };
        let segmenter = MockSegmenter::new();
        let result = BenchmarkHarness::new(config)
            .run(&segmenter, landscape(), QualityPreset::Fast)
            .await;

        assert!(matches!(result, Err(SegDemoError::InvalidConfig(_))));
        assert_eq!(segmenter.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_qualities() {
        let segmenter = MockSegmenter::new();
        let results = BenchmarkHarness::default()
            .run_all_qualities(&segmenter, landscape())
            .await
            .unwrap();

        let qualities: Vec<_> = results.iter().map(|r| r.quality).collect();
        assert_eq!(qualities, QualityPreset::ALL.to_vec());
        assert_eq!(segmenter.call_count(), 39);
    }
}
