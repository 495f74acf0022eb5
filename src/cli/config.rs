//! Conversion of CLI arguments into library configuration

use crate::cli::main_impl::{BenchArgs, CliBlendPathway, CliFilter, CutoutArgs};
use crate::{
    backends::MockSegmenter,
    config::{BenchmarkConfig, BlendPathway, CompositeConfig, QualityPreset, ResampleFilter},
};
use anyhow::{Context, Result};
use std::time::Duration;

/// Build library configuration from CLI arguments
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    pub(crate) fn composite_config(args: &CutoutArgs) -> CompositeConfig {
        CompositeConfig::default()
            .with_filter(match args.filter {
                CliFilter::Nearest => ResampleFilter::Nearest,
                CliFilter::Bilinear => ResampleFilter::Bilinear,
            })
            .with_pathway(match args.pathway {
                CliBlendPathway::Vectorized => BlendPathway::Vectorized,
                CliBlendPathway::Scanline => BlendPathway::Scanline,
            })
    }

    /// Benchmark settings: defaults, then the `--config` file, then explicit flags
    pub(crate) fn benchmark_config(args: &BenchArgs) -> Result<BenchmarkConfig> {
        let base = match &args.config {
            Some(path) => BenchmarkConfig::from_json_file(path).with_context(|| {
                format!("Failed to load benchmark config from {}", path.display())
            })?,
            None => BenchmarkConfig::default(),
        };

        let mut builder = BenchmarkConfig::builder()
            .warmup_count(base.warmup_count)
            .sample_count(base.sample_count);
        if let Some(warmup) = args.warmup {
            builder = builder.warmup_count(warmup);
        }
        if let Some(samples) = args.samples {
            builder = builder.sample_count(samples);
        }

        builder.build().context("Invalid benchmark settings")
    }

    /// Presets to benchmark, in run order
    pub(crate) fn qualities(args: &BenchArgs) -> Vec<QualityPreset> {
        if args.all_qualities {
            QualityPreset::ALL.to_vec()
        } else {
            vec![args.quality]
        }
    }

    pub(crate) fn mock_segmenter(latency_ms: u64) -> MockSegmenter {
        MockSegmenter::builder()
            .latency(Duration::from_millis(latency_ms))
            .build()
    }
}
