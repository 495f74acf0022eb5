//! Configuration types for compositing and benchmarking

use crate::error::{Result, SegDemoError};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Segmentation quality preset handed opaquely to the segmenter
///
/// The preset only trades speed for accuracy inside the segmenter; to this
/// crate it is a label carried on results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Fast,
    Balanced,
    Accurate,
}

impl QualityPreset {
    /// All presets, fastest first
    pub const ALL: [QualityPreset; 3] = [Self::Fast, Self::Balanced, Self::Accurate];

    /// Human-readable name used in summaries
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Balanced => "Balanced",
            Self::Accurate => "Accurate",
        }
    }
}

impl Default for QualityPreset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = SegDemoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "accurate" => Ok(Self::Accurate),
            other => Err(SegDemoError::invalid_config(format!(
                "Unknown quality preset '{}' (expected fast, balanced or accurate)",
                other
            ))),
        }
    }
}

/// Filter used when a mask has to be resampled to the original's size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
}

impl ResampleFilter {
    pub(crate) fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
        }
    }
}

impl Default for ResampleFilter {
    fn default() -> Self {
        Self::Bilinear
    }
}

/// Pixel blending pathway used by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendPathway {
    /// Array-based blend over the whole buffer; falls back to `Scanline`
    /// when the buffers cannot be viewed as arrays
    Vectorized,
    /// Row-by-row software blend through a bottom-left-origin canvas
    Scanline,
}

impl Default for BlendPathway {
    fn default() -> Self {
        Self::Vectorized
    }
}

/// Configuration for white-background compositing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Filter for mask resampling when sizes differ
    #[serde(default)]
    pub filter: ResampleFilter,

    /// Preferred blend pathway
    #[serde(default)]
    pub pathway: BlendPathway,
}

impl CompositeConfig {
    #[must_use]
    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_pathway(mut self, pathway: BlendPathway) -> Self {
        self.pathway = pathway;
        self
    }
}

/// Upper bound on warm-up and sample counts
pub const MAX_BENCHMARK_CALLS: usize = 1000;

/// Configuration for a benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Discarded calls before measurement starts
    #[serde(default = "default_warmup_count")]
    pub warmup_count: usize,

    /// Timed calls aggregated into the result
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
}

fn default_warmup_count() -> usize {
    3
}

fn default_sample_count() -> usize {
    10
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            warmup_count: default_warmup_count(),
            sample_count: default_sample_count(),
        }
    }
}

impl BenchmarkConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use segdemo::BenchmarkConfig;
    ///
    /// let config = BenchmarkConfig::builder()
    ///     .warmup_count(1)
    ///     .sample_count(25)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.sample_count, 25);
    /// ```
    #[must_use]
    pub fn builder() -> BenchmarkConfigBuilder {
        BenchmarkConfigBuilder::default()
    }

    /// Validate call counts
    ///
    /// # Errors
    /// - `sample_count` is zero or above [`MAX_BENCHMARK_CALLS`]
    /// - `warmup_count` is above [`MAX_BENCHMARK_CALLS`]
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 || self.sample_count > MAX_BENCHMARK_CALLS {
            return Err(SegDemoError::config_value_error(
                "sample count",
                self.sample_count,
                "1-1000",
                Some(default_sample_count()),
            ));
        }

        if self.warmup_count > MAX_BENCHMARK_CALLS {
            return Err(SegDemoError::config_value_error(
                "warm-up count",
                self.warmup_count,
                "0-1000",
                Some(default_warmup_count()),
            ));
        }

        Ok(())
    }

    /// Load and validate a configuration from a JSON file
    ///
    /// Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| SegDemoError::file_io_error("read benchmark config", path_ref, &e))?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SegDemoError::invalid_config(format!(
                "Failed to parse benchmark config '{}': {}",
                path_ref.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Builder for `BenchmarkConfig`
#[derive(Debug, Default)]
pub struct BenchmarkConfigBuilder {
    config: BenchmarkConfig,
}

impl BenchmarkConfigBuilder {
    /// Set the number of discarded warm-up calls
    #[must_use]
    pub fn warmup_count(mut self, count: usize) -> Self {
        self.config.warmup_count = count;
        self
    }

    /// Set the number of timed sample calls
    #[must_use]
    pub fn sample_count(mut self, count: usize) -> Self {
        self.config.sample_count = count;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<BenchmarkConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
