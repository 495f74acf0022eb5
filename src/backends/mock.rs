//! Mock segmenter for demos and tests
//!
//! Produces a soft elliptical "portrait" silhouette after a fixed artificial
//! latency. Failures can be injected at a given call to exercise abort paths.

use crate::{
    config::QualityPreset,
    error::{Result, SegDemoError},
    segmenter::Segmenter,
    types::{Image, Mask},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Deterministic segmenter with configurable latency and failure injection
#[derive(Debug)]
pub struct MockSegmenter {
    latency: Duration,
    /// Mask resolution relative to the input, in (0, 1]
    mask_scale: f32,
    /// 1-based call number that fails, counted over all calls
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    /// Presets seen, in call order
    call_history: Mutex<Vec<QualityPreset>>,
}

impl MockSegmenter {
    /// Instant segmenter producing masks at half the input resolution
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> MockSegmenterBuilder {
        MockSegmenterBuilder::default()
    }

    /// Number of `segment` calls so far, failed ones included
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Presets passed to `segment`, in call order
    pub fn call_history(&self) -> Vec<QualityPreset> {
        self.call_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn mask_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.mask_scale).round() as u32).max(1);
        (scale(width), scale(height))
    }
}

impl Default for MockSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Segmenter for MockSegmenter {
    async fn segment(&self, image: &Image, quality: QualityPreset) -> Result<Mask> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut history) = self.call_history.lock() {
            history.push(quality);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_on_call == Some(call) {
            return Err(SegDemoError::model(format!(
                "mock segmenter failure injected on call {}",
                call
            )));
        }

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegDemoError::model("input image has no pixels"));
        }

        let (mask_width, mask_height) = self.mask_dimensions(width, height);
        silhouette(mask_width, mask_height, feather_for(quality))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Builder for `MockSegmenter`
#[derive(Debug)]
pub struct MockSegmenterBuilder {
    latency: Duration,
    mask_scale: f32,
    fail_on_call: Option<usize>,
}

impl Default for MockSegmenterBuilder {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            mask_scale: 0.5,
            fail_on_call: None,
        }
    }
}

impl MockSegmenterBuilder {
    /// Artificial latency of every call
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Mask resolution relative to the input; clamped to (0, 1]
    #[must_use]
    pub fn mask_scale(mut self, scale: f32) -> Self {
        self.mask_scale = if scale.is_finite() {
            scale.clamp(0.01, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Fail the `call`-th call (1-based, warm-up calls included)
    #[must_use]
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    #[must_use]
    pub fn build(self) -> MockSegmenter {
        MockSegmenter {
            latency: self.latency,
            mask_scale: self.mask_scale,
            fail_on_call: self.fail_on_call,
            calls: AtomicUsize::new(0),
            call_history: Mutex::new(Vec::new()),
        }
    }
}

/// Edge softness as a fraction of the ellipse radius
fn feather_for(quality: QualityPreset) -> f32 {
    match quality {
        QualityPreset::Fast => 0.0,
        QualityPreset::Balanced => 0.08,
        QualityPreset::Accurate => 0.15,
    }
}

/// Upright ellipse covering the central 60% x 90% of the frame
fn silhouette(width: u32, height: u32, feather: f32) -> Result<Mask> {
    let center_x = (width as f32 - 1.0) / 2.0;
    let center_y = (height as f32 - 1.0) / 2.0;
    let radius_x = (width as f32 * 0.3).max(0.5);
    let radius_y = (height as f32 * 0.45).max(0.5);

    let mut probabilities = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f32 - center_x) / radius_x;
            let dy = (y as f32 - center_y) / radius_y;
            let distance = (dx * dx + dy * dy).sqrt();

            let weight = if feather <= 0.0 {
                if distance <= 1.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                ((1.0 - distance) / feather).clamp(0.0, 1.0)
            };
            probabilities.push(weight);
        }
    }

    Mask::from_probabilities(&probabilities, width, height)
}
