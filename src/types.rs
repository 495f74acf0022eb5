//! Core types: images, masks and benchmark results

use crate::{
    config::{QualityPreset, ResampleFilter},
    error::{Result, SegDemoError},
};
use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Frame rate assumed when extrapolating video cost
pub const VIDEO_FRAME_RATE: u32 = 30;

/// Frames in a 5 second clip at [`VIDEO_FRAME_RATE`]
pub const SHORT_CLIP_FRAMES: u32 = 5 * VIDEO_FRAME_RATE;

/// Frames in a 15 second clip at [`VIDEO_FRAME_RATE`]
pub const LONG_CLIP_FRAMES: u32 = 15 * VIDEO_FRAME_RATE;

/// Channel layout of an [`Image`], 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Bytes per pixel
    #[must_use]
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Orientation tag describing how stored pixels must be transformed to be upright
///
/// Mirrors the eight EXIF orientation values. Rotations are clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
    Rotate90FlipHorizontal,
    Rotate270FlipHorizontal,
}

impl From<image::metadata::Orientation> for Orientation {
    fn from(value: image::metadata::Orientation) -> Self {
        use image::metadata::Orientation as Exif;
        match value {
            Exif::NoTransforms => Self::Identity,
            Exif::Rotate90 => Self::Rotate90,
            Exif::Rotate180 => Self::Rotate180,
            Exif::Rotate270 => Self::Rotate270,
            Exif::FlipHorizontal => Self::FlipHorizontal,
            Exif::FlipVertical => Self::FlipVertical,
            Exif::Rotate90FlipH => Self::Rotate90FlipHorizontal,
            Exif::Rotate270FlipH => Self::Rotate270FlipHorizontal,
        }
    }
}

/// An owned 8-bit RGB or RGBA image with orientation and pixel scale metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: DynamicImage,
    orientation: Orientation,
    scale: f32,
}

impl Image {
    /// Wrap a decoded image, converting it to RGB8 or RGBA8
    ///
    /// Images with an alpha channel become RGBA8, everything else RGB8.
    #[must_use]
    pub fn new(pixels: DynamicImage) -> Self {
        let pixels = match pixels {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => pixels,
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };

        Self {
            pixels,
            orientation: Orientation::Identity,
            scale: 1.0,
        }
    }

    /// Build an image from a raw interleaved buffer
    ///
    /// # Errors
    /// - `Decode` when the buffer length does not equal `width * height * channels`
    pub fn from_raw(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * layout.channels();
        if data.len() != expected {
            return Err(SegDemoError::decode(format!(
                "{:?} buffer for {}x{} needs {} bytes, got {}",
                layout,
                width,
                height,
                expected,
                data.len()
            )));
        }

        let pixels = match layout {
            ChannelLayout::Rgb => ImageBuffer::from_raw(width, height, data)
                .map(DynamicImage::ImageRgb8),
            ChannelLayout::Rgba => ImageBuffer::from_raw(width, height, data)
                .map(DynamicImage::ImageRgba8),
        }
        .ok_or_else(|| SegDemoError::decode("Failed to create image from raw buffer"))?;

        Ok(Self::new(pixels))
    }

    pub(crate) fn from_parts(pixels: DynamicImage, orientation: Orientation, scale: f32) -> Self {
        let mut image = Self::new(pixels);
        image.orientation = orientation;
        image.scale = scale;
        image
    }

    /// Set the orientation tag
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the pixel scale (density); non-positive or non-finite values reset to 1.0
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        self
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Stored (width, height), before any orientation is applied
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    #[must_use]
    pub fn layout(&self) -> ChannelLayout {
        if self.pixels.color().has_alpha() {
            ChannelLayout::Rgba
        } else {
            ChannelLayout::Rgb
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The underlying RGB8/RGBA8 image
    #[must_use]
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Raw interleaved bytes in row-major order
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_bytes()
    }

    /// Channel values of one pixel, `None` when out of bounds
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let channels = self.layout().channels();
        let start = (y as usize * self.width() as usize + x as usize) * channels;
        self.as_bytes().get(start..start + channels)
    }

    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        self.pixels
    }
}

/// Single-channel foreground weights produced by a segmenter
///
/// 255 is full foreground, 0 is background. The resolution may differ from
/// the image that was segmented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    /// Weights in row-major order
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl Mask {
    /// Create a new mask; the buffer is checked when it is first decoded
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Create a mask with every weight set to `value`
    #[must_use]
    pub fn uniform(width: u32, height: u32, value: u8) -> Self {
        Self::new(vec![value; width as usize * height as usize], (width, height))
    }

    /// Create a mask from a grayscale image
    #[must_use]
    pub fn from_image(image: &GrayImage) -> Self {
        Self::new(image.as_raw().clone(), image.dimensions())
    }

    /// Create a mask from foreground probabilities in `[0, 1]`
    ///
    /// Values are clamped; NaN counts as background.
    ///
    /// # Errors
    /// - `Decode` when `probabilities.len() != width * height`
    pub fn from_probabilities(probabilities: &[f32], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if probabilities.len() != expected {
            return Err(SegDemoError::decode(format!(
                "Probability buffer for {}x{} needs {} values, got {}",
                width,
                height,
                expected,
                probabilities.len()
            )));
        }

        let data = probabilities
            .iter()
            .map(|&p| {
                if p.is_nan() {
                    0
                } else {
                    (p.clamp(0.0, 1.0) * 255.0).round() as u8
                }
            })
            .collect();

        Ok(Self::new(data, (width, height)))
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    /// Weight at `(x, y)`, `None` when out of bounds or the buffer is short
    #[must_use]
    pub fn value(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.data
            .get(y as usize * self.width() as usize + x as usize)
            .copied()
    }

    /// Convert the mask to a grayscale image
    ///
    /// # Errors
    /// - `Decode` when the buffer does not match the dimensions
    pub fn to_image(&self) -> Result<GrayImage> {
        let (width, height) = self.dimensions;
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(width, height, self.data.clone()).ok_or_else(
            || {
                SegDemoError::decode(format!(
                    "Mask buffer of {} bytes does not match {}x{}",
                    self.data.len(),
                    width,
                    height
                ))
            },
        )
    }

    /// Resample the mask to exactly `new_width` x `new_height`
    ///
    /// X and Y are scaled independently; aspect ratio is not preserved.
    ///
    /// # Errors
    /// - `Decode` when the buffer does not match the dimensions
    /// - `Resample` when either the source or the target has zero area
    pub fn resize(&self, new_width: u32, new_height: u32, filter: ResampleFilter) -> Result<Mask> {
        let current = self.to_image()?;

        if (new_width, new_height) == self.dimensions {
            return Ok(self.clone());
        }

        if self.width() == 0 || self.height() == 0 {
            return Err(SegDemoError::resample(format!(
                "Cannot resample an empty {}x{} mask to {}x{}",
                self.width(),
                self.height(),
                new_width,
                new_height
            )));
        }

        if new_width == 0 || new_height == 0 {
            return Err(SegDemoError::resample(format!(
                "Cannot resample mask to empty target {}x{}",
                new_width, new_height
            )));
        }

        let resized =
            image::imageops::resize(&current, new_width, new_height, filter.filter_type());
        Ok(Mask::from_image(&resized))
    }

    /// Foreground/background split at weight 128
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&x| x > 127).count();
        let background_pixels = total_pixels - foreground_pixels;
        let foreground_ratio = if total_pixels == 0 {
            0.0
        } else {
            foreground_pixels as f32 / total_pixels as f32
        };

        MaskStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio,
        }
    }

    /// Grayscale rendering of the mask as an RGB [`Image`] for display or saving
    ///
    /// # Errors
    /// - `Decode` when the buffer does not match the dimensions
    pub fn to_display_image(&self) -> Result<Image> {
        let gray = self.to_image()?;
        Ok(Image::new(DynamicImage::ImageLuma8(gray)))
    }
}

/// Statistics about a mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub foreground_ratio: f32,
}

/// Result of the mask/cutout flow
#[derive(Debug, Clone)]
pub struct CutoutResult {
    /// The orientation-normalized original that was segmented
    pub original: Image,

    /// Mask as returned by the segmenter
    pub mask: Mask,

    /// Original blended over white using the mask
    pub cutout: Image,

    /// Preset the mask was generated with
    pub quality: QualityPreset,
}

/// One timed segmentation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSample {
    /// 1-based position in the sampling phase
    pub index: usize,
    pub latency_ms: f64,
}

/// Aggregate latency of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// (width, height) of the normalized image
    pub resolution: (u32, u32),
    pub quality: QualityPreset,
    pub mean_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    /// Timed samples only; warm-up calls are never recorded
    pub samples: Vec<BenchmarkSample>,
    /// Name reported by the segmenter
    pub segmenter: String,
    pub completed_at: DateTime<Utc>,
}

impl BenchmarkResult {
    /// Aggregate timed samples into a result
    ///
    /// # Errors
    /// - `NoSamples` when `samples` is empty
    pub fn from_samples(
        resolution: (u32, u32),
        quality: QualityPreset,
        segmenter: impl Into<String>,
        samples: Vec<BenchmarkSample>,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(SegDemoError::NoSamples);
        }

        let total: f64 = samples.iter().map(|s| s.latency_ms).sum();
        let mean_latency_ms = total / samples.len() as f64;
        let min_latency_ms = samples
            .iter()
            .map(|s| s.latency_ms)
            .fold(f64::INFINITY, f64::min);
        let max_latency_ms = samples
            .iter()
            .map(|s| s.latency_ms)
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            resolution,
            quality,
            mean_latency_ms,
            min_latency_ms,
            max_latency_ms,
            samples,
            segmenter: segmenter.into(),
            completed_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Seconds needed to segment `frames` frames one by one at the mean latency
    #[must_use]
    pub fn estimated_secs_for_frames(&self, frames: u32) -> f64 {
        self.mean_latency_ms * f64::from(frames) / 1000.0
    }

    /// Estimated segmentation time of a 5 second clip (150 frames)
    #[must_use]
    pub fn estimated_5s_secs(&self) -> f64 {
        self.estimated_secs_for_frames(SHORT_CLIP_FRAMES)
    }

    /// Estimated segmentation time of a 15 second clip (450 frames)
    #[must_use]
    pub fn estimated_15s_secs(&self) -> f64 {
        self.estimated_secs_for_frames(LONG_CLIP_FRAMES)
    }

    /// The result and its extrapolations as a JSON value
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "estimated_5s_secs".to_string(),
                serde_json::json!(self.estimated_5s_secs()),
            );
            object.insert(
                "estimated_15s_secs".to_string(),
                serde_json::json!(self.estimated_15s_secs()),
            );
        }
        Ok(value)
    }

    /// Pretty-printed JSON document with the result and its extrapolations
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_value()?)?)
    }

    /// Multi-line human-readable summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Segmentation benchmark ===");
        let _ = writeln!(out, "Segmenter:    {}", self.segmenter);
        let _ = writeln!(out, "Resolution:   {}x{}", self.resolution.0, self.resolution.1);
        let _ = writeln!(out, "Quality:      {}", self.quality.display_name());
        let _ = writeln!(out, "Samples:      {}", self.sample_count());
        let _ = writeln!(out, "Single frame: {:.2} ms", self.mean_latency_ms);
        let _ = writeln!(out, "Min frame:    {:.2} ms", self.min_latency_ms);
        let _ = writeln!(out, "Max frame:    {:.2} ms", self.max_latency_ms);
        let _ = writeln!(out, "=== Estimated video processing ({} fps) ===", VIDEO_FRAME_RATE);
        let _ = writeln!(
            out,
            "5 s clip ({} frames):  {:.2} s",
            SHORT_CLIP_FRAMES,
            self.estimated_5s_secs()
        );
        let _ = write!(
            out,
            "15 s clip ({} frames): {:.2} s",
            LONG_CLIP_FRAMES,
            self.estimated_15s_secs()
        );
        out
    }
}
