//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use segdemo::{Image, Mask, QualityPreset, Result, Segmenter};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Solid-color RGB image
pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> Image {
    Image::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb(color),
    )))
}

/// Image whose pixels all differ, so misplaced rows or columns show up
pub fn patterned_image(width: u32, height: u32) -> Image {
    let buffer = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 13 % 256) as u8,
            (y * 29 % 256) as u8,
            ((x * 7 + y * 3) % 256) as u8,
        ])
    });
    Image::new(DynamicImage::ImageRgb8(buffer))
}

/// Segmenter returning the same mask for every call
pub struct FixedMaskSegmenter {
    mask: Mask,
    calls: AtomicUsize,
}

impl FixedMaskSegmenter {
    pub fn new(mask: Mask) -> Self {
        Self {
            mask,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Segmenter for FixedMaskSegmenter {
    async fn segment(&self, _image: &Image, _quality: QualityPreset) -> Result<Mask> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.mask.clone())
    }

    fn name(&self) -> &str {
        "fixed-mask"
    }
}
