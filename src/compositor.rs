//! White-background cutout compositing
//!
//! Every channel of the original is blended toward white using the mask
//! weight: 255 keeps the original, 0 gives white, values in between are a
//! linear blend rounded to the nearest integer.

use crate::{
    config::{BlendPathway, CompositeConfig},
    error::{Result, SegDemoError},
    types::{Image, Mask},
};
use ndarray::{Array3, ArrayView2, ArrayView3, Axis, Zip};

const WHITE: u8 = u8::MAX;

/// Blends an original image over a white background using a mask
#[derive(Debug, Default, Clone, Copy)]
pub struct MaskCompositor {
    config: CompositeConfig,
}

impl MaskCompositor {
    #[must_use]
    pub fn new(config: CompositeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> CompositeConfig {
        self.config
    }

    /// Produce the white-background cutout of `original`
    ///
    /// The mask is resampled to the original's exact size when they differ.
    /// The result keeps the original's channel layout and pixel scale and is
    /// tagged upright.
    ///
    /// # Errors
    /// - `Decode` when the original has zero area or the mask buffer does not
    ///   match its dimensions
    /// - `Resample` when an empty mask would have to be stretched
    pub fn composite(&self, original: &Image, mask: &Mask) -> Result<Image> {
        let (width, height) = original.dimensions();
        let _span = tracing::debug_span!(
            "composite",
            width,
            height,
            mask_width = mask.width(),
            mask_height = mask.height(),
            pathway = ?self.config.pathway
        )
        .entered();

        if width == 0 || height == 0 {
            return Err(SegDemoError::decode(format!(
                "Original image has no pixels ({}x{})",
                width, height
            )));
        }

        if mask.dimensions != (width, height) {
            tracing::debug!(
                filter = ?self.config.filter,
                "Resampling mask from {}x{} to {}x{}",
                mask.width(),
                mask.height(),
                width,
                height
            );
        }
        let weights = mask.resize(width, height, self.config.filter)?;

        let layout = original.layout();
        let shape = BlendShape {
            width: width as usize,
            height: height as usize,
            channels: layout.channels(),
        };

        let blended = match self.config.pathway {
            BlendPathway::Vectorized => blend_vectorized(original.as_bytes(), &weights.data, shape)
                .unwrap_or_else(|| {
                    tracing::debug!("Array views unavailable, using scanline blend");
                    blend_scanline(original.as_bytes(), &weights.data, shape)
                }),
            BlendPathway::Scanline => blend_scanline(original.as_bytes(), &weights.data, shape),
        };

        Ok(Image::from_raw(width, height, layout, blended)?.with_scale(original.scale()))
    }
}

/// Composite with the default configuration
pub fn composite(original: &Image, mask: &Mask) -> Result<Image> {
    MaskCompositor::default().composite(original, mask)
}

#[derive(Debug, Clone, Copy)]
struct BlendShape {
    width: usize,
    height: usize,
    channels: usize,
}

#[inline]
fn blend_channel(value: u8, weight: u8) -> u8 {
    let value = u32::from(value);
    let weight = u32::from(weight);
    let white = u32::from(WHITE);
    ((value * weight + white * (255 - weight) + 127) / 255) as u8
}

fn blend_vectorized(pixels: &[u8], weights: &[u8], shape: BlendShape) -> Option<Vec<u8>> {
    let BlendShape {
        width,
        height,
        channels,
    } = shape;

    let source = ArrayView3::from_shape((height, width, channels), pixels).ok()?;
    let weights = ArrayView2::from_shape((height, width), weights)
        .ok()?
        .insert_axis(Axis(2));
    let weights = weights.broadcast((height, width, channels))?;

    let mut output = Array3::<u8>::zeros((height, width, channels));
    Zip::from(&mut output)
        .and(source)
        .and(weights)
        .for_each(|out, &value, &weight| *out = blend_channel(value, weight));

    let (data, _offset) = output.into_raw_vec_and_offset();
    Some(data)
}

/// Software blend drawn into a canvas whose row 0 is the bottom of the image.
/// Rows are flipped back to top-left origin before returning.
fn blend_scanline(pixels: &[u8], weights: &[u8], shape: BlendShape) -> Vec<u8> {
    let row_len = shape.width * shape.channels;
    let mut canvas = vec![WHITE; row_len * shape.height];

    let source_rows = pixels.chunks_exact(row_len).rev();
    let weight_rows = weights.chunks_exact(shape.width).rev();

    for ((canvas_row, source_row), weight_row) in
        canvas.chunks_exact_mut(row_len).zip(source_rows).zip(weight_rows)
    {
        for ((canvas_px, source_px), &weight) in canvas_row
            .chunks_exact_mut(shape.channels)
            .zip(source_row.chunks_exact(shape.channels))
            .zip(weight_row)
        {
            for (out, &value) in canvas_px.iter_mut().zip(source_px) {
                *out = blend_channel(value, weight);
            }
        }
    }

    canvas
        .chunks_exact(row_len)
        .rev()
        .flatten()
        .copied()
        .collect()
}
