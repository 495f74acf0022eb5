//! Orientation correction applied before segmentation
//!
//! Only the two quarter-turn tags are corrected. Every other tag, including
//! `Rotate180` and the mirrored variants, is passed through untouched. This
//! narrow mapping is a known limitation kept on purpose: photos reaching the
//! demo arrive either upright or with a quarter-turn tag.

use crate::types::{Image, Orientation};
use image::DynamicImage;

/// Physically rotate quarter-turn images to upright
#[derive(Debug, Default, Clone, Copy)]
pub struct OrientationNormalizer;

impl OrientationNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Return an upright copy for `Rotate90`/`Rotate270` tags, the input otherwise
    ///
    /// Never fails: when the rotated buffer cannot be produced the original
    /// image is returned unchanged.
    #[must_use]
    pub fn normalize(&self, image: Image) -> Image {
        let orientation = image.orientation();
        if !matches!(orientation, Orientation::Rotate90 | Orientation::Rotate270) {
            return image;
        }

        let _span = tracing::debug_span!(
            "normalize_orientation",
            ?orientation,
            width = image.width(),
            height = image.height()
        )
        .entered();

        match rotate_upright(image.pixels(), orientation) {
            Some(rotated) => {
                tracing::debug!(
                    width = rotated.width(),
                    height = rotated.height(),
                    "Rotated image to upright"
                );
                Image::from_parts(rotated, Orientation::Identity, image.scale())
            },
            None => {
                tracing::warn!(
                    ?orientation,
                    "Could not rotate image to upright, keeping original orientation"
                );
                image
            },
        }
    }
}

/// Shorthand for [`OrientationNormalizer::normalize`]
#[must_use]
pub fn normalize(image: Image) -> Image {
    OrientationNormalizer.normalize(image)
}

fn rotate_upright(pixels: &DynamicImage, orientation: Orientation) -> Option<DynamicImage> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return None;
    }

    match orientation {
        Orientation::Rotate90 => Some(pixels.rotate90()),
        Orientation::Rotate270 => Some(pixels.rotate270()),
        _ => None,
    }
}
