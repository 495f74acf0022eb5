//! Segmenter abstraction for the external person-segmentation capability

use crate::{
    config::QualityPreset,
    error::Result,
    types::{Image, Mask},
};
use async_trait::async_trait;
use std::sync::Arc;

/// External capability producing a foreground mask from an image
///
/// Implementations wrap a vision model service. The returned mask is aligned
/// to the input but may have a different resolution. Failures are reported
/// as [`SegDemoError::Model`](crate::SegDemoError::Model) carrying the
/// collaborator's message.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Segment the person(s) in `image`
    ///
    /// # Errors
    /// - Bad input or an internal model failure
    async fn segment(&self, image: &Image, quality: QualityPreset) -> Result<Mask>;

    /// Name used in logs and benchmark results
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: Segmenter + ?Sized> Segmenter for Arc<S> {
    async fn segment(&self, image: &Image, quality: QualityPreset) -> Result<Mask> {
        (**self).segment(image, quality).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<S: Segmenter + ?Sized> Segmenter for Box<S> {
    async fn segment(&self, image: &Image, quality: QualityPreset) -> Result<Mask> {
        (**self).segment(image, quality).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
