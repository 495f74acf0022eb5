//! Image file loading and saving
//!
//! Loading reads the EXIF orientation into the [`Image`] tag without rotating
//! pixels; rotation is the job of [`crate::orientation`].

use crate::{
    error::{Result, SegDemoError},
    types::{Image, Orientation},
};
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

/// Service for image file input/output
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// The format is guessed from the file content, so a wrong extension
    /// does not matter.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use segdemo::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("portrait.jpg")?;
    /// println!("{:?}", image.orientation());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    /// - `Io` when the file cannot be opened
    /// - `Image` when the content is not a supported image
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Image> {
        let path_ref = path.as_ref();

        let reader = ImageReader::open(path_ref)
            .map_err(|e| SegDemoError::file_io_error("read image file", path_ref, &e))?
            .with_guessed_format()
            .map_err(|e| SegDemoError::file_io_error("read image data", path_ref, &e))?;

        let image = Self::decode(reader)?;
        tracing::debug!(
            path = %path_ref.display(),
            width = image.width(),
            height = image.height(),
            orientation = ?image.orientation(),
            "Loaded image"
        );
        Ok(image)
    }

    /// Load an image from encoded bytes
    ///
    /// # Errors
    /// - `Image` when the bytes are not a supported image
    pub fn load_image_from_bytes(bytes: &[u8]) -> Result<Image> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        Self::decode(reader)
    }

    fn decode<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<Image> {
        let mut decoder = reader.into_decoder()?;
        let orientation = match decoder.orientation() {
            Ok(orientation) => Orientation::from(orientation),
            Err(e) => {
                tracing::debug!("No usable orientation metadata: {}", e);
                Orientation::Identity
            },
        };

        let pixels = DynamicImage::from_decoder(decoder)?;
        Ok(Image::new(pixels).with_orientation(orientation))
    }

    /// Save an image, choosing PNG, JPEG or TIFF from the file extension
    ///
    /// Parent directories are created as needed. JPEG output drops alpha.
    ///
    /// # Errors
    /// - `InvalidConfig` for an unsupported extension
    /// - `Io`/`Image` when writing fails
    pub fn save_image<P: AsRef<Path>>(image: &Image, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let format = match ImageFormat::from_path(path_ref) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Tiff)) => format,
            _ => {
                return Err(SegDemoError::invalid_config(format!(
                    "Unsupported output format for '{}' (expected .png, .jpg or .tiff)",
                    path_ref.display()
                )))
            },
        };

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SegDemoError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        let result = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.pixels().to_rgb8())
                .save_with_format(path_ref, format),
            _ => image.pixels().save_with_format(path_ref, format),
        };
        result?;

        tracing::debug!(path = %path_ref.display(), ?format, "Saved image");
        Ok(())
    }

    /// Whether the extension is one [`save_image`](Self::save_image) can write
    #[must_use]
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        matches!(
            ImageFormat::from_path(path),
            Ok(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Tiff)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelLayout;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn sample() -> Image {
        let buffer = RgbImage::from_fn(6, 4, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 90]));
        Image::new(DynamicImage::ImageRgb8(buffer))
    }

    #[test]
    fn test_png_round_trip_keeps_pixels() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("sample.png");

        ImageIOService::save_image(&sample(), &path).unwrap();
        let loaded = ImageIOService::load_image(&path).unwrap();

        assert_eq!(loaded.dimensions(), (6, 4));
        assert_eq!(loaded.as_bytes(), sample().as_bytes());
        assert_eq!(loaded.orientation(), Orientation::Identity);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("alpha.jpg");
        let rgba = Image::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            4,
            Rgba([200, 10, 10, 128]),
        )));

        ImageIOService::save_image(&rgba, &path).unwrap();
        let loaded = ImageIOService::load_image(&path).unwrap();
        assert_eq!(loaded.layout(), ChannelLayout::Rgb);
        assert_eq!(loaded.dimensions(), (4, 4));
    }

    #[test]
    fn test_load_from_bytes() {
        let mut bytes = Vec::new();
        sample()
            .pixels()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let loaded = ImageIOService::load_image_from_bytes(&bytes).unwrap();
        assert_eq!(loaded.dimensions(), (6, 4));

        assert!(ImageIOService::load_image_from_bytes(b"not an image").is_err());
    }

    #[test]
    fn test_content_detection_ignores_extension() {
        let temp_dir = tempdir().unwrap();
        let png = temp_dir.path().join("real.png");
        let misnamed = temp_dir.path().join("misnamed.jpg");

        ImageIOService::save_image(&sample(), &png).unwrap();
        std::fs::copy(&png, &misnamed).unwrap();

        let loaded = ImageIOService::load_image(&misnamed).unwrap();
        assert_eq!(loaded.as_bytes(), sample().as_bytes());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ImageIOService::load_image("/definitely/not/here.png");
        assert!(matches!(result, Err(SegDemoError::Io(_))));
    }

    #[test]
    fn test_unsupported_output_format() {
        let temp_dir = tempdir().unwrap();
        let result = ImageIOService::save_image(&sample(), temp_dir.path().join("out.gif"));
        assert!(matches!(result, Err(SegDemoError::InvalidConfig(_))));

        assert!(ImageIOService::is_supported_format("a.PNG"));
        assert!(ImageIOService::is_supported_format("/path/to/file.jpeg"));
        assert!(!ImageIOService::is_supported_format("filename"));
    }
}
