//! Save-to-library sink for masks and cutouts

use crate::{
    error::{Result, SegDemoError},
    services::io::ImageIOService,
    types::Image,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What is being saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Mask,
    Cutout,
}

impl SaveKind {
    /// File name prefix
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Mask => "mask",
            Self::Cutout => "cutout",
        }
    }

    /// User-facing confirmation after a successful save
    #[must_use]
    pub fn success_message(self) -> &'static str {
        match self {
            Self::Mask => "Mask saved",
            Self::Cutout => "Cutout saved",
        }
    }

    /// User-facing message after a failed save
    #[must_use]
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Mask => "Failed to save mask",
            Self::Cutout => "Failed to save cutout",
        }
    }
}

/// Persistent destination for generated images
pub trait ImageSink: Send + Sync {
    /// Store `image` and return where it ended up
    ///
    /// # Errors
    /// - Any storage failure; nothing is retried
    fn save(&self, image: &Image, kind: SaveKind) -> Result<PathBuf>;
}

/// Sink writing uniquely named PNG files into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_name(kind: SaveKind) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.png",
            kind.prefix(),
            Utc::now().format("%Y%m%d-%H%M%S"),
            &id[..8]
        )
    }
}

impl ImageSink for DirectorySink {
    fn save(&self, image: &Image, kind: SaveKind) -> Result<PathBuf> {
        if self.directory.exists() && !self.directory.is_dir() {
            return Err(SegDemoError::file_io_error(
                "use output directory",
                &self.directory,
                &std::io::Error::new(std::io::ErrorKind::AlreadyExists, "not a directory"),
            ));
        }

        let path = self.directory.join(Self::file_name(kind));
        match ImageIOService::save_image(image, &path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "{}", kind.success_message());
                Ok(path)
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "{}", kind.failure_message());
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mask;
    use image::DynamicImage;
    use tempfile::tempdir;

    #[test]
    fn test_files_are_named_by_kind_and_unique() {
        let temp_dir = tempdir().unwrap();
        let sink = DirectorySink::new(temp_dir.path().join("library"));
        let image = Image::new(DynamicImage::new_rgb8(3, 3));

        let first = sink.save(&image, SaveKind::Cutout).unwrap();
        let second = sink.save(&image, SaveKind::Cutout).unwrap();
        let mask = sink
            .save(&Mask::uniform(3, 3, 255).to_display_image().unwrap(), SaveKind::Mask)
            .unwrap();

        assert_ne!(first, second);
        for (path, prefix) in [(&first, "cutout-"), (&second, "cutout-"), (&mask, "mask-")] {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with(prefix), "{}", name);
            assert!(name.ends_with(".png"));
            assert!(path.exists());
        }
    }

    #[test]
    fn test_file_in_place_of_directory_fails() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let sink = DirectorySink::new(&blocker);
        let result = sink.save(&Image::new(DynamicImage::new_rgb8(1, 1)), SaveKind::Mask);
        assert!(matches!(result, Err(SegDemoError::Io(_))));
    }

    #[test]
    fn test_messages() {
        assert_eq!(SaveKind::Mask.success_message(), "Mask saved");
        assert_eq!(SaveKind::Cutout.failure_message(), "Failed to save cutout");
    }
}
