//! Image file persistence.
//!
//! The canvas never touches files directly; it hands straight-alpha RGBA
//! buffers to a [`PersistenceAdapter`].

use crate::error::PersistenceError;
use chrono::Local;
use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads and writes whole images.
pub trait PersistenceAdapter: Send + std::fmt::Debug {
    /// Decodes the image at `path`.
    fn load(&self, path: &Path) -> Result<RgbaImage, PersistenceError>;

    /// Encodes `image` to `path`, choosing the format from the extension.
    fn save(&self, image: &RgbaImage, path: &Path) -> Result<(), PersistenceError>;
}

/// PNG, BMP and JPEG files via the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileAdapter;

impl ImageFileAdapter {
    /// Formats accepted for writing.
    pub const SUPPORTED: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Jpeg];

    fn format_for(path: &Path) -> Result<ImageFormat, PersistenceError> {
        match ImageFormat::from_path(path) {
            Ok(format) if Self::SUPPORTED.contains(&format) => Ok(format),
            _ => Err(PersistenceError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl PersistenceAdapter for ImageFileAdapter {
    fn load(&self, path: &Path) -> Result<RgbaImage, PersistenceError> {
        if !path.exists() {
            return Err(PersistenceError::NotFound(path.to_path_buf()));
        }
        let decoded = image::open(path).map_err(|err| match err {
            ImageError::IoError(source) if source.kind() == io::ErrorKind::NotFound => {
                PersistenceError::NotFound(path.to_path_buf())
            }
            ImageError::IoError(source) => PersistenceError::IoFailure {
                path: path.to_path_buf(),
                source,
            },
            ImageError::Unsupported(_) => PersistenceError::UnsupportedFormat(path.to_path_buf()),
            source => PersistenceError::DecodeFailure {
                path: path.to_path_buf(),
                source,
            },
        })?;
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(decoded.to_rgba8())
    }

    fn save(&self, image: &RgbaImage, path: &Path) -> Result<(), PersistenceError> {
        let format = Self::format_for(path)?;
        let result = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .save_with_format(path, format),
            _ => image.save_with_format(path, format),
        };
        result.map_err(|err| match err {
            ImageError::IoError(source) => PersistenceError::IoFailure {
                path: path.to_path_buf(),
                source,
            },
            source => PersistenceError::EncodeFailure {
                path: path.to_path_buf(),
                source,
            },
        })?;
        log::info!(
            "Saved {}x{} image to {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(())
    }
}

/// Destination for periodic snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSaveSink {
    /// Directory snapshots are written to (created on demand)
    pub directory: PathBuf,
    /// Filename template (supports chrono format specifiers)
    pub filename_template: String,
    /// File extension, which also selects the encoder
    pub format: String,
}

impl Default for AutoSaveSink {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join("rasterpad"),
            filename_template: "autosave_%Y-%m-%d_%H%M%S".to_string(),
            format: "png".to_string(),
        }
    }
}

impl AutoSaveSink {
    pub fn new(
        directory: impl Into<PathBuf>,
        filename_template: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            filename_template: filename_template.into(),
            format: format.into(),
        }
    }

    /// Picks an unused path for the next snapshot, creating the directory if needed.
    pub fn next_path(&self) -> Result<PathBuf, PersistenceError> {
        if !self.directory.exists() {
            log::info!("Creating auto-save directory: {}", self.directory.display());
            fs::create_dir_all(&self.directory).map_err(|source| PersistenceError::IoFailure {
                path: self.directory.clone(),
                source,
            })?;
        }

        let stem = generate_stem(&self.filename_template);
        let mut candidate = self.directory.join(format!("{stem}.{}", self.format));
        let mut suffix = 1;
        while candidate.exists() {
            candidate = self
                .directory
                .join(format!("{stem}_{suffix}.{}", self.format));
            suffix += 1;
        }
        Ok(candidate)
    }
}

/// Expands chrono specifiers in `template` using the current local time.
///
/// Falls back to the raw template when it contains an invalid specifier.
pub fn generate_stem(template: &str) -> String {
    let mut stem = String::new();
    if write!(stem, "{}", Local::now().format(template)).is_err() {
        log::warn!("Invalid filename template '{template}', using it verbatim");
        return template.to_string();
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn png_and_bmp_are_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = ImageFileAdapter;
        for name in ["a.png", "a.bmp"] {
            let path = dir.path().join(name);
            adapter.save(&checker(), &path).unwrap();
            let loaded = adapter.load(&path).unwrap();
            assert_eq!(loaded, checker(), "{name}");
        }
    }

    #[test]
    fn jpeg_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        ImageFileAdapter.save(&checker(), &path).unwrap();
        let loaded = ImageFileAdapter.load(&path).unwrap();
        assert_eq!(loaded.dimensions(), (4, 4));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageFileAdapter
            .load(&dir.path().join("nope.png"))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageFileAdapter
            .save(&checker(), &dir.path().join("a.xyz"))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedFormat(_)));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();
        let err = ImageFileAdapter.load(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::DecodeFailure { .. }));
    }

    #[test]
    fn sink_avoids_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AutoSaveSink::new(dir.path().join("snaps"), "fixed", "png");
        let first = sink.next_path().unwrap();
        assert_eq!(first, dir.path().join("snaps").join("fixed.png"));
        fs::write(&first, b"x").unwrap();
        let second = sink.next_path().unwrap();
        assert_eq!(second, dir.path().join("snaps").join("fixed_1.png"));
    }

    #[test]
    fn stem_expands_time_specifiers() {
        let stem = generate_stem("shot_%Y");
        assert!(stem.starts_with("shot_"));
        assert_eq!(stem.len(), "shot_".len() + 4);
    }
}
