//! Filesystem-based image store

use async_trait::async_trait;
use autopost_domain::{FileError, ImageStore, LocalImage};
use image::ImageReader;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

/// Loads images from disk, resolving relative paths against a base directory
pub struct FsImageStore {
    base_dir: PathBuf,
}

impl FsImageStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve a path from the document; absolute paths are used as-is
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Probe dimensions and MIME type from the image header
fn probe(bytes: &[u8]) -> Result<(u32, u32, &'static str), String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    let format = reader
        .format()
        .ok_or_else(|| "unknown image format".to_string())?;
    let (width, height) = reader.into_dimensions().map_err(|e| e.to_string())?;

    Ok((width, height, format.to_mime_type()))
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn load(&self, path: &str) -> Result<LocalImage, FileError> {
        let full_path = self.resolve(path);

        let bytes = match tokio::fs::read(&full_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FileError::NotFound(full_path));
            }
            Err(source) => {
                return Err(FileError::Read {
                    path: full_path,
                    source,
                });
            }
        };

        let (width, height, mime_type) =
            probe(&bytes).map_err(|message| FileError::UnrecognizedImage {
                path: full_path.clone(),
                message,
            })?;

        tracing::debug!(
            path = %full_path.display(),
            width,
            height,
            mime_type,
            size = bytes.len(),
            "Loaded image"
        );

        Ok(LocalImage {
            bytes,
            width,
            height,
            mime_type: mime_type.to_string(),
        })
    }
}
