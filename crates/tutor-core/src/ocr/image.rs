//! Image handles and upload preparation.
//!
//! The host owns the image; the OCR client reads it once per extraction and
//! drops the bytes as soon as the request is built.

use crate::error::ImageError;
use std::path::PathBuf;

/// Reference to an image supplied by the host.
#[derive(Debug, Clone)]
pub enum ImageHandle {
    /// Image file on disk
    Path(PathBuf),
    /// Image already in memory (e.g. a camera capture)
    Bytes { name: String, data: Vec<u8> },
}

/// Image bytes plus what the multipart upload needs to describe them.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub media_type: &'static str,
}

impl ImageHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageHandle::Path(path.into())
    }

    /// Name used in log lines and error messages.
    pub fn display_name(&self) -> String {
        match self {
            ImageHandle::Path(path) => path.display().to_string(),
            ImageHandle::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read and check the image: it must exist, fit under `max_bytes`, and
    /// start with a recognised image signature.
    pub async fn load(&self, max_bytes: u64) -> Result<LoadedImage, ImageError> {
        let (bytes, file_name) = match self {
            ImageHandle::Path(path) => {
                let metadata = match tokio::fs::metadata(path).await {
                    Ok(m) => m,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Err(ImageError::NotFound(path.clone()));
                    }
                    Err(source) => {
                        return Err(ImageError::Read {
                            path: path.clone(),
                            source,
                        });
                    }
                };
                check_size(&self.display_name(), metadata.len(), max_bytes)?;

                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| ImageError::Read {
                        path: path.clone(),
                        source,
                    })?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                (bytes, file_name)
            }
            ImageHandle::Bytes { name, data } => {
                check_size(name, data.len() as u64, max_bytes)?;
                (data.clone(), name.clone())
            }
        };

        let media_type = detect_media_type(&bytes)
            .ok_or_else(|| ImageError::UnsupportedFormat(self.display_name()))?;

        Ok(LoadedImage {
            bytes,
            file_name,
            media_type,
        })
    }
}

fn check_size(name: &str, len: u64, max_bytes: u64) -> Result<(), ImageError> {
    if len > max_bytes {
        return Err(ImageError::TooLarge {
            name: name.to_string(),
            size_mb: len / (1024 * 1024),
            max_mb: max_bytes / (1024 * 1024),
        });
    }
    Ok(())
}

/// Identify the MIME type from the leading magic bytes.
pub(crate) fn detect_media_type(header: &[u8]) -> Option<&'static str> {
    if header.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }

    // GIF: GIF8
    if header.starts_with(b"GIF8") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") && header.len() >= 12 && &header[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    // BMP: BM
    if header.starts_with(b"BM") {
        return Some("image/bmp");
    }

    // TIFF: II (little-endian) or MM (big-endian) followed by version 42
    if header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return Some("image/tiff");
    }

    None
}
