use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use matriq_core::CapturedImage;

/// Failure of the image-capture capability (camera, gallery, file system).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct PickError(pub String);

/// Capability that yields one image for scanning.
///
/// Loading happens here so an unreadable source fails at this boundary and
/// the capture workflow never leaves its idle state.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick(&self) -> Result<CapturedImage, PickError>;
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Picker that loads an image file from disk — the CLI's stand-in for the
/// camera/gallery capability.
pub struct FilePicker {
    path: PathBuf,
}

impl FilePicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImagePicker for FilePicker {
    async fn pick(&self) -> Result<CapturedImage, PickError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| PickError(format!("{}: {e}", self.path.display())))?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.jpg".to_string());
        Ok(CapturedImage {
            file_name,
            mime: guess_mime(&self.path).to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_by_extension() {
        assert_eq!(guess_mime(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("a.png")), "image/png");
        assert_eq!(guess_mime(Path::new("a.webp")), "application/octet-stream");
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_file_picker_loads_bytes() {
        let path = std::env::temp_dir().join("matriq-picker-test.png");
        std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();

        let image = FilePicker::new(&path).pick().await.unwrap();
        assert_eq!(image.file_name, "matriq-picker-test.png");
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.bytes, vec![0x89, 0x50, 0x4e, 0x47]);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_file_picker_missing_file_fails() {
        let picker = FilePicker::new("/nonexistent/label.jpg");
        let err = picker.pick().await.unwrap_err();
        assert!(err.0.contains("/nonexistent/label.jpg"));
    }
}
