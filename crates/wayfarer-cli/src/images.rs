//! Image collaborator backed by a local directory.
//!
//! Looks up `<dir>/<slug>.<ext>` for each destination, where the slug is the
//! lowercased name with every run of non-alphanumeric characters replaced by
//! `-` ("New York" -> `new-york.png`), and returns it as a base64 data URL.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use wayfarer_core::ImageGenerator;

/// Extensions tried in order, with their media types.
const EXTENSIONS: [(&str, &str); 4] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
];

pub struct DirectoryImageGenerator {
    dir: Option<PathBuf>,
}

impl DirectoryImageGenerator {
    /// With `None`, every request fails and images settle as failed.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }
}

/// File stem used for `destination`.
pub fn slug(destination: &str) -> String {
    let mut out = String::with_capacity(destination.len());
    for c in destination.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[async_trait]
impl ImageGenerator for DirectoryImageGenerator {
    async fn generate(&self, destination: &str) -> Result<String> {
        let Some(dir) = &self.dir else {
            bail!("no image directory configured");
        };
        let stem = slug(destination);
        if stem.is_empty() {
            bail!("destination {destination:?} has no usable file name");
        }

        for (ext, media_type) in EXTENSIONS {
            let path = dir.join(format!("{stem}.{ext}"));
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to read {}", path.display()));
                }
            };
            if bytes.is_empty() {
                bail!("image file {} is empty", path.display());
            }
            debug!(destination, path = %path.display(), bytes = bytes.len(), "loaded image");
            return Ok(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)));
        }

        bail!("no image for {destination:?} in {}", dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_collapses_separators() {
        assert_eq!(slug("Paris"), "paris");
        assert_eq!(slug("New York"), "new-york");
        assert_eq!(slug("  Rio de Janeiro!! "), "rio-de-janeiro");
        assert_eq!(slug("São Paulo"), "são-paulo");
        assert_eq!(slug("--"), "");
    }

    #[tokio::test]
    async fn reads_first_matching_extension_as_data_url() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("new-york.jpg"), b"jpeg bytes").unwrap();
        std::fs::write(tmp.path().join("new-york.webp"), b"webp bytes").unwrap();

        let generator = DirectoryImageGenerator::new(Some(tmp.path().to_path_buf()));
        let data = generator.generate("New York").await.unwrap();
        assert_eq!(
            data,
            format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpeg bytes"))
        );
    }

    #[tokio::test]
    async fn missing_and_empty_files_fail() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("oslo.png"), b"").unwrap();
        let generator = DirectoryImageGenerator::new(Some(tmp.path().to_path_buf()));

        let err = generator.generate("Lima").await.unwrap_err();
        assert!(err.to_string().contains("no image for \"Lima\""));
        let err = generator.generate("Oslo").await.unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[tokio::test]
    async fn without_directory_every_request_fails() {
        let generator = DirectoryImageGenerator::new(None);
        assert!(generator.generate("Paris").await.is_err());
    }
}
