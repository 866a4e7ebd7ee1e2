use crate::constants::DEFAULT_IMAGE_EXTENSION;
use crate::error::Result;
use reqwest::Url;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory holding posters between download and upload.
#[derive(Debug, Clone)]
pub struct TempImages {
    dir: PathBuf,
}

impl TempImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<sanitized title><extension of the URL path, or .png>`
    pub fn path_for(&self, title: &str, image_url: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", sanitize_title(title), url_extension(image_url)))
    }

    pub fn save(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, bytes)?;
        info!("Image saved to: {}", path.display());
        Ok(())
    }

    /// Removes a downloaded poster; returns whether a file was deleted.
    pub fn delete(&self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted temporary image: {}", path.display());
                true
            }
            Err(e) => {
                warn!("Error deleting temporary image {}: {}", path.display(), e);
                false
            }
        }
    }
}

/// Replaces every non-alphanumeric character with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn url_extension(image_url: &str) -> String {
    Url::parse(image_url)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}
