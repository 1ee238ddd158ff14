//! Product image lists: manifest lookup and image URL composition.

use std::ops::Index;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::config::GalleryConfig;
use crate::error::{Error, Result};

/// Ordered, immutable list of image file names for one product.
///
/// Clones share the same backing slice, so sessions reference the list
/// rather than copying it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet(Arc<[String]>);

impl ImageSet {
    pub fn new(files: Vec<String>) -> Self {
        Self(files.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for ImageSet {
    fn from(files: Vec<String>) -> Self {
        Self::new(files)
    }
}

impl<const N: usize> From<[&str; N]> for ImageSet {
    fn from(files: [&str; N]) -> Self {
        Self::new(files.iter().map(|f| f.to_string()).collect())
    }
}

impl Index<usize> for ImageSet {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.0[index]
    }
}

#[derive(Debug, Clone)]
pub struct GalleryService {
    cfg: GalleryConfig,
}

impl GalleryService {
    pub fn new(cfg: GalleryConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.cfg
    }

    /// Product paths arrive with or without a leading slash.
    pub fn clean(path: &str) -> &str {
        path.trim_start_matches('/')
    }

    pub fn gallery_url(&self, product_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.cfg.base(),
            Self::clean(product_path),
            self.cfg.manifest_file
        )
    }

    /// Locator for one image. The file name is appended verbatim.
    pub fn image_url(&self, product_path: &str, file: &str) -> String {
        format!("{}/{}/{}", self.cfg.base(), Self::clean(product_path), file)
    }

    /// Local file backing [`Self::gallery_url`].
    pub fn manifest_path(&self, product_path: &str) -> PathBuf {
        let url = self.gallery_url(product_path);
        self.cfg.root_dir.join(url.trim_start_matches('/'))
    }

    /// Loads the manifest, reporting why it could not be used.
    pub async fn try_load_images(&self, product_path: &str) -> Result<ImageSet> {
        let path = self.manifest_path(product_path);
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|source| Error::ManifestRead {
                path: path.clone(),
                source,
            })?;
        let files: Vec<String> = serde_json::from_slice(&raw)
            .map_err(|source| Error::ManifestFormat { path, source })?;
        Ok(ImageSet::new(files))
    }

    /// Loads the manifest; every failure is logged and yields an empty set.
    #[instrument(skip(self), fields(url = %self.gallery_url(product_path)))]
    pub async fn load_images(&self, product_path: &str) -> ImageSet {
        match self.try_load_images(product_path).await {
            Ok(images) => {
                debug!(count = images.len(), "gallery manifest loaded");
                images
            }
            Err(err) => {
                warn!(error = %err, "gallery manifest not found or unreadable");
                ImageSet::default()
            }
        }
    }
}
