//! Image catalog loaded from a JSON export of the admin API

use crate::error::Result;
use crate::model::ImageRecord;
use crate::search::tags::{collect_tags, TagCatalog};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Accepted file layouts: a bare array or an object wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<ImageRecord>),
    Wrapped { images: Vec<ImageRecord> },
}

/// In-memory image collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageCatalog {
    images: Vec<ImageRecord>,
}

impl ImageCatalog {
    /// Create a catalog from records
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self { images }
    }

    /// Load a catalog file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let catalog = Self::from_json(&content)?;
        debug!(
            "Loaded {} image(s) from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let images = match serde_json::from_str::<CatalogFile>(content)? {
            CatalogFile::List(images) => images,
            CatalogFile::Wrapped { images } => images,
        };
        Ok(Self { images })
    }

    /// Save the catalog as a JSON array
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.images)?;
        fs::write(path, content).await?;

        Ok(())
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Every normalized tag in use, with counts
    pub fn tags(&self) -> TagCatalog {
        collect_tags(&self.images)
    }

    /// Shared slice of records for the search pipeline
    pub fn to_shared(&self) -> Arc<[ImageRecord]> {
        self.images.as_slice().into()
    }

    pub fn into_images(self) -> Vec<ImageRecord> {
        self.images
    }
}
