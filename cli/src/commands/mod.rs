//! CLI command implementations

pub mod interactive;
pub mod normalize;
pub mod search;
pub mod tags;

pub use interactive::interactive_command;
pub use normalize::normalize_command;
pub use search::search_command;
pub use tags::tags_command;

use anyhow::{Context, Result};
use imgdesk_core::{ImageCatalog, SearchSettings};
use tracing::debug;

/// Load the catalog named by the resolved settings
pub(crate) async fn load_catalog(settings: &SearchSettings) -> Result<ImageCatalog> {
    let path = settings
        .require_catalog()
        .context("No catalog configured; pass --catalog or set IMGDESK_CATALOG")?;

    let catalog = ImageCatalog::load(path)
        .await
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    debug!("Catalog has {} image(s)", catalog.len());

    Ok(catalog)
}
