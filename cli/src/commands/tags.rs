//! Tag listing command

use super::load_catalog;
use crate::config::CliConfigLoader;
use crate::output::{OutputFormat, TagFormatter};
use anyhow::Result;
use tracing::info;

/// List every normalized tag in the catalog with its image count
pub async fn tags_command(config_loader: CliConfigLoader, format: OutputFormat) -> Result<()> {
    let settings = config_loader.load().await?;
    let catalog = load_catalog(&settings).await?;

    let tags = catalog.tags();
    info!("{} tag(s) across {} image(s)", tags.len(), catalog.len());

    println!("{}", TagFormatter::new(format).format(&tags)?);
    Ok(())
}
