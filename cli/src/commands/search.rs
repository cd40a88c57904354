//! One-shot search command

use super::load_catalog;
use crate::config::CliConfigLoader;
use crate::output::{ImageFormatter, OutputFormat};
use anyhow::Result;
use imgdesk_core::search::search;
use imgdesk_core::TagFacetSet;
use tracing::{debug, info, warn};

/// Run a single search over the catalog and print the result
pub async fn search_command(
    config_loader: CliConfigLoader,
    query: Option<String>,
    tags: Vec<String>,
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<()> {
    let settings = config_loader.load().await?;
    let catalog = load_catalog(&settings).await?;

    let query = query.unwrap_or_default();
    let facets: TagFacetSet = tags.iter().collect();
    debug!(
        "Searching {:?} with facets {:?}, sorted by {} {}",
        query,
        facets.iter().collect::<Vec<_>>(),
        settings.sort.field,
        settings.sort.direction
    );

    let mut outcome = search(catalog.images(), &query, &facets, &settings.sort, &settings);

    if let Some(error) = &outcome.error {
        warn!("{}; filtering by tags only", error);
    }
    if !outcome.facet_tags.is_empty() {
        debug!("Query tags: {}", outcome.facet_tags.join(", "));
    }

    let total = outcome.items.len();
    if let Some(limit) = limit {
        outcome.items.truncate(limit);
    }
    info!("{} of {} image(s) matched", total, catalog.len());

    println!("{}", ImageFormatter::new(format).format(&outcome.items)?);
    Ok(())
}
