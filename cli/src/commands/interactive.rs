//! Interactive mode command
//!
//! Every stdin line replaces the search text of a debounced driver. Lines
//! starting with `:` are commands:
//! - `:clear` drops all selected tags
//! - `:tag NAME` toggles one tag
//! - `:sort FIELD [DIRECTION]` changes the display order
//! - `:quit` exits
//!
//! A leading `[tag1,tag2]` in a line is moved into the selected tags once the
//! debounce quantum elapses.

use super::load_catalog;
use crate::config::CliConfigLoader;
use crate::output::{ImageFormatter, OutputFormat};
use anyhow::{anyhow, Result};
use imgdesk_core::search::sort_by_spec;
use imgdesk_core::{
    ImageRecord, SearchDriver, SearchState, SortDirection, SortField, SortSpec, TagFacetSet,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// A parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputLine {
    Query(String),
    Clear,
    ToggleTag(String),
    Sort(SortSpec),
    Quit,
}

/// Parse one stdin line
fn parse_line(line: &str, current: SortSpec) -> Result<InputLine> {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Ok(InputLine::Query(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("q") => Ok(InputLine::Quit),
        Some("clear") => Ok(InputLine::Clear),
        Some("tag") => parts
            .next()
            .map(|tag| InputLine::ToggleTag(tag.to_string()))
            .ok_or_else(|| anyhow!("Usage: :tag NAME")),
        Some("sort") => {
            let field: SortField = parts
                .next()
                .ok_or_else(|| anyhow!("Usage: :sort FIELD [asc|desc]"))?
                .parse()?;
            let direction = match parts.next() {
                Some(direction) => direction.parse()?,
                // Re-selecting the current field flips its direction
                None if field == current.field => current.direction.toggle(),
                None => SortDirection::Asc,
            };
            Ok(InputLine::Sort(SortSpec::new(field, direction)))
        }
        Some(other) => Err(anyhow!("Unknown command: :{}", other)),
        None => Err(anyhow!("Empty command")),
    }
}

/// Render one published state
fn render(
    state: &SearchState<ImageRecord>,
    sort: &SortSpec,
    facets: &TagFacetSet,
    limit: Option<usize>,
) -> Result<String> {
    let tags = facets.iter().collect::<Vec<_>>().join(",");
    let header = format!(
        "[{}] {:?} (sort: {} {})",
        tags, state.input_text, sort.field, sort.direction
    );

    if state.loading {
        return Ok(format!("{} searching...", header));
    }

    let Some(result) = &state.result else {
        return Ok(format!("{} no catalog loaded", header));
    };

    let mut lines = vec![format!("{} {} match(es)", header, result.len())];
    if let Some(error) = &state.error {
        lines.push(format!("warning: {}; filtering by tags only", error));
    }

    let mut items = sort_by_spec(result.clone(), sort);
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    lines.push(ImageFormatter::new(OutputFormat::Text).format(&items)?);

    Ok(lines.join("\n"))
}

/// Start interactive mode
pub async fn interactive_command(
    config_loader: CliConfigLoader,
    limit: Option<usize>,
) -> Result<()> {
    let settings = config_loader.load().await?;
    let catalog = load_catalog(&settings).await?;
    info!(
        "Interactive search over {} image(s), debounce {:?}",
        catalog.len(),
        settings.debounce
    );

    let (driver, mut promotions) = SearchDriver::<ImageRecord>::new(&settings);
    let mut states = driver.subscribe();
    let mut facets = TagFacetSet::new();
    let mut sort = settings.sort;

    driver.set_items(Some(catalog.to_shared()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut eof = false;

    loop {
        tokio::select! {
            line = lines.next_line(), if !eof => {
                let Some(line) = line? else {
                    debug!("stdin closed, waiting for the last evaluation");
                    eof = true;
                    if !driver.state().loading {
                        break;
                    }
                    continue;
                };

                match parse_line(&line, sort) {
                    Ok(InputLine::Query(text)) => driver.set_input_text(text),
                    Ok(InputLine::Clear) => {
                        facets.clear();
                        driver.set_facets(facets.clone());
                    }
                    Ok(InputLine::ToggleTag(tag)) => {
                        facets.toggle(&tag);
                        driver.set_facets(facets.clone());
                    }
                    Ok(InputLine::Sort(spec)) => {
                        sort = spec;
                        println!("{}", render(&driver.state(), &sort, &facets, limit)?);
                    }
                    Ok(InputLine::Quit) => break,
                    Err(e) => eprintln!("{}", e),
                }
            }
            Some(promotion) = promotions.recv() => {
                debug!("Promoting tags {:?}", promotion.tags);
                driver.apply_promotion(&promotion, &mut facets);
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                println!("{}", render(&state, &sort, &facets, limit)?);
                if eof && !state.loading {
                    break;
                }
            }
        }
    }

    driver.dispose();
    Ok(())
}
