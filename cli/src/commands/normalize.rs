//! Normalization command

use anyhow::Result;
use imgdesk_core::{normalize_name, normalize_path};
use tracing::debug;

/// Print the normalized form of a name or path
pub async fn normalize_command(text: String, path: bool) -> Result<()> {
    let normalized = if path {
        normalize_path(&text)
    } else {
        normalize_name(&text)
    };
    debug!("Normalized {:?} -> {:?}", text, normalized);

    println!("{}", normalized);
    Ok(())
}
