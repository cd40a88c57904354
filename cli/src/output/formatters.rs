//! Formatters for search results and tag listings

use super::OutputFormat;
use anyhow::Result;
use imgdesk_core::search::TagCatalog;
use imgdesk_core::ImageRecord;
use serde::Serialize;

const HEADERS: [&str; 6] = ["ID", "NAME", "TAGS", "AT", "SIZE", "DISK"];

/// Image list formatter
#[derive(Debug, Clone, Default)]
pub struct ImageFormatter {
    format: OutputFormat,
}

impl ImageFormatter {
    /// Create a new image formatter
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a list of images
    pub fn format(&self, images: &[ImageRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.format_table(images)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(images)?),
        }
    }

    fn format_table(&self, images: &[ImageRecord]) -> String {
        if images.is_empty() {
            return "No images found".to_string();
        }

        let rows: Vec<[String; 6]> = images.iter().map(Self::row).collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(Self::render_line(&HEADERS.map(String::from), &widths));
        for row in &rows {
            lines.push(Self::render_line(row, &widths));
        }
        lines.join("\n")
    }

    fn row(image: &ImageRecord) -> [String; 6] {
        let tags = image
            .tags
            .as_ref()
            .map(|tags| tags.join(","))
            .unwrap_or_default();
        let size = match (image.width, image.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "-".to_string(),
        };
        let disk = image
            .disk_size
            .map(format_disk_size)
            .unwrap_or_else(|| "-".to_string());

        [
            image.id.to_string(),
            image.fullname.clone(),
            tags,
            image.at.clone().unwrap_or_else(|| "-".to_string()),
            size,
            disk,
        ]
    }

    fn render_line(cells: &[String; 6], widths: &[usize; 6]) -> String {
        let line = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    }
}

#[derive(Serialize)]
struct TagCount<'a> {
    tag: &'a str,
    count: usize,
}

/// Tag listing formatter
#[derive(Debug, Clone, Default)]
pub struct TagFormatter {
    format: OutputFormat,
}

impl TagFormatter {
    /// Create a new tag formatter
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render every tag with its item count
    pub fn format(&self, tags: &TagCatalog) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                if tags.is_empty() {
                    return Ok("No tags found".to_string());
                }
                let width = tags.iter().map(|(tag, _)| tag.chars().count()).max().unwrap_or(0);
                let lines: Vec<String> = tags
                    .iter()
                    .map(|(tag, count)| {
                        let pad = width - tag.chars().count();
                        format!("{}{}  {}", tag, " ".repeat(pad), count)
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
            OutputFormat::Json => {
                let entries: Vec<TagCount<'_>> = tags
                    .iter()
                    .map(|(tag, count)| TagCount { tag, count })
                    .collect();
                Ok(serde_json::to_string_pretty(&entries)?)
            }
        }
    }
}

/// Human-readable byte count
pub fn format_disk_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
