//! Output formatting for CLI operations.

use std::path::Path;

use cbarchive::DocumentInfo;
use serde_json::json;

/// One regular-file entry of the list command
pub struct ListRow {
    pub encrypted: bool,
    pub size: u64,
    pub name: String,
}

/// One page of the pages command
pub struct PageRow {
    pub number: usize,
    pub position: usize,
    pub name: String,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats archive entries
    fn format_list(&self, rows: &[ListRow]) -> String;

    /// Formats pages in reading order
    fn format_pages(&self, rows: &[PageRow]) -> String;

    /// Formats a page size
    fn format_size(&self, page: usize, width: u32, height: u32) -> String;

    /// Formats a render result
    fn format_render(&self, page: usize, width: u32, height: u32, output: &Path) -> String;

    /// Formats document information
    fn format_info(&self, info: &DocumentInfo) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, rows: &[ListRow]) -> String {
        let mut output = String::new();
        if rows.is_empty() {
            return output;
        }

        output.push_str("P\tSIZE\tNAME\n");
        for row in rows {
            output.push_str(&format!(
                "{}\t{}\t{}\n",
                if row.encrypted { 'P' } else { ' ' },
                row.size,
                row.name
            ));
        }
        output
    }

    fn format_pages(&self, rows: &[PageRow]) -> String {
        let mut output = String::new();
        output.push_str(&format!("{:>6} {:>8} {}\n", "Page", "Position", "Name"));
        output.push_str(&"-".repeat(50));
        output.push('\n');

        for row in rows {
            output.push_str(&format!(
                "{:>6} {:>8} {}\n",
                row.number, row.position, row.name
            ));
        }
        output
    }

    fn format_size(&self, page: usize, width: u32, height: u32) -> String {
        format!("Page {}: {}x{}\n", page, width, height)
    }

    fn format_render(&self, page: usize, width: u32, height: u32, output: &Path) -> String {
        format!(
            "Rendered page {} ({}x{}) to {}\n",
            page,
            width,
            height,
            output.display()
        )
    }

    fn format_info(&self, info: &DocumentInfo) -> String {
        let mut output = String::new();
        output.push_str(&format!("Format:     {}\n", info.format));
        output.push_str(&format!("Pages:      {}\n", info.page_count));
        output.push_str(&format!("File size:  {}\n", humanize_bytes(info.file_size)));
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, rows: &[ListRow]) -> String {
        let items: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "name": row.name,
                    "size": row.size,
                    "encrypted": row.encrypted,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string()) + "\n"
    }

    fn format_pages(&self, rows: &[PageRow]) -> String {
        let items: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "page": row.number,
                    "position": row.position,
                    "name": row.name,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string()) + "\n"
    }

    fn format_size(&self, page: usize, width: u32, height: u32) -> String {
        let obj = json!({
            "page": page,
            "width": width,
            "height": height,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_render(&self, page: usize, width: u32, height: u32, output: &Path) -> String {
        let obj = json!({
            "page": page,
            "width": width,
            "height": height,
            "output": output.display().to_string(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_info(&self, info: &DocumentInfo) -> String {
        let obj = json!({
            "format": info.format.name(),
            "page_count": info.page_count,
            "file_size": info.file_size,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }
}

/// Creates a formatter for the requested output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
