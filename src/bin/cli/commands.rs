//! Command implementations for the CLI tool.

use std::path::Path;

use cbarchive::{ArchiveFormat, ArchiveHandle, ComicDocument, RenderRequest, Rotation};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{ListRow, PageRow, create_formatter};

/// Configuration for the render command.
pub struct RenderConfig<'a> {
    pub archive_path: &'a Path,
    pub page: usize,
    pub output_path: &'a Path,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate: i32,
    pub format: OutputFormat,
}

/// Opens a document, printing errors
fn open_document(path: &Path) -> Result<ComicDocument, ExitCode> {
    ComicDocument::open(path).map_err(|e| {
        eprintln!("Error opening '{}': {}", path.display(), e.user_message());
        log::debug!("{}", e);
        error_to_exit_code(&e)
    })
}

/// Converts a 1-based page number to an index
fn page_index(page: usize, document: &ComicDocument) -> Result<usize, ExitCode> {
    if page == 0 || page > document.page_count() {
        eprintln!(
            "Error: page {} out of range (document has {} pages)",
            page,
            document.page_count()
        );
        return Err(ExitCode::BadArgs);
    }
    Ok(page - 1)
}

/// List command implementation
pub fn list(archive_path: &Path, format: Option<ArchiveFormat>, output: OutputFormat) -> ExitCode {
    let formatter = create_formatter(output);

    let format = match format {
        Some(format) => format,
        None => match cbarchive::detect_format(archive_path) {
            Ok(format) => format,
            Err(e) => {
                eprintln!("Error: {}", e);
                return error_to_exit_code(&e);
            }
        },
    };

    let mut handle = ArchiveHandle::new();
    if let Err(e) = handle.set_format(format) {
        eprintln!("Error: {}", e);
        return error_to_exit_code(&e);
    }
    if let Err(e) = handle.open(archive_path) {
        eprintln!("Failed to open '{}': {}", archive_path.display(), e);
        return error_to_exit_code(&e);
    }

    let mut rows = Vec::new();
    let mut exit_code = ExitCode::Success;
    loop {
        match handle.next_header() {
            Ok(Some(entry)) => rows.push(ListRow {
                encrypted: entry.is_encrypted(),
                size: entry.size(),
                name: entry.pathname().to_string(),
            }),
            Ok(None) => break,
            Err(e) => {
                eprintln!("Fatal error handling archive: {}", e);
                exit_code = ExitCode::FatalError;
                break;
            }
        }
    }

    print!("{}", formatter.format_list(&rows));
    log::debug!("Cursor: {}", handle.stats());
    exit_code
}

/// Pages command implementation
pub fn pages(archive_path: &Path, output: OutputFormat) -> ExitCode {
    let formatter = create_formatter(output);

    let document = match open_document(archive_path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let catalog = document.catalog();
    let rows: Vec<PageRow> = catalog
        .pages()
        .iter()
        .enumerate()
        .map(|(index, name)| PageRow {
            number: index + 1,
            position: catalog
                .position_of(name.as_bytes())
                .map(|p| p.get())
                .unwrap_or_default(),
            name: name.to_string(),
        })
        .collect();

    print!("{}", formatter.format_pages(&rows));
    ExitCode::Success
}

/// Size command implementation
pub fn size(archive_path: &Path, page: usize, output: OutputFormat) -> ExitCode {
    let formatter = create_formatter(output);

    let mut document = match open_document(archive_path) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let index = match page_index(page, &document) {
        Ok(i) => i,
        Err(code) => return code,
    };

    match document.page_size(index) {
        Ok((width, height)) => {
            print!("{}", formatter.format_size(page, width, height));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error reading page {}: {}", page, e);
            error_to_exit_code(&e)
        }
    }
}

/// Render command implementation
pub fn render(config: &RenderConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let Some(rotation) = Rotation::from_degrees(config.rotate) else {
        eprintln!("Error: rotation must be a multiple of 90 degrees");
        return ExitCode::BadArgs;
    };

    let mut document = match open_document(config.archive_path) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let index = match page_index(config.page, &document) {
        Ok(i) => i,
        Err(code) => return code,
    };

    let result = match (config.width, config.height) {
        (None, None) => document.render_page_scaled(index, 1.0, rotation),
        (width, height) => document.page_size(index).and_then(|natural| {
            let (width, height) = fit_size(natural, width, height);
            document.render_page(index, RenderRequest::new(width, height).rotation(rotation))
        }),
    };

    let image = match result {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error rendering page {}: {}", config.page, e);
            return error_to_exit_code(&e);
        }
    };

    if let Err(e) = image.save(config.output_path) {
        eprintln!("Error writing '{}': {}", config.output_path.display(), e);
        return ExitCode::IoError;
    }

    print!(
        "{}",
        formatter.format_render(config.page, image.width(), image.height(), config.output_path)
    );
    ExitCode::Success
}

/// Info command implementation
pub fn info(archive_path: &Path, output: OutputFormat) -> ExitCode {
    let formatter = create_formatter(output);

    let document = match open_document(archive_path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    match document.info() {
        Ok(info) => {
            print!("{}", formatter.format_info(&info));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

/// Fills in a missing target dimension from the page's aspect ratio.
fn fit_size(natural: (u32, u32), width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let (natural_width, natural_height) = (natural.0.max(1) as f64, natural.1.max(1) as f64);
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, (w as f64 * natural_height / natural_width + 0.5) as u32),
        (None, Some(h)) => ((h as f64 * natural_width / natural_height + 0.5) as u32, h),
        (None, None) => natural,
    }
}
