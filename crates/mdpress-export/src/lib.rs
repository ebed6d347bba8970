//! Export targets built from preview HTML: Word markup, spreadsheet layout, print page and
//! clipboard text.

mod error;
mod print;
mod sheet;
mod text;
mod word;

use log::debug;
use std::fs;
use std::path::Path;

pub use error::{ExportError, Result};
pub use print::{PrintOptions, Printer, Theme, print_document};
pub use sheet::{CellStyle, Horizontal, SheetCell, SheetLayout, SheetOptions, Vertical, display_width};
pub use text::plain_text;
pub use word::{WordOptions, word_body, word_document};

/// Extracts the preview's tables and lays them out on one sheet.
pub fn sheet_layout(preview_html: &str, options: &SheetOptions) -> Result<SheetLayout> {
    let tables = mdpress_core::extract_tables(preview_html);
    SheetLayout::from_tables(&tables, options)
}

pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    debug!("wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
