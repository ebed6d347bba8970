//! Spreadsheet layout for extracted tables.
//!
//! The layout is a plain grid of values and styles; writing the actual workbook is left to
//! whatever spreadsheet library sits on the other side (SheetJS in the browser build).

use log::debug;
use mdpress_core::{Cell, Table};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

const HEADER_FILL: &str = "F2F2F2";
/// Narrowest width a column is measured at before padding.
const MEASURE_FLOOR: usize = 8;
const COLUMN_PADDING: usize = 2;
const SHEET_NAME_LIMIT: usize = 31;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetOptions {
    pub sheet_name: String,
    pub font_name: String,
    pub font_size: u32,
    pub min_width: usize,
    pub max_width: usize,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            sheet_name: "表格数据".to_string(),
            font_name: "Microsoft YaHei".to_string(),
            font_size: 11,
            min_width: 10,
            max_width: 60,
        }
    }
}

impl SheetOptions {
    pub fn validate(&self) -> Result<()> {
        let name = self.sheet_name.trim();
        if name.is_empty() {
            return Err(ExportError::Config("sheet name must not be empty".to_string()));
        }
        if name.chars().count() > SHEET_NAME_LIMIT {
            return Err(ExportError::Config(format!(
                "sheet name is longer than {} characters",
                SHEET_NAME_LIMIT
            )));
        }
        if let Some(bad) = name.chars().find(|ch| "[]:*?/\\".contains(*ch)) {
            return Err(ExportError::Config(format!(
                "sheet name must not contain '{}'",
                bad
            )));
        }
        if self.font_size == 0 {
            return Err(ExportError::Config("font size must be positive".to_string()));
        }
        if self.min_width > self.max_width {
            return Err(ExportError::Config(format!(
                "min width {} exceeds max width {}",
                self.min_width, self.max_width
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizontal {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Top,
    Center,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub font_name: String,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub header: bool,
    pub horizontal: Horizontal,
    pub vertical: Vertical,
    pub wrap_text: bool,
    /// RGB hex without the leading `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetCell {
    pub value: String,
    /// `None` for the blank rows that separate tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

impl SheetCell {
    fn blank() -> Self {
        Self {
            value: String::new(),
            style: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    pub sheet_name: String,
    pub rows: Vec<Vec<SheetCell>>,
    pub column_widths: Vec<usize>,
}

impl SheetLayout {
    /// Lays every table out on one sheet, one blank row between consecutive tables.
    pub fn from_tables(tables: &[Table], options: &SheetOptions) -> Result<Self> {
        options.validate()?;
        if tables.is_empty() {
            return Err(ExportError::NoTables);
        }

        let mut rows: Vec<Vec<SheetCell>> = Vec::new();
        for (index, table) in tables.iter().enumerate() {
            if index > 0 {
                let width = table.first().map_or(0, Vec::len);
                rows.push((0..width).map(|_| SheetCell::blank()).collect());
            }
            for (row_index, row) in table.iter().enumerate() {
                let header = row_index == 0;
                rows.push(
                    row.iter()
                        .map(|cell| SheetCell {
                            value: cell.text.clone(),
                            style: Some(cell_style(cell, header, options)),
                        })
                        .collect(),
                );
            }
        }

        let column_widths = column_widths(&rows, options);
        debug!(
            "sheet layout: {} table(s), {} row(s), {} column(s)",
            tables.len(),
            rows.len(),
            column_widths.len()
        );
        Ok(Self {
            sheet_name: options.sheet_name.trim().to_string(),
            rows,
            column_widths,
        })
    }
}

fn cell_style(cell: &Cell, header: bool, options: &SheetOptions) -> CellStyle {
    CellStyle {
        font_name: options.font_name.clone(),
        font_size: options.font_size,
        bold: header || cell.is_bold,
        italic: cell.is_italic,
        header,
        horizontal: if header {
            Horizontal::Center
        } else {
            Horizontal::Left
        },
        vertical: if header {
            Vertical::Center
        } else {
            Vertical::Top
        },
        wrap_text: true,
        fill: header.then(|| HEADER_FILL.to_string()),
    }
}

fn column_widths(rows: &[Vec<SheetCell>], options: &SheetOptions) -> Vec<usize> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|column| {
            let widest = rows
                .iter()
                .filter_map(|row| row.get(column))
                .filter(|cell| !cell.value.is_empty())
                .map(|cell| display_width(&cell.value))
                .fold(MEASURE_FLOOR, usize::max);
            (widest + COLUMN_PADDING).clamp(options.min_width, options.max_width)
        })
        .collect()
}

/// Character count with CJK ideographs counted twice, roughly matching spreadsheet column units.
pub fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| if ('\u{4e00}'..='\u{9fa5}').contains(&ch) { 2 } else { 1 })
        .sum()
}
