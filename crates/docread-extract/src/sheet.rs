//! Spreadsheet extractor.
//!
//! Every sheet becomes one pipe-delimited table. Workbooks (`.xlsx`,
//! `.xlsm`, `.xls`, `.ods`) are read with calamine; `.csv` files are read
//! with the csv crate as a single sheet named after the file.

use async_trait::async_trait;
use calamine::{Data, Reader, open_workbook_auto};
use docread_core::{
    ContentExtractor, Document, DocumentFormat, ExtractError, ExtractedText, Segment,
};
use std::path::{Path, PathBuf};
use tracing::debug;

const CELL_SEPARATOR: &str = " | ";

/// Extractor for spreadsheet and CSV files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentExtractor for SpreadsheetExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Spreadsheet
    }

    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractError> {
        debug!("Extracting spreadsheet: {:?}", document.path);

        let path = document.path.clone();
        let sheets = tokio::task::spawn_blocking(move || read_sheets(&path))
            .await
            .map_err(|e| ExtractError::Failed(format!("Task join error: {e}")))??;

        let mut text = ExtractedText::new(DocumentFormat::Spreadsheet);
        for (name, rows) in sheets {
            text.push(Segment::sheet(name, render_table(&rows)));
        }
        Ok(text)
    }
}

type Sheet = (String, Vec<Vec<String>>);

fn read_sheets(path: &Path) -> Result<Vec<Sheet>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(PathBuf::from(path)));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let name = path
            .file_stem()
            .map_or_else(|| "Sheet1".to_string(), |stem| stem.to_string_lossy().into_owned());
        Ok(vec![(name, read_csv(path)?)])
    } else {
        read_workbook(path)
    }
}

fn read_workbook(path: &Path) -> Result<Vec<Sheet>, ExtractError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ExtractError::Parse(format!("cannot open workbook: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::Parse(format!("cannot read sheet {name}: {e}")))?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        sheets.push((name, rows));
    }
    Ok(sheets)
}

fn read_csv(path: &Path) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractError::Parse(format!("cannot open CSV: {e}")))?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| ExtractError::Parse(format!("invalid CSV: {e}")))
        })
        .collect()
}

/// Shortest natural rendering of a cell; integral floats lose their `.0`.
///
/// Dates keep calamine's serial-number form.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        other => other.to_string(),
    }
}

/// Cells joined by ` | `, rows by newlines, every row padded to the widest.
fn render_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
            cells.resize(width, "");
            cells.join(CELL_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
