//! Spreadsheet documents: calamine workbooks and CSV files.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{DocumentExtraction, DocumentKind};
use crate::error::{Result, SpreadsheetError};
use crate::extract::TableExtractor;
use crate::models::{CellValue, ExtractionConfig, Grid, SourceKind};

/// Sheets read from a workbook, plus the sheets that could not be read.
#[derive(Debug, Default)]
pub struct Workbook {
    pub sheets: Vec<Grid>,
    pub failed: Vec<SpreadsheetError>,
}

/// Extracts line items from every sheet of a spreadsheet.
pub struct SpreadsheetSource {
    extractor: TableExtractor,
    parallel: bool,
}

impl SpreadsheetSource {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            extractor: TableExtractor::new(config),
            parallel: config.parallel,
        }
    }

    /// Load and extract a workbook or CSV file.
    pub fn extract_path(&self, path: &Path, kind: DocumentKind) -> Result<DocumentExtraction> {
        let workbook = match kind {
            DocumentKind::Csv => Workbook {
                sheets: vec![load_csv(path)?],
                failed: Vec::new(),
            },
            _ => load_workbook(path)?,
        };

        let source_file = path.display().to_string();
        let mut extraction = self.extract_grids(&workbook.sheets, Some(&source_file));
        for error in workbook.failed {
            warn!("{}: {}", source_file, error);
            extraction.warnings.push(error.to_string());
        }
        Ok(extraction)
    }

    /// Extract every sheet independently; results keep workbook order.
    pub fn extract_grids(&self, sheets: &[Grid], source_file: Option<&str>) -> DocumentExtraction {
        let tables: Vec<_> = if self.parallel {
            sheets
                .par_iter()
                .map(|sheet| self.extractor.extract_grid(sheet, source_file))
                .collect()
        } else {
            sheets
                .iter()
                .map(|sheet| self.extractor.extract_grid(sheet, source_file))
                .collect()
        };

        let mut extraction = DocumentExtraction::default();
        for table in tables {
            extraction.absorb_table(SourceKind::Excel, table);
        }

        info!(
            "Extracted {} rows from {} sheets",
            extraction.row_count(),
            sheets.len()
        );
        extraction
    }
}

/// Read every sheet of a workbook as a raw grid.
///
/// A sheet that fails to load is reported in [`Workbook::failed`]; the
/// others are still returned.
pub fn load_workbook(path: &Path) -> std::result::Result<Workbook, SpreadsheetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SpreadsheetError::Open(format!("{}: {}", path.display(), e)))?;

    let names = workbook.sheet_names();
    if names.is_empty() {
        return Err(SpreadsheetError::NoSheets);
    }

    let mut loaded = Workbook::default();
    for name in names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                debug!("Loaded sheet '{}' ({} rows)", name, range.height());
                loaded.sheets.push(range_to_grid(&name, &range));
            }
            Err(e) => loaded.failed.push(SpreadsheetError::Sheet {
                sheet: name,
                reason: e.to_string(),
            }),
        }
    }
    Ok(loaded)
}

/// Read a CSV file as a single headerless sheet.
pub fn load_csv(path: &Path) -> std::result::Result<Grid, SpreadsheetError> {
    let file = std::fs::File::open(path).map_err(|e| SpreadsheetError::Open(format!("{}: {}", path.display(), e)))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    read_csv(file, &name)
}

/// Read CSV data without assuming a header row. Rows may be ragged.
pub fn read_csv<R: Read>(reader: R, name: &str) -> std::result::Result<Grid, SpreadsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::from).collect());
    }
    Ok(Grid::new(name, rows))
}

/// Convert a calamine range to a grid, padding the rows above the used
/// range so row numbers stay physical.
fn range_to_grid(name: &str, range: &Range<Data>) -> Grid {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|cells| {
        std::iter::repeat_n(CellValue::Empty, first_col as usize)
            .chain(cells.iter().map(cell_value))
            .collect()
    }));
    Grid::new(name, rows)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(v) => CellValue::from(*v),
        Data::Float(v) => CellValue::from(*v),
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Empty | Data::Error(_) => CellValue::Empty,
        other => CellValue::from(other.to_string()),
    }
}
