//! Structured-table extraction: grid in, candidate line items out.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::header::HeaderLocator;
use super::price::{is_price_label, locate_price, PriceContext};
use super::roles::{find_column, ColumnRoleMap, RoleDetector};
use crate::error::ExtractionError;
use crate::extract::rules::parse_quantity;
use crate::models::{CellValue, ExtractionConfig, Grid, RawRow};

/// SKU cells that repeat the header instead of naming a product.
const HEADER_LITERALS: [&str; 5] = ["sku", "part number", "מק\"ט", "מק״ט", "product"];

/// Optional category column.
const CATEGORY_SYNONYMS: [&str; 3] = ["category", "קטגוריה", "type"];

/// One data row of a table, keeping its physical position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based physical row number.
    pub number: usize,
    pub cells: Vec<CellValue>,
}

/// A header row plus the data rows below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Split a grid at its header row. Rows above the header and fully
    /// empty rows are dropped.
    pub fn from_grid(grid: &Grid, header_row: usize) -> Self {
        let headers = grid
            .rows
            .get(header_row)
            .map(|cells| cells.iter().map(CellValue::as_text).collect())
            .unwrap_or_default();

        let rows = grid
            .rows
            .iter()
            .enumerate()
            .skip(header_row + 1)
            .filter(|(i, _)| !grid.is_row_empty(*i))
            .map(|(i, cells)| TableRow {
                number: i + 1,
                cells: cells.clone(),
            })
            .collect();

        Self {
            name: grid.name.clone(),
            headers,
            rows,
        }
    }

    /// Widest of the header row and the data rows.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Cell of a data row; unknown columns and ragged rows read as empty.
    pub fn cell(&self, row: usize, column: Option<usize>) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        column
            .and_then(|c| self.rows.get(row)?.cells.get(c))
            .unwrap_or(&EMPTY)
    }

    /// Header text of a column, empty when the header row is short.
    pub fn header(&self, column: usize) -> &str {
        self.headers.get(column).map_or("", String::as_str)
    }

    /// Original cells of a row keyed by header, for audit.
    fn raw_data(&self, row: &TableRow) -> BTreeMap<String, CellValue> {
        let mut data = BTreeMap::new();
        for (column, value) in row.cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let header = self.header(column).trim();
            let mut key = if header.is_empty() {
                format!("column_{}", column + 1)
            } else {
                header.to_string()
            };
            if data.contains_key(&key) {
                key = format!("{}_{}", key, column + 1);
            }
            data.insert(key, value.clone());
        }
        data
    }
}

/// Rows extracted from one table, with what was learned about it.
#[derive(Debug, Clone, Default)]
pub struct TableExtraction {
    pub rows: Vec<RawRow>,
    /// Grid row index used as header, `None` in degraded mode.
    pub header_row: Option<usize>,
    pub roles: ColumnRoleMap,
    /// Non-fatal problems (unresolved roles, skipped rows).
    pub warnings: Vec<String>,
}

/// Runs header location, role detection and the price cascade over a table.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    config: ExtractionConfig,
    detector: RoleDetector,
    locator: HeaderLocator,
}

impl TableExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
            detector: RoleDetector::new(),
            locator: HeaderLocator::from_config(config),
        }
    }

    /// Extract from a grid whose header row is unknown.
    ///
    /// When no header row is found the first physical row is used.
    pub fn extract_grid(&self, grid: &Grid, source_file: Option<&str>) -> TableExtraction {
        if grid.is_empty() {
            return TableExtraction::default();
        }

        let located = self.locator.locate(grid);
        let mut warnings = Vec::new();
        let header_row = match located {
            Some(row) => row,
            None => {
                warnings.push(format!("{}: no header row found, using first row", grid.name));
                0
            }
        };

        let table = Table::from_grid(grid, header_row);
        let mut extraction = self.extract_table(&table, source_file);
        extraction.header_row = located;
        warnings.append(&mut extraction.warnings);
        extraction.warnings = warnings;
        extraction
    }

    /// Extract from a table with a known header row.
    pub fn extract_table(&self, table: &Table, source_file: Option<&str>) -> TableExtraction {
        let mut warnings = Vec::new();

        let detection = self.detector.detect(&table.headers);
        if !detection.missing.is_empty() {
            let names: Vec<String> = detection.missing.iter().map(ToString::to_string).collect();
            warnings.push(format!("{}: unresolved columns: {}", table.name, names.join(", ")));
        }
        let roles = self
            .detector
            .with_positional_fallback(detection.roles, table.width());
        let category_column = find_column(&table.headers, &CATEGORY_SYNONYMS)
            .filter(|c| !roles.is_claimed(*c));

        let mut rows = Vec::new();
        for index in 0..table.rows.len() {
            match self.extract_row(table, &roles, category_column, index, source_file) {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {}
                Err(e) => {
                    let number = table.rows[index].number;
                    warn!("Skipping row {} in {}: {}", number, table.name, e);
                    warnings.push(format!("{}: row {}: {}", table.name, number, e));
                }
            }
        }

        info!("Extracted {} rows from {}", rows.len(), table.name);

        TableExtraction {
            rows,
            header_row: None,
            roles,
            warnings,
        }
    }

    fn extract_row(
        &self,
        table: &Table,
        roles: &ColumnRoleMap,
        category_column: Option<usize>,
        index: usize,
        source_file: Option<&str>,
    ) -> Result<Option<RawRow>, ExtractionError> {
        let sku = table.cell(index, roles.sku).as_text();
        let description = table.cell(index, roles.description).as_text();

        if sku.is_empty() || is_header_literal(&sku) || is_price_label(&sku) || description.is_empty() {
            return Ok(None);
        }

        let quantity = parse_quantity(table.cell(index, roles.quantity))?;

        let ctx = PriceContext {
            table,
            roles,
            row: index,
            quantity,
            floor: self.config.price_floor,
            lookahead: self.config.lookahead_rows,
        };
        let price = locate_price(&ctx);
        if price.is_none() {
            debug!(sku = %sku, "No price located, row kept unpriced");
        }

        let row = &table.rows[index];
        let category = category_column
            .map(|c| table.cell(index, Some(c)).as_text())
            .filter(|c| !c.is_empty());

        Ok(Some(RawRow {
            sku,
            description,
            quantity,
            unit_price: price.as_ref().and_then(|p| p.unit_price),
            total_price: price.and_then(|p| p.total_price),
            row_number: row.number,
            raw_data: table.raw_data(row),
            source_file: source_file.map(str::to_string),
            category,
        }))
    }
}

fn is_header_literal(sku: &str) -> bool {
    let sku = sku.trim().to_lowercase();
    HEADER_LITERALS.contains(&sku.as_str())
}
