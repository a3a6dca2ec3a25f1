//! Generic tabular input: the cell grid every table-shaped source is reduced to.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::extract::rules::amounts::parse_amount;

/// A single cell value as delivered by a spreadsheet, PDF table or text table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Free text.
    Text(String),
    /// Native numeric cell.
    Number(f64),
    /// Nothing in the cell.
    #[default]
    Empty,
}

impl CellValue {
    /// True for empty cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Stringified, trimmed cell content.
    pub fn as_text(&self) -> String {
        self.to_string().trim().to_string()
    }

    /// The cell read as a bare amount.
    ///
    /// Native numbers always qualify. Text qualifies only when it holds nothing
    /// but a number with optional sign, thousands separators and currency
    /// marks ("1,250.00", "₪ 480", "$99"), so "Widget 2000" is not a number.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(v) if v.is_finite() => Decimal::from_f64(*v),
            CellValue::Text(s) => parse_amount(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{:.0}", v),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// A raw, headerless table: one spreadsheet sheet, one PDF table or one
/// inline text table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Sheet name or a synthetic label such as "page 2 table 1".
    pub name: String,
    /// Physical rows in source order. Rows may be ragged.
    pub rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Create a grid from rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Number of physical rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the grid holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at a position; missing cells of ragged rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// True when every cell of the row is empty.
    pub fn is_row_empty(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_none_or(|r| r.iter().all(CellValue::is_empty))
    }
}
