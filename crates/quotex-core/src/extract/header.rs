//! Header row detection inside raw, headerless grids.

use tracing::debug;

use super::roles::{header_keywords, normalize_label};
use crate::models::{ExtractionConfig, Grid};

/// Finds the header row of a grid by counting role keyword hits.
#[derive(Debug, Clone)]
pub struct HeaderLocator {
    keywords: Vec<String>,
    scan_rows: usize,
    min_hits: usize,
}

impl HeaderLocator {
    pub fn new(scan_rows: usize, min_hits: usize) -> Self {
        Self {
            keywords: header_keywords(),
            scan_rows,
            min_hits,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.header_scan_rows, config.header_min_hits)
    }

    /// Number of non-empty cells in a row that contain any keyword.
    pub fn keyword_hits(&self, grid: &Grid, row: usize) -> usize {
        grid.rows.get(row).map_or(0, |cells| {
            cells
                .iter()
                .filter(|c| !c.is_empty())
                .map(|c| normalize_label(&c.as_text()))
                .filter(|text| self.keywords.iter().any(|k| text.contains(k.as_str())))
                .count()
        })
    }

    /// Index of the first row with enough keyword hits within the scan
    /// window, or `None` when no row qualifies.
    pub fn locate(&self, grid: &Grid) -> Option<usize> {
        let found = (0..grid.len().min(self.scan_rows)).find(|row| self.keyword_hits(grid, *row) >= self.min_hits);
        match found {
            Some(row) => debug!(sheet = %grid.name, row, "Header row located"),
            None => debug!(sheet = %grid.name, "No header row found"),
        }
        found
    }
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn grid(rows: Vec<Vec<&str>>) -> Grid {
        Grid::new(
            "sheet",
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_header_below_noise() {
        let g = grid(vec![
            vec!["Quote #4411", "", ""],
            vec!["Valid until 2024-01-01", "", ""],
            vec!["", "", ""],
            vec!["Part Number", "Item Description", "Qty"],
            vec!["X1", "Widget", "2"],
        ]);
        assert_eq!(HeaderLocator::default().locate(&g), Some(3));
    }

    #[test]
    fn test_single_keyword_is_not_enough() {
        let g = grid(vec![vec!["Price list", "2024"], vec!["A", "B"]]);
        assert_eq!(HeaderLocator::default().locate(&g), None);
    }

    #[test]
    fn test_scan_window_is_respected() {
        let mut rows = vec![vec!["noise", "noise"]; 3];
        rows.push(vec!["SKU", "Description"]);
        let g = grid(rows);
        assert_eq!(HeaderLocator::new(3, 2).locate(&g), None);
        assert_eq!(HeaderLocator::new(4, 2).locate(&g), Some(3));
    }
}
