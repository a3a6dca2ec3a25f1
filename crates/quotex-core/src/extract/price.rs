//! Price location cascade.
//!
//! A product row's unit price can sit in its own price column, in the
//! description cell, on a "Total" row somewhere below it, or in any column
//! whose header suggests money. Each placement is one strategy; strategies
//! run in a fixed order and the first that yields a price wins.
//!
//! Outside dedicated price columns a bare number only counts as a price when
//! it is strictly above the configured floor, which keeps quantities and
//! small counts out.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::roles::{normalize_label, ColumnRoleMap};
use super::table::Table;
use crate::models::CellValue;

/// Header fragments that make an unclaimed column a price candidate.
const PRICE_HEADER_KEYWORDS: [&str; 10] = [
    "price", "cost", "amount", "total", "$", "₪", "€", "מחיר", "סה\"כ", "עלות",
];

/// Which strategy resolved a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStrategy {
    /// Unit price or total column of the same row.
    DedicatedColumns,
    /// Bare number in the row's own description cell.
    DescriptionCell,
    /// Price row found this many rows below the product.
    RowsBelow { offset: usize },
    /// Unclaimed, price-labelled column of the same row.
    ColumnScan { column: usize },
}

/// A resolved price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceResolution {
    /// `None` when only a total is known and quantity is not positive.
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub strategy: PriceStrategy,
}

impl PriceResolution {
    /// Treat `total` as the line total and derive the unit price from it.
    fn from_total(total: Decimal, quantity: i64, strategy: PriceStrategy) -> Self {
        Self {
            unit_price: per_unit(total, quantity),
            total_price: Some(total),
            strategy,
        }
    }
}

fn per_unit(total: Decimal, quantity: i64) -> Option<Decimal> {
    (quantity > 0).then(|| total / Decimal::from(quantity))
}

/// Everything a strategy may look at for one product row.
pub struct PriceContext<'a> {
    pub table: &'a Table,
    pub roles: &'a ColumnRoleMap,
    /// Index into `table.rows`.
    pub row: usize,
    pub quantity: i64,
    pub floor: Decimal,
    pub lookahead: usize,
}

impl PriceContext<'_> {
    fn cell(&self, row: usize, column: Option<usize>) -> &CellValue {
        self.table.cell(row, column)
    }

    /// Value of a cell when it is a number strictly above the floor.
    fn price_above_floor(&self, row: usize, column: Option<usize>) -> Option<Decimal> {
        self.cell(row, column)
            .as_decimal()
            .filter(|v| *v > self.floor)
    }

    fn label(&self, row: usize) -> String {
        self.cell(row, self.roles.sku).as_text()
    }
}

/// A single placement rule.
pub type Strategy = fn(&PriceContext<'_>) -> Option<PriceResolution>;

/// The cascade, in evaluation order.
pub const CASCADE: [Strategy; 4] = [
    dedicated_columns,
    description_cell,
    rows_below,
    column_scan,
];

/// Run the cascade and return the first resolution, if any.
pub fn locate_price(ctx: &PriceContext<'_>) -> Option<PriceResolution> {
    CASCADE.iter().find_map(|strategy| strategy(ctx))
}

/// Labels that mark a row as carrying a price for a nearby product rather
/// than being a product itself.
pub fn is_price_label(label: &str) -> bool {
    let label = label.trim().to_lowercase();
    label.contains("includes")
        || label.starts_with("total")
        || (label.contains("support") && label.contains("delivery"))
}

/// Strategy 1: the row's own unit price / total columns. No floor applies.
pub fn dedicated_columns(ctx: &PriceContext<'_>) -> Option<PriceResolution> {
    let read = |column| {
        ctx.cell(ctx.row, column)
            .as_decimal()
            .filter(|v| *v > Decimal::ZERO)
    };
    let unit = read(ctx.roles.unit_price);
    let total = read(ctx.roles.total_price);

    let resolution = match (unit, total) {
        (Some(unit), total) => PriceResolution {
            unit_price: Some(unit),
            total_price: total.or_else(|| (ctx.quantity > 0).then(|| unit * Decimal::from(ctx.quantity))),
            strategy: PriceStrategy::DedicatedColumns,
        },
        (None, Some(total)) => PriceResolution::from_total(total, ctx.quantity, PriceStrategy::DedicatedColumns),
        (None, None) => return None,
    };
    debug!(row = ctx.row, ?resolution, "Price found in dedicated columns");
    Some(resolution)
}

/// Strategy 2: the description cell holds nothing but a price-sized number.
pub fn description_cell(ctx: &PriceContext<'_>) -> Option<PriceResolution> {
    let total = ctx.price_above_floor(ctx.row, ctx.roles.description)?;
    debug!(row = ctx.row, %total, "Price found in description cell");
    Some(PriceResolution::from_total(total, ctx.quantity, PriceStrategy::DescriptionCell))
}

/// Strategy 3: a price row within the lookahead window below the product.
///
/// Scanning stops at the first row that looks like another real product.
pub fn rows_below(ctx: &PriceContext<'_>) -> Option<PriceResolution> {
    for offset in 1..=ctx.lookahead {
        let row = ctx.row + offset;
        if row >= ctx.table.rows.len() {
            break;
        }

        let label = ctx.label(row);
        // a bare "support" line never ends the scan
        let is_marker = is_price_label(&label) || label.trim().eq_ignore_ascii_case("support");
        let description_price = ctx.price_above_floor(row, ctx.roles.description);

        if !label.is_empty() && !is_marker && description_price.is_none() {
            debug!(row = ctx.row, offset, %label, "Vertical price scan stopped at next product");
            return None;
        }

        let (found, is_price_row) = match description_price {
            Some(price) => (
                Some(price),
                label.is_empty() || is_marker || ctx.roles.sku.is_none(),
            ),
            None => (
                ctx.price_above_floor(row, ctx.roles.unit_price)
                    .or_else(|| ctx.price_above_floor(row, ctx.roles.total_price)),
                true,
            ),
        };

        if let (Some(total), true) = (found, is_price_row) {
            info!(
                product_row = ctx.table.rows[ctx.row].number,
                offset,
                %total,
                label = %label,
                "Price found below product"
            );
            return Some(PriceResolution::from_total(
                total,
                ctx.quantity,
                PriceStrategy::RowsBelow { offset },
            ));
        }
    }
    None
}

/// Strategy 4: any column outside sku/description/quantity whose header
/// suggests money.
pub fn column_scan(ctx: &PriceContext<'_>) -> Option<PriceResolution> {
    (0..ctx.table.width())
        .filter(|column| !ctx.roles.is_identity_column(*column))
        .filter(|column| {
            let header = normalize_label(ctx.table.header(*column));
            PRICE_HEADER_KEYWORDS.iter().any(|k| header.contains(k))
        })
        .find_map(|column| {
            let total = ctx.price_above_floor(ctx.row, Some(column))?;
            debug!(row = ctx.row, column, %total, "Price found by column scan");
            Some(PriceResolution::from_total(
                total,
                ctx.quantity,
                PriceStrategy::ColumnScan { column },
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::table::TableRow;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            name: "t".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| TableRow { number: i + 2, cells })
                .collect(),
        }
    }

    fn roles() -> ColumnRoleMap {
        ColumnRoleMap {
            sku: Some(0),
            description: Some(1),
            quantity: Some(2),
            unit_price: Some(3),
            total_price: None,
        }
    }

    fn ctx<'a>(table: &'a Table, roles: &'a ColumnRoleMap, row: usize, quantity: i64) -> PriceContext<'a> {
        PriceContext {
            table,
            roles,
            row,
            quantity,
            floor: Decimal::ONE_HUNDRED,
            lookahead: 5,
        }
    }

    #[test]
    fn test_dedicated_column_wins_over_total_row_below() {
        let t = table(
            &["SKU", "Description", "Qty", "Price"],
            vec![
                vec!["A1".into(), "Switch".into(), 2.0.into(), 250.0.into()],
                vec!["Total: 9999".into(), 9999.0.into(), CellValue::Empty, CellValue::Empty],
            ],
        );
        let r = roles();
        let found = locate_price(&ctx(&t, &r, 0, 2)).unwrap();
        assert_eq!(found.strategy, PriceStrategy::DedicatedColumns);
        assert_eq!(found.unit_price, Some(dec("250")));
        assert_eq!(found.total_price, Some(dec("500")));
    }

    #[test]
    fn test_vertical_scan_stops_at_next_product() {
        let t = table(
            &["SKU", "Description", "Qty", "Price"],
            vec![
                vec!["A".into(), "Product A".into(), 1.0.into(), CellValue::Empty],
                vec!["B".into(), "Product B".into(), 1.0.into(), CellValue::Empty],
                vec![CellValue::Empty, 5000.0.into(), CellValue::Empty, CellValue::Empty],
            ],
        );
        let r = roles();
        assert_eq!(locate_price(&ctx(&t, &r, 0, 1)), None);

        let b = locate_price(&ctx(&t, &r, 1, 1)).unwrap();
        assert_eq!(b.strategy, PriceStrategy::RowsBelow { offset: 1 });
        assert_eq!(b.total_price, Some(dec("5000")));
    }

    #[test]
    fn test_price_floor_is_exclusive() {
        let rows = |v: f64| -> Vec<Vec<CellValue>> {
            vec![
                vec!["A".into(), "Product".into(), 1.0.into(), CellValue::Empty],
                vec!["Total".into(), v.into(), CellValue::Empty, CellValue::Empty],
            ]
        };
        let r = roles();

        let at_floor = table(&["SKU", "Description", "Qty", "Price"], rows(100.0));
        assert_eq!(locate_price(&ctx(&at_floor, &r, 0, 1)), None);

        let above = table(&["SKU", "Description", "Qty", "Price"], rows(100.01));
        let found = locate_price(&ctx(&above, &r, 0, 1)).unwrap();
        assert_eq!(found.total_price, Some(dec("100.01")));
    }

    #[test]
    fn test_description_cell_total_divided_by_quantity() {
        let t = table(
            &["SKU", "Description", "Qty", "Price"],
            vec![vec!["A".into(), "1,200".into(), 4.0.into(), CellValue::Empty]],
        );
        let r = roles();
        let found = locate_price(&ctx(&t, &r, 0, 4)).unwrap();
        assert_eq!(found.strategy, PriceStrategy::DescriptionCell);
        assert_eq!(found.unit_price, Some(dec("300")));
    }

    #[test]
    fn test_price_column_below_counts_as_price_row() {
        let t = table(
            &["SKU", "Description", "Qty", "Price"],
            vec![
                vec!["A".into(), "Rack".into(), 2.0.into(), CellValue::Empty],
                vec!["includes rails".into(), "".into(), CellValue::Empty, 800.0.into()],
            ],
        );
        let r = roles();
        let found = locate_price(&ctx(&t, &r, 0, 2)).unwrap();
        assert_eq!(found.strategy, PriceStrategy::RowsBelow { offset: 1 });
        assert_eq!(found.unit_price, Some(dec("400")));
    }

    #[test]
    fn test_column_scan_needs_price_header() {
        let t = table(
            &["SKU", "Description", "Qty", "Notes", "Amount USD"],
            vec![vec!["A".into(), "Router".into(), 1.0.into(), 5000.0.into(), 1500.0.into()]],
        );
        let r = ColumnRoleMap {
            sku: Some(0),
            description: Some(1),
            quantity: Some(2),
            unit_price: None,
            total_price: None,
        };
        let found = locate_price(&ctx(&t, &r, 0, 1)).unwrap();
        assert_eq!(found.strategy, PriceStrategy::ColumnScan { column: 4 });
        assert_eq!(found.unit_price, Some(dec("1500")));
    }

    #[test]
    fn test_unpriced_when_every_strategy_fails() {
        let t = table(
            &["SKU", "Description", "Qty", "Price"],
            vec![vec!["A".into(), "Cable".into(), 3.0.into(), CellValue::Empty]],
        );
        let r = roles();
        assert_eq!(locate_price(&ctx(&t, &r, 0, 3)), None);
    }

    #[test]
    fn test_price_labels() {
        assert!(is_price_label("Total"));
        assert!(is_price_label("TOTAL incl. VAT"));
        assert!(is_price_label("Price includes installation"));
        assert!(is_price_label("Support & Delivery"));
        assert!(!is_price_label("support"));
        assert!(!is_price_label("Support contract 3Y"));
        assert!(!is_price_label("X1"));
    }
}
