//! Line item extraction from tables and free text.
//!
//! Tables go through header location, role detection and the price cascade;
//! free text yields weaker findings that never become line items.

pub mod header;
pub mod price;
pub mod roles;
pub mod rules;
pub mod table;
pub mod text;

pub use header::HeaderLocator;
pub use price::{locate_price, PriceContext, PriceResolution, PriceStrategy};
pub use roles::{ColumnRoleMap, Role, RoleDetection, RoleDetector};
pub use table::{Table, TableExtraction, TableExtractor, TableRow};
pub use text::{split_text_tables, FindingValue, FreeTextExtractor, SplitText, TextFinding};
